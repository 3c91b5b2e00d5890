use super::region::RegionClass;
use super::CapTier;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// Failure while importing a cap table from CSV.
#[derive(Debug, thiserror::Error)]
pub enum CapTableImportError {
    #[error("failed to read cap table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid cap table CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("cap table row {row}: {reason}")]
    InvalidTier { row: usize, reason: String },
    #[error("cap table contains no tiers")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct CapRow {
    region: String,
    effective_from: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    effective_to: Option<String>,
    max_protected_deposit: u64,
    max_priority_repayment: u64,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

fn parse_date(row: usize, field: &str, raw: &str) -> Result<NaiveDate, CapTableImportError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|err| {
        CapTableImportError::InvalidTier {
            row,
            reason: format!("{field} '{raw}' is not YYYY-MM-DD ({err})"),
        }
    })
}

pub(super) fn parse_tiers<R: Read>(reader: R) -> Result<Vec<CapTier>, CapTableImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut tiers = Vec::new();

    for (index, record) in csv_reader.deserialize::<CapRow>().enumerate() {
        let row_number = index + 1;
        let row = record?;

        let region = RegionClass::from_label(&row.region).ok_or_else(|| {
            CapTableImportError::InvalidTier {
                row: row_number,
                reason: format!("unknown region '{}'", row.region),
            }
        })?;
        let effective_from = parse_date(row_number, "effective_from", &row.effective_from)?;
        let effective_to = row
            .effective_to
            .as_deref()
            .map(|raw| parse_date(row_number, "effective_to", raw))
            .transpose()?;

        if let Some(to) = effective_to {
            if to < effective_from {
                return Err(CapTableImportError::InvalidTier {
                    row: row_number,
                    reason: format!("effective_to {to} precedes effective_from {effective_from}"),
                });
            }
        }

        if row.max_priority_repayment == 0 {
            return Err(CapTableImportError::InvalidTier {
                row: row_number,
                reason: "max_priority_repayment must be positive".to_string(),
            });
        }

        if row.max_priority_repayment > row.max_protected_deposit {
            return Err(CapTableImportError::InvalidTier {
                row: row_number,
                reason: "max_priority_repayment exceeds max_protected_deposit".to_string(),
            });
        }

        tiers.push(CapTier {
            region,
            effective_from,
            effective_to,
            max_protected_deposit: row.max_protected_deposit,
            max_priority_repayment: row.max_priority_repayment,
        });
    }

    if tiers.is_empty() {
        return Err(CapTableImportError::Empty);
    }

    Ok(tiers)
}
