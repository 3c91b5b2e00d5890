use super::domain::{
    BuildingDraft, BuildingKey, BuildingSubmission, ContractSubmission, ContractTerms,
    EvidenceSubmission,
};

/// Input errors raised before any lookup or evaluation runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("deposit must not be negative (found {found})")]
    NegativeDeposit { found: i64 },
    #[error("collateral amount must not be negative (found {found})")]
    NegativeCollateral { found: i64 },
    #[error("building address is required")]
    MissingAddress,
    #[error("building {field} is required")]
    MissingUnitDescriptor { field: &'static str },
    #[error("floor area '{found}' must be a positive number")]
    InvalidArea { found: String },
    #[error("building id is required")]
    MissingBuildingId,
    #[error("evidence storage key is required")]
    MissingStorageKey,
}

fn collapse_whitespace(value: &str) -> String {
    value
        .replace(['\u{feff}', '\u{200b}'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical text for an area so `84.970` and `84.97` key the same unit.
fn normalize_area(raw: &str) -> Result<String, IntakeViolation> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(format!("{value}")),
        _ => Err(IntakeViolation::InvalidArea {
            found: trimmed.to_string(),
        }),
    }
}

fn non_negative(value: i64) -> Option<u64> {
    u64::try_from(value).ok()
}

/// Guard responsible for turning raw submissions into validated drafts.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    pub fn building_from_submission(
        &self,
        submission: BuildingSubmission,
    ) -> Result<BuildingDraft, IntakeViolation> {
        let address = collapse_whitespace(&submission.address);
        if address.is_empty() {
            return Err(IntakeViolation::MissingAddress);
        }

        let dong = collapse_whitespace(&submission.dong);
        let unit = collapse_whitespace(&submission.unit);
        if unit.is_empty() {
            return Err(IntakeViolation::MissingUnitDescriptor { field: "unit" });
        }

        let area = normalize_area(&submission.area)?;

        let collateral_amount = submission
            .collateral_amount
            .map(|amount| {
                non_negative(amount).ok_or(IntakeViolation::NegativeCollateral { found: amount })
            })
            .transpose()?;

        Ok(BuildingDraft {
            key: BuildingKey {
                address,
                dong,
                unit,
                area,
            },
            building_type: submission.building_type,
            lien_registration_date: submission.lien_registration_date,
            collateral_amount,
        })
    }

    pub fn contract_terms(
        &self,
        submission: ContractSubmission,
    ) -> Result<ContractTerms, IntakeViolation> {
        let deposit = non_negative(submission.deposit).ok_or(IntakeViolation::NegativeDeposit {
            found: submission.deposit,
        })?;

        if submission.building_id.0.trim().is_empty() {
            return Err(IntakeViolation::MissingBuildingId);
        }

        let contract_image = submission
            .contract_image
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(ContractTerms {
            building_id: submission.building_id,
            has_lived: submission.has_lived,
            transport_report_date: submission.transport_report_date,
            confirmation_date: submission.confirmation_date,
            has_landlord_intervention: submission.has_landlord_intervention,
            has_applied_dividend: submission.has_applied_dividend,
            deposit,
            contract_image,
        })
    }

    pub fn evidence(
        &self,
        submission: EvidenceSubmission,
    ) -> Result<EvidenceSubmission, IntakeViolation> {
        let storage_key = submission.storage_key.trim().to_string();
        if storage_key.is_empty() {
            return Err(IntakeViolation::MissingStorageKey);
        }
        Ok(EvidenceSubmission {
            category: submission.category,
            storage_key,
        })
    }
}
