//! Versioned statutory cap table for small-deposit priority repayment.
//!
//! Caps are keyed by region class and an inclusive effective-date window. Lookups never
//! fall back to a default tier: an unknown address or an uncovered date is reported to
//! the caller as a [`CapLookupError`].

mod parser;
mod region;
mod statutory;

pub use parser::CapTableImportError;
pub use region::{classify_region, RegionClass};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// One row of the table: the caps for a region over an effective-date window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapTier {
    pub region: RegionClass,
    pub effective_from: NaiveDate,
    /// Inclusive; `None` means still in force.
    pub effective_to: Option<NaiveDate>,
    pub max_protected_deposit: u64,
    pub max_priority_repayment: u64,
}

impl CapTier {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.effective_from <= date && self.effective_to.map_or(true, |to| date <= to)
    }

    fn amounts(&self) -> CapAmounts {
        CapAmounts {
            region: self.region,
            effective_from: self.effective_from,
            max_protected_deposit: self.max_protected_deposit,
            max_priority_repayment: self.max_priority_repayment,
        }
    }
}

/// Resolved caps for a single region/date lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapAmounts {
    pub region: RegionClass,
    pub effective_from: NaiveDate,
    pub max_protected_deposit: u64,
    pub max_priority_repayment: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapLookupError {
    #[error("address '{address}' does not map to a recognized statutory region")]
    RegionNotRecognized { address: String },
    #[error("no statutory cap tier for region {region} is effective on {date}")]
    NoEffectiveTierForDate { region: RegionClass, date: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapTable {
    tiers: Vec<CapTier>,
}

impl CapTable {
    pub fn new(mut tiers: Vec<CapTier>) -> Self {
        tiers.sort_by(|left, right| {
            left.region
                .cmp(&right.region)
                .then(left.effective_from.cmp(&right.effective_from))
        });
        Self { tiers }
    }

    /// Tiers in force since the 2010 amendment of the enforcement decree.
    pub fn statutory() -> Self {
        Self::new(statutory::statutory_tiers())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CapTableImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CapTableImportError> {
        parser::parse_tiers(reader).map(Self::new)
    }

    pub fn tiers(&self) -> &[CapTier] {
        &self.tiers
    }

    /// Resolve the caps for a building address as of `as_of`.
    pub fn resolve_cap(
        &self,
        address: &str,
        as_of: NaiveDate,
    ) -> Result<CapAmounts, CapLookupError> {
        let region =
            classify_region(address, as_of).ok_or_else(|| CapLookupError::RegionNotRecognized {
                address: address.trim().to_string(),
            })?;
        self.tier_for(region, as_of)
    }

    pub fn tier_for(
        &self,
        region: RegionClass,
        as_of: NaiveDate,
    ) -> Result<CapAmounts, CapLookupError> {
        self.tiers
            .iter()
            .filter(|tier| tier.region == region && tier.covers(as_of))
            .max_by_key(|tier| tier.effective_from)
            .map(CapTier::amounts)
            .ok_or(CapLookupError::NoEffectiveTierForDate {
                region,
                date: as_of,
            })
    }
}

impl Default for CapTable {
    fn default() -> Self {
        Self::statutory()
    }
}
