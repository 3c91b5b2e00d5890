use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{Building, Contract};

/// Inputs consumed by the eligibility engine, flattened from contract, building, and evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityFacts {
    pub deposit_amount: u64,
    pub has_lived: bool,
    pub has_transport_report: bool,
    pub has_confirmation: bool,
    pub has_landlord_intervention: bool,
    pub has_applied_dividend: bool,
    pub evidence_submitted: bool,
    pub building_region: String,
    pub confirmation_date: Option<NaiveDate>,
    pub lien_registration_date: Option<NaiveDate>,
}

impl EligibilityFacts {
    /// Date the cap table is consulted for. Without a confirmation date the standing gate
    /// fails anyway, so callers resolve the cap as of the evaluation date instead.
    pub fn cap_reference_date(&self) -> Option<NaiveDate> {
        self.confirmation_date
    }
}

pub fn collect_facts(
    contract: &Contract,
    building: &Building,
    evidence_exists: bool,
) -> EligibilityFacts {
    EligibilityFacts {
        deposit_amount: contract.deposit,
        has_lived: contract.has_lived,
        has_transport_report: contract.transport_report_date.is_some(),
        has_confirmation: contract.confirmation_date.is_some(),
        has_landlord_intervention: contract.has_landlord_intervention,
        has_applied_dividend: contract.has_applied_dividend,
        evidence_submitted: evidence_exists,
        building_region: building.address().to_string(),
        confirmation_date: contract.confirmation_date,
        lien_registration_date: building.lien_registration_date,
    }
}
