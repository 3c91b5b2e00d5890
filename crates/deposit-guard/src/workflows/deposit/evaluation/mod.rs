mod gates;
mod policy;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::caps::{CapAmounts, CapLookupError, CapTable};
use super::domain::ReportStatus;
use super::facts::EligibilityFacts;

/// The three independent gates a priority repayment must clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityGate {
    Standing,
    LowIncomeTenant,
    Evidence,
}

impl EligibilityGate {
    pub const fn label(self) -> &'static str {
        match self {
            EligibilityGate::Standing => "standing",
            EligibilityGate::LowIncomeTenant => "low-income tenant",
            EligibilityGate::Evidence => "evidence",
        }
    }
}

/// Outcome of one gate, kept for audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateComponent {
    pub gate: EligibilityGate,
    pub passed: bool,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: ReportStatus,
    pub standing: bool,
    pub low_income_qualified: bool,
    pub evidence_submitted: bool,
    pub repayment_amount: u64,
    pub cap: CapAmounts,
    pub components: Vec<GateComponent>,
}

/// Pure mapping from facts and a resolved cap tier to a verdict.
pub fn decide(facts: &EligibilityFacts, cap: &CapAmounts) -> Verdict {
    let (components, signals) = gates::evaluate_gates(facts, cap);
    let (status, repayment_amount) = policy::settle(&signals);

    Verdict {
        status,
        standing: signals.standing,
        low_income_qualified: signals.low_income_qualified,
        evidence_submitted: signals.evidence_submitted,
        repayment_amount,
        cap: *cap,
        components,
    }
}

/// Resolves the applicable cap tier and runs [`decide`].
#[derive(Debug, Clone)]
pub struct EligibilityEngine {
    caps: Arc<CapTable>,
}

impl EligibilityEngine {
    pub fn new(caps: Arc<CapTable>) -> Self {
        Self { caps }
    }

    pub fn caps(&self) -> &CapTable {
        &self.caps
    }

    /// `evaluated_on` is used only when the facts carry no confirmation date.
    pub fn evaluate(
        &self,
        facts: &EligibilityFacts,
        evaluated_on: NaiveDate,
    ) -> Result<Verdict, CapLookupError> {
        let as_of = facts.cap_reference_date().unwrap_or(evaluated_on);
        let cap = self.caps.resolve_cap(&facts.building_region, as_of)?;
        Ok(decide(facts, &cap))
    }
}
