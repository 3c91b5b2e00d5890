use super::super::caps::CapAmounts;
use super::super::facts::EligibilityFacts;
use super::{EligibilityGate, GateComponent};

pub(crate) struct GateSignals {
    pub standing: bool,
    pub low_income_qualified: bool,
    pub tentative_repayment: u64,
    pub evidence_submitted: bool,
}

pub(crate) fn evaluate_gates(
    facts: &EligibilityFacts,
    cap: &CapAmounts,
) -> (Vec<GateComponent>, GateSignals) {
    let (standing_component, standing) = standing_gate(facts);
    let (low_income_component, low_income_qualified, tentative_repayment) =
        low_income_gate(facts, cap);
    let (evidence_component, evidence_submitted) = evidence_gate(facts);

    let components = vec![standing_component, low_income_component, evidence_component];
    let signals = GateSignals {
        standing,
        low_income_qualified,
        tentative_repayment,
        evidence_submitted,
    };

    (components, signals)
}

fn standing_gate(facts: &EligibilityFacts) -> (GateComponent, bool) {
    let mut unmet = Vec::new();
    if !facts.has_applied_dividend {
        unmet.push("no dividend application filed");
    }
    if !facts.has_lived {
        unmet.push("tenant has not occupied the unit");
    }
    if facts.has_landlord_intervention {
        unmet.push("landlord interfered with registration");
    }
    if !facts.has_transport_report {
        unmet.push("move-in registration date missing");
    }
    if !facts.has_confirmation {
        unmet.push("fixed-date confirmation missing");
    }

    let passed = unmet.is_empty();
    let notes = if passed {
        "occupancy, registration, fixed date, and dividend application all present".to_string()
    } else {
        unmet.join("; ")
    };

    (
        GateComponent {
            gate: EligibilityGate::Standing,
            passed,
            notes,
        },
        passed,
    )
}

fn low_income_gate(facts: &EligibilityFacts, cap: &CapAmounts) -> (GateComponent, bool, u64) {
    if facts.deposit_amount == 0 {
        return (
            GateComponent {
                gate: EligibilityGate::LowIncomeTenant,
                passed: false,
                notes: "no deposit recorded on the contract".to_string(),
            },
            false,
            0,
        );
    }

    if facts.deposit_amount <= cap.max_protected_deposit {
        let tentative = facts.deposit_amount.min(cap.max_priority_repayment);
        (
            GateComponent {
                gate: EligibilityGate::LowIncomeTenant,
                passed: true,
                notes: format!(
                    "deposit {} within {} protection cap {}; priority repayment up to {}",
                    facts.deposit_amount,
                    cap.region,
                    cap.max_protected_deposit,
                    tentative
                ),
            },
            true,
            tentative,
        )
    } else {
        (
            GateComponent {
                gate: EligibilityGate::LowIncomeTenant,
                passed: false,
                notes: format!(
                    "deposit {} exceeds {} protection cap {}",
                    facts.deposit_amount, cap.region, cap.max_protected_deposit
                ),
            },
            false,
            0,
        )
    }
}

fn evidence_gate(facts: &EligibilityFacts) -> (GateComponent, bool) {
    let passed = facts.evidence_submitted;
    let notes = if passed {
        "supporting evidence on file"
    } else {
        "no supporting evidence registered for the contract"
    };

    (
        GateComponent {
            gate: EligibilityGate::Evidence,
            passed,
            notes: notes.to_string(),
        },
        passed,
    )
}
