use super::super::domain::ReportStatus;
use super::gates::GateSignals;
use super::Verdict;

/// Repayment is paid only when every gate passes; status follows the amount.
pub(crate) fn settle(signals: &GateSignals) -> (ReportStatus, u64) {
    let all_gates =
        signals.standing && signals.evidence_submitted && signals.low_income_qualified;
    let repayment = if all_gates {
        signals.tentative_repayment
    } else {
        0
    };

    let status = if repayment > 0 {
        ReportStatus::Complete
    } else {
        ReportStatus::Decisioning
    };

    (status, repayment)
}

impl Verdict {
    pub fn summary(&self) -> String {
        if self.status == ReportStatus::Complete {
            return format!(
                "eligible for priority repayment of {}",
                self.repayment_amount
            );
        }

        let failed: Vec<&'static str> = self
            .components
            .iter()
            .filter(|component| !component.passed)
            .map(|component| component.gate.label())
            .collect();

        format!("under review: {} not satisfied", failed.join(", "))
    }
}
