use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::{CriterionScorer, Evaluation, decode};
use crate::error::PayloadError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReportDelayData {
    due_on: Option<NaiveDate>,
    submitted_on: Option<NaiveDate>,
}

/// Days the annual report arrived after its due date; zero when on time or
/// when either date is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportDelayScorer;

impl CriterionScorer for ReportDelayScorer {
    fn evaluate(&self, data: &Value) -> Result<Evaluation, PayloadError> {
        let data: ReportDelayData = decode(data)?;
        let days = match (data.due_on, data.submitted_on) {
            (Some(due_on), Some(submitted_on)) => (submitted_on - due_on).num_days().max(0),
            _ => 0,
        };
        Ok(Evaluation::Score(Decimal::from(days)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn late_submission_counts_days() {
        let data = json!({ "due_on": "2025-01-15", "submitted_on": "2025-02-01" });
        assert_eq!(
            ReportDelayScorer.evaluate(&data).unwrap(),
            Evaluation::Score(dec!(17))
        );
    }

    #[test]
    fn early_submission_is_zero() {
        let data = json!({ "due_on": "2025-01-15", "submitted_on": "2025-01-02" });
        assert_eq!(
            ReportDelayScorer.evaluate(&data).unwrap(),
            Evaluation::Score(Decimal::ZERO)
        );
    }
}
