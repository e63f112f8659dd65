use serde::Deserialize;
use serde_json::Value;

use super::{CriterionScorer, Evaluation, decode};
use crate::error::{ConfigError, PayloadError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Violations {
    Absent,
    Present,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SafetyData {
    violations: Option<Violations>,
}

/// Safety record mapped straight to a place. An undeclared record is treated
/// like a record with violations.
#[derive(Debug, Clone, Copy)]
pub struct SafetyViolationsScorer {
    pub absent_place: u32,
    pub present_place: u32,
}

impl Default for SafetyViolationsScorer {
    fn default() -> Self {
        Self {
            absent_place: 1,
            present_place: 2,
        }
    }
}

impl CriterionScorer for SafetyViolationsScorer {
    fn evaluate(&self, data: &Value) -> Result<Evaluation, PayloadError> {
        let data: SafetyData = decode(data)?;
        let place = match data.violations {
            Some(Violations::Absent) => self.absent_place,
            Some(Violations::Present) | None => self.present_place,
        };
        Ok(Evaluation::Place(place))
    }

    fn validate(&self, criterion: &str) -> Result<(), ConfigError> {
        let place = self.absent_place.min(self.present_place);
        if place == 0 {
            return Err(ConfigError::InvalidPlace {
                criterion: criterion.to_string(),
                place,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_each_status() {
        let scorer = SafetyViolationsScorer::default();
        assert_eq!(
            scorer.evaluate(&json!({ "violations": "absent" })).unwrap(),
            Evaluation::Place(1)
        );
        assert_eq!(
            scorer.evaluate(&json!({ "violations": "present" })).unwrap(),
            Evaluation::Place(2)
        );
        assert_eq!(scorer.evaluate(&json!({})).unwrap(), Evaluation::Place(2));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let scorer = SafetyViolationsScorer::default();
        assert!(scorer.evaluate(&json!({ "violations": "maybe" })).is_err());
    }
}
