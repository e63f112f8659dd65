use serde::Deserialize;
use serde_json::Value;

use super::tables::{BandTable, percent};
use super::{CriterionScorer, Evaluation, decode};
use crate::error::{ConfigError, PayloadError};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MembershipFeeData {
    members_total: u32,
    members_paid: u32,
}

/// Share of members who paid the annual fee, banded into places.
#[derive(Debug, Clone)]
pub struct MembershipFeeScorer {
    pub bands: BandTable,
}

impl Default for MembershipFeeScorer {
    fn default() -> Self {
        Self {
            bands: BandTable::uniform(5, 20),
        }
    }
}

impl CriterionScorer for MembershipFeeScorer {
    fn evaluate(&self, data: &Value) -> Result<Evaluation, PayloadError> {
        let data: MembershipFeeData = decode(data)?;
        let share = percent(data.members_paid, data.members_total);
        Ok(Evaluation::Place(self.bands.place_for(share)))
    }

    fn validate(&self, criterion: &str) -> Result<(), ConfigError> {
        self.bands.validate(criterion)
    }
}

#[derive(Debug, Deserialize)]
struct TrainedMember {
    #[serde(default = "completed_default")]
    completed: bool,
}

fn completed_default() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TrainingData {
    members_total: u32,
    trained_members: Vec<TrainedMember>,
}

/// Share of members who completed professional training, banded into places.
/// Only line items with a completed course count.
#[derive(Debug, Clone)]
pub struct TrainingScorer {
    pub bands: BandTable,
}

impl CriterionScorer for TrainingScorer {
    fn evaluate(&self, data: &Value) -> Result<Evaluation, PayloadError> {
        let data: TrainingData = decode(data)?;
        let completed = data
            .trained_members
            .iter()
            .filter(|member| member.completed)
            .count();
        let completed = u32::try_from(completed).unwrap_or(u32::MAX);
        let share = percent(completed, data.members_total);
        Ok(Evaluation::Place(self.bands.place_for(share)))
    }

    fn validate(&self, criterion: &str) -> Result<(), ConfigError> {
        self.bands.validate(criterion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::tables::Band;
    use serde_json::json;

    fn training() -> TrainingScorer {
        TrainingScorer {
            bands: BandTable::new(vec![
                Band::new(50, 1),
                Band::new(40, 2),
                Band::new(30, 3),
                Band::new(20, 4),
                Band::new(10, 5),
                Band::new(0, 6),
            ]),
        }
    }

    #[test]
    fn membership_fee_bands() {
        let scorer = MembershipFeeScorer::default();
        let place = |paid, total| {
            scorer
                .evaluate(&json!({ "members_total": total, "members_paid": paid }))
                .unwrap()
        };

        assert_eq!(place(20, 20), Evaluation::Place(1));
        assert_eq!(place(19, 20), Evaluation::Place(1));
        assert_eq!(place(18, 20), Evaluation::Place(2));
        assert_eq!(place(17, 20), Evaluation::Place(3));
        assert_eq!(place(0, 20), Evaluation::Place(20));
    }

    #[test]
    fn membership_fee_without_members_takes_the_last_band() {
        let scorer = MembershipFeeScorer::default();
        assert_eq!(scorer.evaluate(&json!({})).unwrap(), Evaluation::Place(20));
    }

    #[test]
    fn training_counts_completed_line_items_only() {
        let data = json!({
            "members_total": 10,
            "trained_members": [
                { "name": "Ivanova" },
                { "name": "Petrov", "completed": true },
                { "name": "Sidorov", "completed": false },
                { "name": "Orlova" },
            ]
        });
        assert_eq!(training().evaluate(&data).unwrap(), Evaluation::Place(3));
    }
}
