use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tables::LookupTable;
use super::{CriterionScorer, Evaluation, decode};
use crate::error::{ConfigError, PayloadError};

/// Scale of an event, from a single unit's own up to nationwide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Local,
    Regional,
    District,
    AllRussian,
}

#[derive(Debug, Deserialize)]
struct AttendedEvent {
    level: EventLevel,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EventParticipationData {
    events: Vec<AttendedEvent>,
}

/// One point when a unit attended at least `min_count` events of `level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdRule {
    pub level: EventLevel,
    pub min_count: usize,
}

/// Points from per-level attendance thresholds, looked up as a place.
#[derive(Debug, Clone)]
pub struct EventParticipationScorer {
    pub rules: Vec<ThresholdRule>,
    pub places: LookupTable,
}

impl Default for EventParticipationScorer {
    fn default() -> Self {
        let rules = vec![
            ThresholdRule {
                level: EventLevel::AllRussian,
                min_count: 1,
            },
            ThresholdRule {
                level: EventLevel::District,
                min_count: 1,
            },
            ThresholdRule {
                level: EventLevel::Regional,
                min_count: 3,
            },
            ThresholdRule {
                level: EventLevel::Local,
                min_count: 5,
            },
        ];
        let places = LookupTable::descending(rules.len() as u32, 1);
        Self { rules, places }
    }
}

impl EventParticipationScorer {
    fn points(&self, data: &EventParticipationData) -> u32 {
        self.rules
            .iter()
            .filter(|rule| {
                data.events
                    .iter()
                    .filter(|event| event.level == rule.level)
                    .count()
                    >= rule.min_count
            })
            .count() as u32
    }
}

impl CriterionScorer for EventParticipationScorer {
    fn evaluate(&self, data: &Value) -> Result<Evaluation, PayloadError> {
        let data: EventParticipationData = decode(data)?;
        let points = self.points(&data);
        Ok(Evaluation::Place(self.places.get_or_worst(points)))
    }

    fn validate(&self, criterion: &str) -> Result<(), ConfigError> {
        self.places
            .validate_covers(criterion, self.rules.len() as u32)?;
        self.places.validate_places(criterion)
    }
}

#[derive(Debug, Deserialize)]
struct OrganizedEvent {
    level: EventLevel,
    #[serde(default)]
    participants: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OrganizedEventsData {
    events: Vec<OrganizedEvent>,
}

/// Sum over organized events of participants times the weight of the event's level.
#[derive(Debug, Clone)]
pub struct OrganizedEventsScorer {
    pub weights: Vec<(EventLevel, Decimal)>,
}

impl Default for OrganizedEventsScorer {
    fn default() -> Self {
        Self {
            weights: vec![
                (EventLevel::Local, Decimal::ONE),
                (EventLevel::Regional, Decimal::new(15, 1)),
                (EventLevel::District, Decimal::from(2)),
                (EventLevel::AllRussian, Decimal::from(3)),
            ],
        }
    }
}

impl OrganizedEventsScorer {
    fn weight(&self, level: EventLevel) -> Decimal {
        self.weights
            .iter()
            .find(|(weighted, _)| *weighted == level)
            .map_or(Decimal::ZERO, |(_, weight)| *weight)
    }
}

impl CriterionScorer for OrganizedEventsScorer {
    fn evaluate(&self, data: &Value) -> Result<Evaluation, PayloadError> {
        let data: OrganizedEventsData = decode(data)?;
        let score = data
            .events
            .iter()
            .map(|event| Decimal::from(event.participants) * self.weight(event.level))
            .sum();
        Ok(Evaluation::Score(score))
    }
}
