//! Competition criteria: scoring strategies plus the static rules that say how
//! their results are ranked and combined.

mod catalogue;
mod events;
mod labor;
mod publicity;
mod ratio;
mod reporting;
mod safety;
pub mod tables;

pub use events::{EventLevel, EventParticipationScorer, OrganizedEventsScorer, ThresholdRule};
pub use labor::{LaborEarningsScorer, WorkDaysScorer};
pub use publicity::{FlagRule, PublicityScorer};
pub use ratio::{MembershipFeeScorer, TrainingScorer};
pub use reporting::ReportDelayScorer;
pub use safety::SafetyViolationsScorer;

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use storage::models::CriterionReport;

use crate::error::{ConfigError, PayloadError, ScoringError};
use crate::rank::Better;

/// Result of scoring one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Evaluation {
    /// Continuous score, ranked against peers afterwards.
    Score(Decimal),
    /// Absolute place taken straight from a lookup table.
    Place(u32),
    /// Continuous score plus a place offset added after ranking.
    ScoreWithBonus { score: Decimal, bonus: u32 },
}

impl Evaluation {
    /// Value persisted on the report when it is verified.
    pub fn stored_score(&self) -> Decimal {
        match self {
            Evaluation::Score(score) | Evaluation::ScoreWithBonus { score, .. } => *score,
            Evaluation::Place(place) => Decimal::from(*place),
        }
    }
}

/// Strategy turning a criterion's raw payload into an [`Evaluation`].
///
/// Absent or zero fields must evaluate to a score of zero rather than fail;
/// only a payload of the wrong shape is an error.
pub trait CriterionScorer: Send + Sync + fmt::Debug {
    fn evaluate(&self, data: &Value) -> Result<Evaluation, PayloadError>;

    /// Checks the scorer's static tables.
    fn validate(&self, _criterion: &str) -> Result<(), ConfigError> {
        Ok(())
    }
}

pub(crate) fn decode<T: DeserializeOwned>(data: &Value) -> serde_json::Result<T> {
    if data.is_null() {
        return serde_json::from_value(Value::Object(Default::default()));
    }
    T::deserialize(data)
}

/// How two partners' outcomes become one pair outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TandemPolicy {
    /// Pair place is the mean of both partners' places, rounded to two
    /// decimals. A partner without a report counts as `missing_place`.
    AverageOfPlaces { missing_place: u32 },
    /// Partner scores are added (a missing partner counts as
    /// `missing_score`) and pair sums are dense-ranked.
    SumThenRank { missing_score: Decimal },
}

/// Which standings a criterion contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RankingModel {
    Solo,
    Tandem,
    Both,
}

impl RankingModel {
    pub fn includes_solo(self) -> bool {
        matches!(self, RankingModel::Solo | RankingModel::Both)
    }

    pub fn includes_tandem(self) -> bool {
        matches!(self, RankingModel::Tandem | RankingModel::Both)
    }
}

#[derive(Debug)]
pub struct CriterionDefinition {
    pub key: String,
    pub title: String,
    pub better: Better,
    pub tandem_policy: TandemPolicy,
    pub model: RankingModel,
    scorer: Box<dyn CriterionScorer>,
}

impl CriterionDefinition {
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        better: Better,
        tandem_policy: TandemPolicy,
        model: RankingModel,
        scorer: Box<dyn CriterionScorer>,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            better,
            tandem_policy,
            model,
            scorer,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let TandemPolicy::AverageOfPlaces { missing_place } = self.tandem_policy
            && missing_place == 0
        {
            return Err(ConfigError::InvalidPlace {
                criterion: self.key.clone(),
                place: missing_place,
            });
        }
        self.scorer.validate(&self.key)
    }

    pub fn evaluate(&self, report: &CriterionReport) -> Result<Evaluation, ScoringError> {
        if report.criterion != self.key {
            return Err(ScoringError::WrongCriterion {
                expected: self.key.clone(),
                actual: report.criterion.clone(),
            });
        }

        self.scorer
            .evaluate(&report.data)
            .map_err(|err| match err {
                PayloadError::Decode(source) => ScoringError::InvalidData {
                    criterion: self.key.clone(),
                    source,
                },
                PayloadError::Overflow(quantity) => ScoringError::Overflow {
                    criterion: self.key.clone(),
                    quantity,
                },
            })
    }

    /// What a unit without any data would score. Used for a tandem partner
    /// that never reported.
    pub fn empty_evaluation(&self) -> Option<Evaluation> {
        self.scorer.evaluate(&Value::Null).ok()
    }
}

/// Ordered set of criteria known to the engine.
#[derive(Debug)]
pub struct CriterionRegistry {
    definitions: Vec<CriterionDefinition>,
}

impl CriterionRegistry {
    /// Builds a registry. Individual definitions are validated when they are
    /// recomputed, so one broken table only disables its own criterion.
    pub fn new(definitions: Vec<CriterionDefinition>) -> Result<Self, ConfigError> {
        for (i, definition) in definitions.iter().enumerate() {
            if definitions[..i]
                .iter()
                .any(|earlier| earlier.key == definition.key)
            {
                return Err(ConfigError::DuplicateCriterion(definition.key.clone()));
            }
        }
        Ok(Self { definitions })
    }

    /// The criteria of the annual competition.
    pub fn standard() -> Self {
        Self {
            definitions: catalogue::standard_definitions(),
        }
    }

    pub fn get(&self, key: &str) -> Result<&CriterionDefinition, ConfigError> {
        self.definitions
            .iter()
            .find(|definition| definition.key == key)
            .ok_or_else(|| ConfigError::UnknownCriterion(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CriterionDefinition> {
        self.definitions.iter()
    }

    /// Criteria counted in the solo overall standing.
    pub fn solo_keys(&self) -> Vec<&str> {
        self.definitions
            .iter()
            .filter(|definition| definition.model.includes_solo())
            .map(|definition| definition.key.as_str())
            .collect()
    }

    /// Criteria counted in the tandem overall standing.
    pub fn tandem_keys(&self) -> Vec<&str> {
        self.definitions
            .iter()
            .filter(|definition| definition.model.includes_tandem())
            .map(|definition| definition.key.as_str())
            .collect()
    }
}
