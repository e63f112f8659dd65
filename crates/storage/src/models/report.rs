use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Raw submission of one unit for one criterion.
///
/// `data` holds the criterion-specific payload as submitted, including nested
/// line items. `score` is written only when the report is verified.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CriterionReport {
    pub report_id: Uuid,
    pub competition_id: Uuid,
    pub unit_id: Uuid,
    pub criterion: String,
    pub verified: bool,
    pub score: Option<Decimal>,
    pub data: Value,
    pub submitted_at: NaiveDateTime,
    pub verified_at: Option<NaiveDateTime>,
}

impl CriterionReport {
    pub fn submitted(
        competition_id: Uuid,
        unit_id: Uuid,
        criterion: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            report_id: Uuid::new_v4(),
            competition_id,
            unit_id,
            criterion: criterion.into(),
            verified: false,
            score: None,
            data,
            submitted_at: Utc::now().naive_utc(),
            verified_at: None,
        }
    }

    /// Flags the report as verified, keeping the score unset until a scorer runs.
    pub fn into_verified(mut self) -> Self {
        self.verified = true;
        self.verified_at = Some(Utc::now().naive_utc());
        self
    }
}
