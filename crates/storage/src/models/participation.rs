use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Confirmed application of a unit (or a mentor/junior pair) to a competition.
///
/// Solo participants are recorded in `junior_unit_id` with no `main_unit_id`.
/// Both columns are nullable in storage; the ranking engine rejects rows where
/// both are missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ParticipationEntry {
    pub entry_id: Uuid,
    pub competition_id: Uuid,
    pub junior_unit_id: Option<Uuid>,
    pub main_unit_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
}

impl ParticipationEntry {
    pub fn solo(competition_id: Uuid, unit_id: Uuid) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            competition_id,
            junior_unit_id: Some(unit_id),
            main_unit_id: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn tandem(competition_id: Uuid, main_unit_id: Uuid, junior_unit_id: Uuid) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            competition_id,
            junior_unit_id: Some(junior_unit_id),
            main_unit_id: Some(main_unit_id),
            created_at: Utc::now().naive_utc(),
        }
    }
}
