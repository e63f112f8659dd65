use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Annual contest. Only `status` changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Competition {
    pub competition_id: Uuid,
    pub name: String,
    pub year: i32,
    pub status: String,
    /// Units founded on or after this date compete as juniors.
    pub junior_cutoff: NaiveDate,
    pub created_at: NaiveDateTime,
}

impl Competition {
    pub fn new(name: impl Into<String>, year: i32, junior_cutoff: NaiveDate) -> Self {
        Self {
            competition_id: Uuid::new_v4(),
            name: name.into(),
            year,
            status: "open".to_string(),
            junior_cutoff,
            created_at: Utc::now().naive_utc(),
        }
    }
}
