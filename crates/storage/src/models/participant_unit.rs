use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ParticipantUnit {
    pub unit_id: Uuid,
    pub name: String,
    pub founding_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

impl ParticipantUnit {
    pub fn new(name: impl Into<String>, founding_date: NaiveDate) -> Self {
        Self {
            unit_id: Uuid::new_v4(),
            name: name.into(),
            founding_date,
            created_at: Utc::now().naive_utc(),
        }
    }

    /// A unit founded on or after the cutoff is a junior (mentee-eligible) unit.
    pub fn is_junior(&self, cutoff: NaiveDate) -> bool {
        self.founding_date >= cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn founding_on_cutoff_is_junior() {
        let cutoff = NaiveDate::from_ymd_opt(2024, 1, 25).unwrap();
        let unit = ParticipantUnit::new("Polaris", cutoff);
        assert!(unit.is_junior(cutoff));

        let senior = ParticipantUnit::new("Meridian", NaiveDate::from_ymd_opt(2019, 9, 1).unwrap());
        assert!(!senior.is_junior(cutoff));
    }
}
