use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Competition, ParticipantUnit};

/// Repository for competitions and the units taking part in them
pub struct CompetitionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CompetitionRepository<'a> {
    /// Create a new CompetitionRepository
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a competition by ID, `None` when it does not exist
    pub async fn find_by_id(&self, competition_id: Uuid) -> Result<Option<Competition>> {
        let competition = sqlx::query_as::<_, Competition>(
            r#"
            SELECT competition_id, name, year, status, junior_cutoff, created_at
            FROM competitions
            WHERE competition_id = $1
            "#,
        )
        .bind(competition_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(competition)
    }

    /// Units referenced by a participation entry of the competition, on either side
    pub async fn participant_units(&self, competition_id: Uuid) -> Result<Vec<ParticipantUnit>> {
        let units = sqlx::query_as::<_, ParticipantUnit>(
            r#"
            SELECT DISTINCT u.unit_id, u.name, u.founding_date, u.created_at
            FROM participant_units u
            INNER JOIN participation_entries p
                ON u.unit_id = p.junior_unit_id OR u.unit_id = p.main_unit_id
            WHERE p.competition_id = $1
            ORDER BY u.unit_id
            "#,
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(units)
    }
}
