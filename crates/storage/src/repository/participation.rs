use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::ParticipationEntry;

pub struct ParticipationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ParticipationRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All confirmed entries of a competition, oldest first
    pub async fn list_for_competition(&self, competition_id: Uuid) -> Result<Vec<ParticipationEntry>> {
        let entries = sqlx::query_as::<_, ParticipationEntry>(
            r#"
            SELECT entry_id, competition_id, junior_unit_id, main_unit_id, created_at
            FROM participation_entries
            WHERE competition_id = $1
            ORDER BY created_at, entry_id
            "#,
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }
}
