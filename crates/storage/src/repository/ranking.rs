use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{
    CriterionRanking, CriterionTandemRanking, OverallRanking, OverallTandemRanking,
};

// Keeps each INSERT well below the Postgres bind parameter limit.
const INSERT_CHUNK: usize = 1000;

/// Repository for the derived ranking tables.
///
/// Replacement methods take an open transaction; the caller commits.
pub struct RankingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RankingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    /// Serializes ranking writes of one competition until the transaction ends
    pub async fn lock_competition(
        tx: &mut Transaction<'_, Postgres>,
        competition_id: Uuid,
    ) -> Result<()> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
            .bind(competition_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn criterion_rankings(&self, competition_id: Uuid) -> Result<Vec<CriterionRanking>> {
        let rows = sqlx::query_as::<_, CriterionRanking>(
            r#"
            SELECT competition_id, criterion, unit_id, place
            FROM criterion_rankings
            WHERE competition_id = $1
            ORDER BY criterion, place, unit_id
            "#,
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn criterion_tandem_rankings(
        &self,
        competition_id: Uuid,
    ) -> Result<Vec<CriterionTandemRanking>> {
        let rows = sqlx::query_as::<_, CriterionTandemRanking>(
            r#"
            SELECT competition_id, criterion, main_unit_id, junior_unit_id, place
            FROM criterion_tandem_rankings
            WHERE competition_id = $1
            ORDER BY criterion, place, main_unit_id
            "#,
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn overall_rankings(&self, competition_id: Uuid) -> Result<Vec<OverallRanking>> {
        let rows = sqlx::query_as::<_, OverallRanking>(
            r#"
            SELECT competition_id, unit_id, places_sum, place
            FROM overall_rankings
            WHERE competition_id = $1
            ORDER BY place, unit_id
            "#,
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn overall_tandem_rankings(
        &self,
        competition_id: Uuid,
    ) -> Result<Vec<OverallTandemRanking>> {
        let rows = sqlx::query_as::<_, OverallTandemRanking>(
            r#"
            SELECT competition_id, main_unit_id, junior_unit_id, places_sum, place
            FROM overall_tandem_rankings
            WHERE competition_id = $1
            ORDER BY place, main_unit_id
            "#,
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn delete_criterion(
        tx: &mut Transaction<'_, Postgres>,
        competition_id: Uuid,
        criterion: &str,
    ) -> Result<()> {
        sqlx::query("DELETE FROM criterion_rankings WHERE competition_id = $1 AND criterion = $2")
            .bind(competition_id)
            .bind(criterion)
            .execute(&mut **tx)
            .await?;

        sqlx::query(
            "DELETE FROM criterion_tandem_rankings WHERE competition_id = $1 AND criterion = $2",
        )
        .bind(competition_id)
        .bind(criterion)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn insert_criterion_rankings(
        tx: &mut Transaction<'_, Postgres>,
        rows: &[CriterionRanking],
    ) -> Result<()> {
        for chunk in rows.chunks(INSERT_CHUNK) {
            let mut query = QueryBuilder::<Postgres>::new(
                "INSERT INTO criterion_rankings (competition_id, criterion, unit_id, place) ",
            );
            query.push_values(chunk, |mut row_builder, row| {
                row_builder
                    .push_bind(row.competition_id)
                    .push_bind(row.criterion.clone())
                    .push_bind(row.unit_id)
                    .push_bind(row.place);
            });
            query
                .build()
                .execute(&mut **tx)
                .await
                .map_err(StorageError::from_write)?;
        }
        Ok(())
    }

    pub async fn insert_criterion_tandem_rankings(
        tx: &mut Transaction<'_, Postgres>,
        rows: &[CriterionTandemRanking],
    ) -> Result<()> {
        for chunk in rows.chunks(INSERT_CHUNK) {
            let mut query = QueryBuilder::<Postgres>::new(
                "INSERT INTO criterion_tandem_rankings \
                 (competition_id, criterion, main_unit_id, junior_unit_id, place) ",
            );
            query.push_values(chunk, |mut row_builder, row| {
                row_builder
                    .push_bind(row.competition_id)
                    .push_bind(row.criterion.clone())
                    .push_bind(row.main_unit_id)
                    .push_bind(row.junior_unit_id)
                    .push_bind(row.place);
            });
            query
                .build()
                .execute(&mut **tx)
                .await
                .map_err(StorageError::from_write)?;
        }
        Ok(())
    }

    pub async fn delete_overall(
        tx: &mut Transaction<'_, Postgres>,
        competition_id: Uuid,
    ) -> Result<()> {
        sqlx::query("DELETE FROM overall_rankings WHERE competition_id = $1")
            .bind(competition_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query("DELETE FROM overall_tandem_rankings WHERE competition_id = $1")
            .bind(competition_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub async fn insert_overall_rankings(
        tx: &mut Transaction<'_, Postgres>,
        rows: &[OverallRanking],
    ) -> Result<()> {
        for chunk in rows.chunks(INSERT_CHUNK) {
            let mut query = QueryBuilder::<Postgres>::new(
                "INSERT INTO overall_rankings (competition_id, unit_id, places_sum, place) ",
            );
            query.push_values(chunk, |mut row_builder, row| {
                row_builder
                    .push_bind(row.competition_id)
                    .push_bind(row.unit_id)
                    .push_bind(row.places_sum)
                    .push_bind(row.place);
            });
            query
                .build()
                .execute(&mut **tx)
                .await
                .map_err(StorageError::from_write)?;
        }
        Ok(())
    }

    pub async fn insert_overall_tandem_rankings(
        tx: &mut Transaction<'_, Postgres>,
        rows: &[OverallTandemRanking],
    ) -> Result<()> {
        for chunk in rows.chunks(INSERT_CHUNK) {
            let mut query = QueryBuilder::<Postgres>::new(
                "INSERT INTO overall_tandem_rankings \
                 (competition_id, main_unit_id, junior_unit_id, places_sum, place) ",
            );
            query.push_values(chunk, |mut row_builder, row| {
                row_builder
                    .push_bind(row.competition_id)
                    .push_bind(row.main_unit_id)
                    .push_bind(row.junior_unit_id)
                    .push_bind(row.places_sum)
                    .push_bind(row.place);
            });
            query
                .build()
                .execute(&mut **tx)
                .await
                .map_err(StorageError::from_write)?;
        }
        Ok(())
    }
}
