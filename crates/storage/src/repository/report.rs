use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::CriterionReport;

/// Repository for criterion reports
pub struct ReportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Verified reports of one criterion in a competition
    pub async fn list_verified(
        &self,
        competition_id: Uuid,
        criterion: &str,
    ) -> Result<Vec<CriterionReport>> {
        let reports = sqlx::query_as::<_, CriterionReport>(
            r#"
            SELECT report_id, competition_id, unit_id, criterion, verified, score, data,
                   submitted_at, verified_at
            FROM criterion_reports
            WHERE competition_id = $1 AND criterion = $2 AND verified = true
            ORDER BY unit_id
            "#,
        )
        .bind(competition_id)
        .bind(criterion)
        .fetch_all(self.pool)
        .await?;

        Ok(reports)
    }

    pub async fn find_by_id(&self, report_id: Uuid) -> Result<Option<CriterionReport>> {
        let report = sqlx::query_as::<_, CriterionReport>(
            r#"
            SELECT report_id, competition_id, unit_id, criterion, verified, score, data,
                   submitted_at, verified_at
            FROM criterion_reports
            WHERE report_id = $1
            "#,
        )
        .bind(report_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(report)
    }

    /// Flip an unverified report to verified. Returns `false` if it was already verified.
    pub async fn mark_verified(&self, report_id: Uuid, score: Decimal) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE criterion_reports
            SET verified = true, score = $2, verified_at = CURRENT_TIMESTAMP
            WHERE report_id = $1 AND verified = false
            "#,
        )
        .bind(report_id)
        .bind(score)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        match self.find_by_id(report_id).await? {
            Some(_) => Ok(false),
            None => Err(StorageError::NotFound),
        }
    }
}
