use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::CompetitionStore;
use crate::error::Result;
use crate::models::{
    Competition, CriterionRanking, CriterionReport, CriterionTandemRanking, OverallRanking,
    OverallTandemRanking, ParticipantUnit, ParticipationEntry,
};
use crate::repository::{
    CompetitionRepository, ParticipationRepository, RankingRepository, ReportRepository,
};

/// Postgres-backed store. Ranking replacements run as one transaction each.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CompetitionStore for PgStore {
    async fn competition(&self, competition_id: Uuid) -> Result<Option<Competition>> {
        CompetitionRepository::new(&self.pool)
            .find_by_id(competition_id)
            .await
    }

    async fn participant_units(&self, competition_id: Uuid) -> Result<Vec<ParticipantUnit>> {
        CompetitionRepository::new(&self.pool)
            .participant_units(competition_id)
            .await
    }

    async fn participation_entries(&self, competition_id: Uuid) -> Result<Vec<ParticipationEntry>> {
        ParticipationRepository::new(&self.pool)
            .list_for_competition(competition_id)
            .await
    }

    async fn verified_reports(
        &self,
        competition_id: Uuid,
        criterion: &str,
    ) -> Result<Vec<CriterionReport>> {
        ReportRepository::new(&self.pool)
            .list_verified(competition_id, criterion)
            .await
    }

    async fn find_report(&self, report_id: Uuid) -> Result<Option<CriterionReport>> {
        ReportRepository::new(&self.pool).find_by_id(report_id).await
    }

    async fn mark_report_verified(&self, report_id: Uuid, score: Decimal) -> Result<bool> {
        ReportRepository::new(&self.pool)
            .mark_verified(report_id, score)
            .await
    }

    async fn criterion_rankings(&self, competition_id: Uuid) -> Result<Vec<CriterionRanking>> {
        RankingRepository::new(&self.pool)
            .criterion_rankings(competition_id)
            .await
    }

    async fn criterion_tandem_rankings(
        &self,
        competition_id: Uuid,
    ) -> Result<Vec<CriterionTandemRanking>> {
        RankingRepository::new(&self.pool)
            .criterion_tandem_rankings(competition_id)
            .await
    }

    async fn replace_criterion_rankings(
        &self,
        competition_id: Uuid,
        criterion: &str,
        solo: &[CriterionRanking],
        tandem: &[CriterionTandemRanking],
    ) -> Result<()> {
        let mut tx = RankingRepository::new(&self.pool).begin().await?;

        RankingRepository::lock_competition(&mut tx, competition_id).await?;
        RankingRepository::delete_criterion(&mut tx, competition_id, criterion).await?;
        RankingRepository::insert_criterion_rankings(&mut tx, solo).await?;
        RankingRepository::insert_criterion_tandem_rankings(&mut tx, tandem).await?;

        tx.commit().await?;
        tracing::debug!(
            "Replaced {} rankings for competition {}: {} solo, {} tandem",
            criterion,
            competition_id,
            solo.len(),
            tandem.len()
        );
        Ok(())
    }

    async fn overall_rankings(&self, competition_id: Uuid) -> Result<Vec<OverallRanking>> {
        RankingRepository::new(&self.pool)
            .overall_rankings(competition_id)
            .await
    }

    async fn overall_tandem_rankings(
        &self,
        competition_id: Uuid,
    ) -> Result<Vec<OverallTandemRanking>> {
        RankingRepository::new(&self.pool)
            .overall_tandem_rankings(competition_id)
            .await
    }

    async fn replace_overall_rankings(
        &self,
        competition_id: Uuid,
        solo: &[OverallRanking],
        tandem: &[OverallTandemRanking],
    ) -> Result<()> {
        let mut tx = RankingRepository::new(&self.pool).begin().await?;

        RankingRepository::lock_competition(&mut tx, competition_id).await?;
        RankingRepository::delete_overall(&mut tx, competition_id).await?;
        RankingRepository::insert_overall_rankings(&mut tx, solo).await?;
        RankingRepository::insert_overall_tandem_rankings(&mut tx, tandem).await?;

        tx.commit().await?;
        tracing::debug!(
            "Replaced overall rankings for competition {}: {} solo, {} tandem",
            competition_id,
            solo.len(),
            tandem.len()
        );
        Ok(())
    }
}
