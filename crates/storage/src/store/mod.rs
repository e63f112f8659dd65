mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Competition, CriterionRanking, CriterionReport, CriterionTandemRanking, OverallRanking,
    OverallTandemRanking, ParticipantUnit, ParticipationEntry,
};

/// Data access used by the ranking engine.
///
/// Every `replace_*` operation is a full replacement of the addressed scope:
/// either the new set is visible in its entirety or the previous set is kept.
#[async_trait::async_trait]
pub trait CompetitionStore: Send + Sync {
    async fn competition(&self, competition_id: Uuid) -> Result<Option<Competition>>;

    /// Units referenced by any participation entry of the competition.
    async fn participant_units(&self, competition_id: Uuid) -> Result<Vec<ParticipantUnit>>;

    async fn participation_entries(&self, competition_id: Uuid) -> Result<Vec<ParticipationEntry>>;

    /// Verified reports of one criterion, ordered by unit.
    async fn verified_reports(
        &self,
        competition_id: Uuid,
        criterion: &str,
    ) -> Result<Vec<CriterionReport>>;

    async fn find_report(&self, report_id: Uuid) -> Result<Option<CriterionReport>>;

    /// Marks an unverified report as verified with its score.
    ///
    /// Returns `false` without changing anything when the report was already
    /// verified, so concurrent verifiers cannot both succeed.
    async fn mark_report_verified(&self, report_id: Uuid, score: Decimal) -> Result<bool>;

    async fn criterion_rankings(&self, competition_id: Uuid) -> Result<Vec<CriterionRanking>>;

    async fn criterion_tandem_rankings(
        &self,
        competition_id: Uuid,
    ) -> Result<Vec<CriterionTandemRanking>>;

    async fn replace_criterion_rankings(
        &self,
        competition_id: Uuid,
        criterion: &str,
        solo: &[CriterionRanking],
        tandem: &[CriterionTandemRanking],
    ) -> Result<()>;

    async fn overall_rankings(&self, competition_id: Uuid) -> Result<Vec<OverallRanking>>;

    async fn overall_tandem_rankings(&self, competition_id: Uuid)
    -> Result<Vec<OverallTandemRanking>>;

    async fn replace_overall_rankings(
        &self,
        competition_id: Uuid,
        solo: &[OverallRanking],
        tandem: &[OverallTandemRanking],
    ) -> Result<()>;
}
