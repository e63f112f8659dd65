use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::CompetitionStore;
use crate::error::{Result, StorageError};
use crate::models::{
    Competition, CriterionRanking, CriterionReport, CriterionTandemRanking, OverallRanking,
    OverallTandemRanking, ParticipantUnit, ParticipationEntry,
};

#[derive(Debug, Default)]
struct State {
    competitions: HashMap<Uuid, Competition>,
    units: HashMap<Uuid, ParticipantUnit>,
    entries: Vec<ParticipationEntry>,
    reports: Vec<CriterionReport>,
    criterion_rankings: Vec<CriterionRanking>,
    criterion_tandem_rankings: Vec<CriterionTandemRanking>,
    overall_rankings: Vec<OverallRanking>,
    overall_tandem_rankings: Vec<OverallTandemRanking>,
}

/// In-process store for tests and dry runs.
///
/// Replacement sets are assembled before the lock is taken and swapped in
/// under a single write guard.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While enabled, every ranking replacement fails with `Unavailable`.
    pub fn fail_writes(&self, enabled: bool) {
        self.fail_writes.store(enabled, Ordering::SeqCst);
    }

    pub async fn insert_competition(&self, competition: Competition) {
        let mut state = self.state.write().await;
        state
            .competitions
            .insert(competition.competition_id, competition);
    }

    pub async fn insert_unit(&self, unit: ParticipantUnit) {
        let mut state = self.state.write().await;
        state.units.insert(unit.unit_id, unit);
    }

    pub async fn insert_participation(&self, entry: ParticipationEntry) {
        self.state.write().await.entries.push(entry);
    }

    pub async fn insert_report(&self, report: CriterionReport) {
        self.state.write().await.reports.push(report);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "memory store is in failing mode".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CompetitionStore for MemoryStore {
    async fn competition(&self, competition_id: Uuid) -> Result<Option<Competition>> {
        Ok(self
            .state
            .read()
            .await
            .competitions
            .get(&competition_id)
            .cloned())
    }

    async fn participant_units(&self, competition_id: Uuid) -> Result<Vec<ParticipantUnit>> {
        let state = self.state.read().await;
        let mut units: Vec<ParticipantUnit> = state
            .entries
            .iter()
            .filter(|entry| entry.competition_id == competition_id)
            .flat_map(|entry| [entry.main_unit_id, entry.junior_unit_id])
            .flatten()
            .filter_map(|unit_id| state.units.get(&unit_id).cloned())
            .collect();
        units.sort_by_key(|unit| unit.unit_id);
        units.dedup_by_key(|unit| unit.unit_id);
        Ok(units)
    }

    async fn participation_entries(&self, competition_id: Uuid) -> Result<Vec<ParticipationEntry>> {
        let state = self.state.read().await;
        let mut entries: Vec<ParticipationEntry> = state
            .entries
            .iter()
            .filter(|entry| entry.competition_id == competition_id)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.created_at);
        Ok(entries)
    }

    async fn verified_reports(
        &self,
        competition_id: Uuid,
        criterion: &str,
    ) -> Result<Vec<CriterionReport>> {
        let state = self.state.read().await;
        let mut reports: Vec<CriterionReport> = state
            .reports
            .iter()
            .filter(|report| {
                report.competition_id == competition_id
                    && report.criterion == criterion
                    && report.verified
            })
            .cloned()
            .collect();
        reports.sort_by_key(|report| report.unit_id);
        Ok(reports)
    }

    async fn find_report(&self, report_id: Uuid) -> Result<Option<CriterionReport>> {
        let state = self.state.read().await;
        Ok(state
            .reports
            .iter()
            .find(|report| report.report_id == report_id)
            .cloned())
    }

    async fn mark_report_verified(&self, report_id: Uuid, score: Decimal) -> Result<bool> {
        let mut state = self.state.write().await;
        let report = state
            .reports
            .iter_mut()
            .find(|report| report.report_id == report_id)
            .ok_or(StorageError::NotFound)?;

        if report.verified {
            return Ok(false);
        }

        report.verified = true;
        report.score = Some(score);
        report.verified_at = Some(Utc::now().naive_utc());
        Ok(true)
    }

    async fn criterion_rankings(&self, competition_id: Uuid) -> Result<Vec<CriterionRanking>> {
        let state = self.state.read().await;
        Ok(state
            .criterion_rankings
            .iter()
            .filter(|row| row.competition_id == competition_id)
            .cloned()
            .collect())
    }

    async fn criterion_tandem_rankings(
        &self,
        competition_id: Uuid,
    ) -> Result<Vec<CriterionTandemRanking>> {
        let state = self.state.read().await;
        Ok(state
            .criterion_tandem_rankings
            .iter()
            .filter(|row| row.competition_id == competition_id)
            .cloned()
            .collect())
    }

    async fn replace_criterion_rankings(
        &self,
        competition_id: Uuid,
        criterion: &str,
        solo: &[CriterionRanking],
        tandem: &[CriterionTandemRanking],
    ) -> Result<()> {
        self.check_writable()?;

        let mut state = self.state.write().await;
        let mut solo_rows: Vec<CriterionRanking> = state
            .criterion_rankings
            .iter()
            .filter(|row| !(row.competition_id == competition_id && row.criterion == criterion))
            .cloned()
            .collect();
        solo_rows.extend_from_slice(solo);

        let mut tandem_rows: Vec<CriterionTandemRanking> = state
            .criterion_tandem_rankings
            .iter()
            .filter(|row| !(row.competition_id == competition_id && row.criterion == criterion))
            .cloned()
            .collect();
        tandem_rows.extend_from_slice(tandem);

        state.criterion_rankings = solo_rows;
        state.criterion_tandem_rankings = tandem_rows;
        Ok(())
    }

    async fn overall_rankings(&self, competition_id: Uuid) -> Result<Vec<OverallRanking>> {
        let state = self.state.read().await;
        Ok(state
            .overall_rankings
            .iter()
            .filter(|row| row.competition_id == competition_id)
            .cloned()
            .collect())
    }

    async fn overall_tandem_rankings(
        &self,
        competition_id: Uuid,
    ) -> Result<Vec<OverallTandemRanking>> {
        let state = self.state.read().await;
        Ok(state
            .overall_tandem_rankings
            .iter()
            .filter(|row| row.competition_id == competition_id)
            .cloned()
            .collect())
    }

    async fn replace_overall_rankings(
        &self,
        competition_id: Uuid,
        solo: &[OverallRanking],
        tandem: &[OverallTandemRanking],
    ) -> Result<()> {
        self.check_writable()?;

        let mut state = self.state.write().await;
        state
            .overall_rankings
            .retain(|row| row.competition_id != competition_id);
        state.overall_rankings.extend_from_slice(solo);
        state
            .overall_tandem_rankings
            .retain(|row| row.competition_id != competition_id);
        state.overall_tandem_rankings.extend_from_slice(tandem);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[tokio::test]
    async fn second_verification_is_rejected() {
        let store = MemoryStore::new();
        let report = CriterionReport::submitted(Uuid::new_v4(), Uuid::new_v4(), "work_days", json!({}));
        let report_id = report.report_id;
        store.insert_report(report).await;

        assert!(store.mark_report_verified(report_id, dec!(3)).await.unwrap());
        assert!(!store.mark_report_verified(report_id, dec!(7)).await.unwrap());

        let stored = store.find_report(report_id).await.unwrap().unwrap();
        assert_eq!(stored.score, Some(dec!(3)));
    }

    #[tokio::test]
    async fn failing_replace_keeps_previous_rows() {
        let store = MemoryStore::new();
        let competition_id = Uuid::new_v4();
        let row = CriterionRanking {
            competition_id,
            criterion: "work_days".to_string(),
            unit_id: Uuid::new_v4(),
            place: 1,
        };
        store
            .replace_criterion_rankings(competition_id, "work_days", &[row.clone()], &[])
            .await
            .unwrap();

        store.fail_writes(true);
        let result = store
            .replace_criterion_rankings(competition_id, "work_days", &[], &[])
            .await;
        assert!(matches!(result, Err(StorageError::Unavailable(_))));

        let rows = store.criterion_rankings(competition_id).await.unwrap();
        assert_eq!(rows, vec![row]);
    }

    #[tokio::test]
    async fn replace_only_touches_one_criterion() {
        let store = MemoryStore::new();
        let competition_id = Uuid::new_v4();
        let unit_id = Uuid::new_v4();
        let rows = |criterion: &str, place| CriterionRanking {
            competition_id,
            criterion: criterion.to_string(),
            unit_id,
            place,
        };
        store
            .replace_criterion_rankings(competition_id, "a", &[rows("a", 1)], &[])
            .await
            .unwrap();
        store
            .replace_criterion_rankings(competition_id, "b", &[rows("b", 2)], &[])
            .await
            .unwrap();
        store
            .replace_criterion_rankings(competition_id, "a", &[rows("a", 3)], &[])
            .await
            .unwrap();

        let mut stored = store.criterion_rankings(competition_id).await.unwrap();
        stored.sort_by(|a, b| a.criterion.cmp(&b.criterion));
        assert_eq!(stored, vec![rows("a", 3), rows("b", 2)]);
    }
}
