#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use ranking::{CriterionRegistry, RankingEngine};
use serde_json::Value;
use storage::models::{Competition, CriterionReport, ParticipantUnit, ParticipationEntry};
use storage::MemoryStore;
use uuid::Uuid;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One competition seeded into a fresh in-memory store.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub engine: RankingEngine<MemoryStore>,
    pub competition_id: Uuid,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_registry(CriterionRegistry::standard()).await
    }

    pub async fn with_registry(registry: CriterionRegistry) -> Self {
        let store = Arc::new(MemoryStore::new());
        let competition = Competition::new("Annual review", 2025, date(2024, 1, 1));
        let competition_id = competition.competition_id;
        store.insert_competition(competition).await;

        Self {
            engine: RankingEngine::new(Arc::clone(&store), registry),
            store,
            competition_id,
        }
    }

    pub async fn senior(&self, name: &str) -> Uuid {
        self.unit(name, date(2015, 9, 1)).await
    }

    pub async fn junior(&self, name: &str) -> Uuid {
        self.unit(name, date(2024, 6, 1)).await
    }

    async fn unit(&self, name: &str, founded: NaiveDate) -> Uuid {
        let unit = ParticipantUnit::new(name, founded);
        let unit_id = unit.unit_id;
        self.store.insert_unit(unit).await;
        unit_id
    }

    pub async fn solo(&self, name: &str) -> Uuid {
        let unit_id = self.senior(name).await;
        self.store
            .insert_participation(ParticipationEntry::solo(self.competition_id, unit_id))
            .await;
        unit_id
    }

    /// Senior mentor paired with a freshly founded junior unit.
    pub async fn tandem(&self, name: &str) -> (Uuid, Uuid) {
        let main = self.senior(&format!("{name} (main)")).await;
        let junior = self.junior(&format!("{name} (junior)")).await;
        self.store
            .insert_participation(ParticipationEntry::tandem(self.competition_id, main, junior))
            .await;
        (main, junior)
    }

    pub async fn verified(&self, unit_id: Uuid, criterion: &str, data: Value) -> Uuid {
        let report =
            CriterionReport::submitted(self.competition_id, unit_id, criterion, data).into_verified();
        let report_id = report.report_id;
        self.store.insert_report(report).await;
        report_id
    }

    pub async fn submitted(&self, unit_id: Uuid, criterion: &str, data: Value) -> Uuid {
        let report = CriterionReport::submitted(self.competition_id, unit_id, criterion, data);
        let report_id = report.report_id;
        self.store.insert_report(report).await;
        report_id
    }
}
