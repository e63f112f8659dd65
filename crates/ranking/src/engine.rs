//! Recompute orchestration: reads the raw inputs of one competition, runs the
//! scoring and aggregation stages and replaces the derived ranking sets.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;
use serde::Serialize;
use storage::CompetitionStore;
use storage::models::{
    Competition, CriterionRanking, CriterionReport, CriterionTandemRanking,
};
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::criteria::{CriterionDefinition, CriterionRegistry, Evaluation};
use crate::error::{ConfigError, DataIntegrityError, RankingError, Result};
use crate::overall::{OverallAggregator, OverallStanding};
use crate::participation::{ParticipationMode, ParticipationResolver};
use crate::placement::place_group;
use crate::tandem::TandemAggregator;

/// A unit whose report could not be scored. The unit is left unranked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitFailure {
    pub unit_id: Uuid,
    pub report_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionRecompute {
    pub criterion: String,
    pub solo_rows: usize,
    pub tandem_rows: usize,
    pub failures: Vec<UnitFailure>,
    pub skipped: Vec<DataIntegrityError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverallRecompute {
    pub solo_rows: usize,
    pub tandem_rows: usize,
    pub skipped: Vec<DataIntegrityError>,
}

/// A criterion whose recompute was aborted during a full run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriterionFailure {
    pub criterion: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullRecompute {
    pub criteria: Vec<CriterionRecompute>,
    pub failed: Vec<CriterionFailure>,
    pub overall: OverallRecompute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub report_id: Uuid,
    pub criterion: String,
    pub score: Decimal,
    /// Rebuild of the report's criterion. The verification itself is kept
    /// even when this failed.
    pub recompute: std::result::Result<CriterionRecompute, CriterionFailure>,
}

/// Ranking engine over a [`CompetitionStore`].
///
/// All recomputes and verifications of one competition are serialized by a
/// per-competition lock; different competitions run independently.
pub struct RankingEngine<S> {
    store: Arc<S>,
    registry: CriterionRegistry,
    locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S: CompetitionStore> RankingEngine<S> {
    pub fn new(store: Arc<S>, registry: CriterionRegistry) -> Self {
        Self {
            store,
            registry,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &CriterionRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn lock_competition(&self, competition_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // only the map holds an idle lock
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(competition_id).or_default())
        };
        lock.lock_owned().await
    }

    async fn load_competition(&self, competition_id: Uuid) -> Result<Competition> {
        self.store
            .competition(competition_id)
            .await?
            .ok_or(RankingError::CompetitionNotFound(competition_id))
    }

    async fn load_participation(&self, competition_id: Uuid) -> Result<ParticipationResolver> {
        let entries = self.store.participation_entries(competition_id).await?;
        let resolver = ParticipationResolver::build(competition_id, &entries);
        for issue in resolver.issues() {
            tracing::warn!("Skipping participation entry: {}", issue);
        }
        Ok(resolver)
    }

    /// Rebuilds the solo and tandem rankings of one criterion.
    pub async fn recompute_criterion(
        &self,
        competition_id: Uuid,
        criterion: &str,
    ) -> Result<CriterionRecompute> {
        let _guard = self.lock_competition(competition_id).await;
        let competition = self.load_competition(competition_id).await?;
        self.recompute_criterion_locked(&competition, criterion).await
    }

    /// Checks everything that would abort a recompute of `criterion` before
    /// any reports are read: the definition's tables and pair orientation.
    async fn prepare_criterion(
        &self,
        competition: &Competition,
        criterion: &str,
    ) -> Result<(&CriterionDefinition, ParticipationResolver)> {
        let definition = self.registry.get(criterion)?;
        definition.validate()?;

        let resolver = self.load_participation(competition.competition_id).await?;
        let units = self
            .store
            .participant_units(competition.competition_id)
            .await?;
        if let Some(pair) = resolver
            .inverted_pairs(&units, competition.junior_cutoff)
            .first()
        {
            return Err(ConfigError::InconsistentPairOrientation {
                criterion: definition.key.clone(),
                main_unit_id: pair.main_unit_id,
                junior_unit_id: pair.junior_unit_id,
            }
            .into());
        }

        Ok((definition, resolver))
    }

    async fn recompute_criterion_locked(
        &self,
        competition: &Competition,
        criterion: &str,
    ) -> Result<CriterionRecompute> {
        let competition_id = competition.competition_id;
        let (definition, resolver) = self.prepare_criterion(competition, criterion).await?;

        let reports = self
            .store
            .verified_reports(competition_id, &definition.key)
            .await?;
        let scored = score_reports(definition, &resolver, &reports);

        let solo: Vec<CriterionRanking> = if definition.model.includes_solo() {
            place_group(resolver.solo_units(), &scored.evaluations, definition.better)
                .into_iter()
                .map(|(unit_id, place)| CriterionRanking {
                    competition_id,
                    criterion: definition.key.clone(),
                    unit_id,
                    place: place as i32,
                })
                .collect()
        } else {
            Vec::new()
        };

        let tandem: Vec<CriterionTandemRanking> = if definition.model.includes_tandem() {
            TandemAggregator::new(definition)
                .combine(resolver.pairs(), &scored.evaluations)
                .into_iter()
                .map(|row| CriterionTandemRanking {
                    competition_id,
                    criterion: definition.key.clone(),
                    main_unit_id: row.pair.main_unit_id,
                    junior_unit_id: row.pair.junior_unit_id,
                    place: row.place,
                })
                .collect()
        } else {
            Vec::new()
        };

        self.store
            .replace_criterion_rankings(competition_id, &definition.key, &solo, &tandem)
            .await?;

        tracing::info!(
            "Recomputed '{}' for competition {}: {} solo, {} tandem, {} failed",
            definition.key,
            competition_id,
            solo.len(),
            tandem.len(),
            scored.failures.len()
        );

        let mut skipped = resolver.issues().to_vec();
        skipped.extend(scored.skipped);

        Ok(CriterionRecompute {
            criterion: definition.key.clone(),
            solo_rows: solo.len(),
            tandem_rows: tandem.len(),
            failures: scored.failures,
            skipped,
        })
    }

    /// Rebuilds the overall standing from the stored criterion rankings.
    pub async fn recompute_overall(&self, competition_id: Uuid) -> Result<OverallRecompute> {
        let _guard = self.lock_competition(competition_id).await;
        self.load_competition(competition_id).await?;
        self.recompute_overall_locked(competition_id).await
    }

    async fn recompute_overall_locked(&self, competition_id: Uuid) -> Result<OverallRecompute> {
        let resolver = self.load_participation(competition_id).await?;
        let solo_rows = self.store.criterion_rankings(competition_id).await?;
        let tandem_rows = self.store.criterion_tandem_rankings(competition_id).await?;

        let standing =
            OverallAggregator::new(&self.registry).aggregate(&resolver, &solo_rows, &tandem_rows);

        self.store
            .replace_overall_rankings(competition_id, &standing.solo, &standing.tandem)
            .await?;

        tracing::info!(
            "Recomputed overall standing for competition {}: {} solo, {} tandem",
            competition_id,
            standing.solo.len(),
            standing.tandem.len()
        );

        Ok(OverallRecompute {
            solo_rows: standing.solo.len(),
            tandem_rows: standing.tandem.len(),
            skipped: resolver.issues().to_vec(),
        })
    }

    /// Every criterion in registry order, then the overall standing.
    ///
    /// A failing criterion keeps its previous rankings and does not stop the
    /// others. A failing overall step fails the run.
    pub async fn recompute_all(&self, competition_id: Uuid) -> Result<FullRecompute> {
        let _guard = self.lock_competition(competition_id).await;
        let competition = self.load_competition(competition_id).await?;

        let mut criteria = Vec::new();
        let mut failed = Vec::new();
        for definition in self.registry.iter() {
            match self
                .recompute_criterion_locked(&competition, &definition.key)
                .await
            {
                Ok(summary) => criteria.push(summary),
                Err(err) => {
                    tracing::error!(
                        "Recompute of '{}' failed for competition {}: {}",
                        definition.key,
                        competition_id,
                        err
                    );
                    failed.push(CriterionFailure {
                        criterion: definition.key.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let overall = self.recompute_overall_locked(competition_id).await?;

        Ok(FullRecompute {
            criteria,
            failed,
            overall,
        })
    }

    /// Verifies a submitted report, stores its score and rebuilds the rankings
    /// of its criterion.
    ///
    /// Nothing is written unless the criterion's configuration is sound and
    /// the report scores.
    pub async fn verify_report(&self, competition_id: Uuid, report_id: Uuid) -> Result<Verification> {
        let _guard = self.lock_competition(competition_id).await;
        let competition = self.load_competition(competition_id).await?;

        let report = self
            .store
            .find_report(report_id)
            .await?
            .ok_or(RankingError::ReportNotFound(report_id))?;

        if report.competition_id != competition_id {
            return Err(DataIntegrityError::ForeignReport {
                report_id,
                expected: competition_id,
                actual: report.competition_id,
            }
            .into());
        }
        if report.verified {
            return Err(RankingError::AlreadyVerified { report_id });
        }

        let (definition, resolver) = self
            .prepare_criterion(&competition, &report.criterion)
            .await?;
        let score = definition.evaluate(&report)?.stored_score();

        if !self.store.mark_report_verified(report_id, score).await? {
            return Err(RankingError::AlreadyVerified { report_id });
        }
        match resolver.partner(report.unit_id, competition_id) {
            Some(partner) => tracing::info!(
                "Verified report {} ('{}', unit {}, tandem partner {}) with score {}",
                report_id,
                report.criterion,
                report.unit_id,
                partner,
                score
            ),
            None => tracing::info!(
                "Verified report {} ('{}', unit {}) with score {}",
                report_id,
                report.criterion,
                report.unit_id,
                score
            ),
        }

        // The report stays verified; a failed rebuild is reported, not raised.
        let recompute = self
            .recompute_criterion_locked(&competition, &report.criterion)
            .await
            .map_err(|err| {
                tracing::error!(
                    "Recompute of '{}' after verifying report {} failed: {}",
                    report.criterion,
                    report_id,
                    err
                );
                CriterionFailure {
                    criterion: report.criterion.clone(),
                    reason: err.to_string(),
                }
            });

        Ok(Verification {
            report_id,
            criterion: report.criterion,
            score,
            recompute,
        })
    }

    /// Stored rankings of one criterion.
    pub async fn criterion_standing(
        &self,
        competition_id: Uuid,
        criterion: &str,
    ) -> Result<(Vec<CriterionRanking>, Vec<CriterionTandemRanking>)> {
        self.registry.get(criterion)?;

        let mut solo = self.store.criterion_rankings(competition_id).await?;
        solo.retain(|row| row.criterion == criterion);
        solo.sort_by_key(|row| (row.place, row.unit_id));

        let mut tandem = self.store.criterion_tandem_rankings(competition_id).await?;
        tandem.retain(|row| row.criterion == criterion);
        tandem.sort_by(|a, b| {
            a.place
                .cmp(&b.place)
                .then(a.main_unit_id.cmp(&b.main_unit_id))
        });

        Ok((solo, tandem))
    }

    /// Stored overall standing.
    pub async fn overall_standing(&self, competition_id: Uuid) -> Result<OverallStanding> {
        let mut solo = self.store.overall_rankings(competition_id).await?;
        solo.sort_by_key(|row| (row.place, row.unit_id));
        let mut tandem = self.store.overall_tandem_rankings(competition_id).await?;
        tandem.sort_by_key(|row| (row.place, row.main_unit_id));
        Ok(OverallStanding { solo, tandem })
    }
}

#[derive(Debug, Default)]
struct ScoredReports {
    evaluations: HashMap<Uuid, Evaluation>,
    failures: Vec<UnitFailure>,
    skipped: Vec<DataIntegrityError>,
}

/// Scores every report of a participating unit. A report that fails to score
/// only excludes its own unit.
fn score_reports(
    definition: &CriterionDefinition,
    resolver: &ParticipationResolver,
    reports: &[CriterionReport],
) -> ScoredReports {
    let competition_id = resolver.competition_id();
    let mut scored = ScoredReports::default();

    for report in reports {
        if report.competition_id != competition_id {
            let issue = DataIntegrityError::ForeignReport {
                report_id: report.report_id,
                expected: competition_id,
                actual: report.competition_id,
            };
            tracing::warn!("Skipping report: {}", issue);
            scored.skipped.push(issue);
            continue;
        }

        if resolver.resolve(report.unit_id, competition_id) == ParticipationMode::NotParticipating {
            tracing::debug!(
                "Ignoring '{}' report {} of non-participating unit {}",
                definition.key,
                report.report_id,
                report.unit_id
            );
            continue;
        }

        match definition.evaluate(report) {
            Ok(evaluation) => {
                tracing::debug!(
                    "Unit {} scored {:?} on '{}'",
                    report.unit_id,
                    evaluation,
                    definition.key
                );
                scored.evaluations.insert(report.unit_id, evaluation);
            }
            Err(err) => {
                tracing::warn!(
                    "Could not score report {} of unit {}: {}",
                    report.report_id,
                    report.unit_id,
                    err
                );
                scored.failures.push(UnitFailure {
                    unit_id: report.unit_id,
                    report_id: report.report_id,
                    reason: err.to_string(),
                });
            }
        }
    }

    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::MemoryStore;

    #[tokio::test]
    async fn idle_competition_locks_are_pruned() {
        let engine = RankingEngine::new(Arc::new(MemoryStore::new()), CriterionRegistry::standard());
        for _ in 0..3 {
            let missing = engine.recompute_overall(Uuid::new_v4()).await;
            assert!(matches!(missing, Err(RankingError::CompetitionNotFound(_))));
        }

        let locks = engine.locks.lock().unwrap();
        assert_eq!(locks.len(), 1);
    }

    #[tokio::test]
    async fn a_held_lock_survives_pruning() {
        let engine = RankingEngine::new(Arc::new(MemoryStore::new()), CriterionRegistry::standard());
        let held = Uuid::new_v4();
        let _guard = engine.lock_competition(held).await;
        drop(engine.lock_competition(Uuid::new_v4()).await);
        drop(engine.lock_competition(Uuid::new_v4()).await);

        let locks = engine.locks.lock().unwrap();
        assert!(locks.contains_key(&held));
        assert_eq!(locks.len(), 2);
    }
}
