//! Solo/tandem classification of the units taking part in one competition.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use storage::models::{ParticipantUnit, ParticipationEntry};
use uuid::Uuid;

use crate::error::DataIntegrityError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParticipationMode {
    NotParticipating,
    Solo,
    TandemMain,
    TandemJunior,
}

/// Mentor/mentee pair. Orientation always comes from the participation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Pair {
    pub main_unit_id: Uuid,
    pub junior_unit_id: Uuid,
}

/// Lookup over the participation entries of a single competition.
///
/// Built once per recompute run. Malformed entries are recorded as issues and
/// left out of every group.
#[derive(Debug, Clone)]
pub struct ParticipationResolver {
    competition_id: Uuid,
    modes: HashMap<Uuid, ParticipationMode>,
    partners: HashMap<Uuid, Uuid>,
    solo: Vec<Uuid>,
    pairs: Vec<Pair>,
    issues: Vec<DataIntegrityError>,
}

impl ParticipationResolver {
    pub fn build(competition_id: Uuid, entries: &[ParticipationEntry]) -> Self {
        let mut resolver = Self {
            competition_id,
            modes: HashMap::new(),
            partners: HashMap::new(),
            solo: Vec::new(),
            pairs: Vec::new(),
            issues: Vec::new(),
        };

        for entry in entries
            .iter()
            .filter(|entry| entry.competition_id == competition_id)
        {
            resolver.add_entry(entry);
        }

        resolver
    }

    fn add_entry(&mut self, entry: &ParticipationEntry) {
        let entry_id = entry.entry_id;
        match (entry.main_unit_id, entry.junior_unit_id) {
            (None, None) => {
                self.issues
                    .push(DataIntegrityError::EmptyParticipation { entry_id });
            }
            (Some(main_unit_id), None) => {
                self.issues.push(DataIntegrityError::MissingJunior {
                    entry_id,
                    main_unit_id,
                });
            }
            (Some(main_unit_id), Some(junior_unit_id)) if main_unit_id == junior_unit_id => {
                self.issues.push(DataIntegrityError::SelfPaired {
                    entry_id,
                    unit_id: main_unit_id,
                });
            }
            (None, Some(unit_id)) => {
                if self.reject_duplicate(entry_id, &[unit_id]) {
                    return;
                }
                self.modes.insert(unit_id, ParticipationMode::Solo);
                self.solo.push(unit_id);
            }
            (Some(main_unit_id), Some(junior_unit_id)) => {
                if self.reject_duplicate(entry_id, &[main_unit_id, junior_unit_id]) {
                    return;
                }
                self.modes.insert(main_unit_id, ParticipationMode::TandemMain);
                self.modes
                    .insert(junior_unit_id, ParticipationMode::TandemJunior);
                self.partners.insert(main_unit_id, junior_unit_id);
                self.partners.insert(junior_unit_id, main_unit_id);
                self.pairs.push(Pair {
                    main_unit_id,
                    junior_unit_id,
                });
            }
        }
    }

    fn reject_duplicate(&mut self, entry_id: Uuid, units: &[Uuid]) -> bool {
        match units.iter().find(|unit_id| self.modes.contains_key(unit_id)) {
            Some(&unit_id) => {
                self.issues
                    .push(DataIntegrityError::DuplicateParticipation { entry_id, unit_id });
                true
            }
            None => false,
        }
    }

    pub fn competition_id(&self) -> Uuid {
        self.competition_id
    }

    /// Participation mode of `unit_id`. Units of other competitions are not participating.
    pub fn resolve(&self, unit_id: Uuid, competition_id: Uuid) -> ParticipationMode {
        if competition_id != self.competition_id {
            return ParticipationMode::NotParticipating;
        }
        self.modes
            .get(&unit_id)
            .copied()
            .unwrap_or(ParticipationMode::NotParticipating)
    }

    /// The other half of a tandem, `None` for solo and non-participating units.
    pub fn partner(&self, unit_id: Uuid, competition_id: Uuid) -> Option<Uuid> {
        if competition_id != self.competition_id {
            return None;
        }
        self.partners.get(&unit_id).copied()
    }

    pub fn solo_units(&self) -> &[Uuid] {
        &self.solo
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn issues(&self) -> &[DataIntegrityError] {
        &self.issues
    }

    /// Pairs whose mentor was founded after the cutoff while the mentee was not.
    ///
    /// Units without a known founding date are not judged.
    pub fn inverted_pairs(&self, units: &[ParticipantUnit], junior_cutoff: NaiveDate) -> Vec<Pair> {
        let by_id: HashMap<Uuid, &ParticipantUnit> =
            units.iter().map(|unit| (unit.unit_id, unit)).collect();

        self.pairs
            .iter()
            .filter(|pair| {
                match (by_id.get(&pair.main_unit_id), by_id.get(&pair.junior_unit_id)) {
                    (Some(main), Some(junior)) => {
                        main.is_junior(junior_cutoff) && !junior.is_junior(junior_cutoff)
                    }
                    _ => false,
                }
            })
            .copied()
            .collect()
    }
}
