//! Overall standing: places summed across every criterion of a unit's set.

use std::collections::HashMap;
use std::hash::Hash;

use rust_decimal::Decimal;
use storage::models::{
    CriterionRanking, CriterionTandemRanking, OverallRanking, OverallTandemRanking,
};
use uuid::Uuid;

use crate::criteria::CriterionRegistry;
use crate::participation::{Pair, ParticipationResolver};
use crate::rank::{Better, assign_places};

/// Place substituted for a subject without a ranking in some criterion:
/// one past the worst place anybody got there, or 1 when nobody is ranked.
pub fn penalty_place(places: impl IntoIterator<Item = Decimal>) -> Decimal {
    places
        .into_iter()
        .max()
        .map_or(Decimal::ONE, |worst| worst + Decimal::ONE)
}

/// Sum of places per subject over `keys`, with [`penalty_place`] for gaps.
pub fn places_sums<S>(
    subjects: &[S],
    keys: &[&str],
    places: &HashMap<(String, S), Decimal>,
) -> Vec<(S, Decimal)>
where
    S: Copy + Eq + Hash,
{
    let penalties: HashMap<&str, Decimal> = keys
        .iter()
        .map(|key| {
            let penalty = penalty_place(
                places
                    .iter()
                    .filter(|((criterion, _), _)| criterion == key)
                    .map(|(_, place)| *place),
            );
            (*key, penalty)
        })
        .collect();

    subjects
        .iter()
        .map(|subject| {
            let sum: Decimal = keys
                .iter()
                .map(|key| {
                    places
                        .get(&(key.to_string(), *subject))
                        .copied()
                        .unwrap_or(penalties[key])
                })
                .sum();
            (*subject, sum)
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverallStanding {
    pub solo: Vec<OverallRanking>,
    pub tandem: Vec<OverallTandemRanking>,
}

/// Builds the overall standing of one competition from its criterion rankings.
#[derive(Debug)]
pub struct OverallAggregator<'a> {
    registry: &'a CriterionRegistry,
}

impl<'a> OverallAggregator<'a> {
    pub fn new(registry: &'a CriterionRegistry) -> Self {
        Self { registry }
    }

    /// Every solo unit and every pair known to `resolver` gets exactly one
    /// row, even with no criterion rankings at all. Rows come out ordered by
    /// place, then by subject.
    pub fn aggregate(
        &self,
        resolver: &ParticipationResolver,
        solo_rows: &[CriterionRanking],
        tandem_rows: &[CriterionTandemRanking],
    ) -> OverallStanding {
        let competition_id = resolver.competition_id();

        let solo_places: HashMap<(String, Uuid), Decimal> = solo_rows
            .iter()
            .filter(|row| row.competition_id == competition_id)
            .map(|row| ((row.criterion.clone(), row.unit_id), Decimal::from(row.place)))
            .collect();
        let tandem_places: HashMap<(String, Pair), Decimal> = tandem_rows
            .iter()
            .filter(|row| row.competition_id == competition_id)
            .map(|row| {
                let pair = Pair {
                    main_unit_id: row.main_unit_id,
                    junior_unit_id: row.junior_unit_id,
                };
                ((row.criterion.clone(), pair), row.place)
            })
            .collect();

        let mut solo_units = resolver.solo_units().to_vec();
        solo_units.sort();
        let mut pairs = resolver.pairs().to_vec();
        pairs.sort();

        let solo_sums = places_sums(&solo_units, &self.registry.solo_keys(), &solo_places);
        let tandem_sums = places_sums(&pairs, &self.registry.tandem_keys(), &tandem_places);

        let solo_sum_of: HashMap<Uuid, Decimal> = solo_sums.iter().copied().collect();
        let mut solo: Vec<OverallRanking> = assign_places(solo_sums, Better::Low)
            .into_iter()
            .map(|(unit_id, place)| OverallRanking {
                competition_id,
                unit_id,
                places_sum: solo_sum_of[&unit_id],
                place: place as i32,
            })
            .collect();
        solo.sort_by_key(|row| (row.place, row.unit_id));

        let tandem_sum_of: HashMap<Pair, Decimal> = tandem_sums.iter().copied().collect();
        let mut tandem: Vec<OverallTandemRanking> = assign_places(tandem_sums, Better::Low)
            .into_iter()
            .map(|(pair, place)| OverallTandemRanking {
                competition_id,
                main_unit_id: pair.main_unit_id,
                junior_unit_id: pair.junior_unit_id,
                places_sum: tandem_sum_of[&pair],
                place: place as i32,
            })
            .collect();
        tandem.sort_by_key(|row| (row.place, row.main_unit_id, row.junior_unit_id));

        OverallStanding { solo, tandem }
    }
}
