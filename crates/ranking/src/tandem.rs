//! Combining the outcomes of both halves of a tandem into one pair place.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::criteria::{CriterionDefinition, Evaluation, TandemPolicy};
use crate::participation::Pair;
use crate::placement::place_group;
use crate::rank::{Better, assign_places};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TandemPlace {
    pub pair: Pair,
    pub place: Decimal,
}

/// Pair place = mean of both partners' places, to two decimals. A partner
/// without a place counts as `missing_place`; pairs where neither half has a
/// place are left out.
pub fn average_of_places(
    pairs: &[Pair],
    places: &HashMap<Uuid, u32>,
    missing_place: u32,
) -> Vec<TandemPlace> {
    pairs
        .iter()
        .filter_map(|pair| {
            let main = places.get(&pair.main_unit_id).copied();
            let junior = places.get(&pair.junior_unit_id).copied();
            if main.is_none() && junior.is_none() {
                return None;
            }

            let total = Decimal::from(main.unwrap_or(missing_place))
                + Decimal::from(junior.unwrap_or(missing_place));
            Some(TandemPlace {
                pair: *pair,
                place: (total / Decimal::from(2)).round_dp(2),
            })
        })
        .collect()
}

/// Adds both partners' scores (a missing partner counts as `missing_score`)
/// and dense-ranks the pair sums. Pairs where neither half has a score are
/// left out. Sums saturate at the bounds of `Decimal`.
pub fn sum_then_rank(
    pairs: &[Pair],
    scores: &HashMap<Uuid, Decimal>,
    missing_score: Decimal,
    better: Better,
) -> Vec<(Pair, u32)> {
    let mut sums: Vec<(Pair, Decimal)> = pairs
        .iter()
        .filter_map(|pair| {
            let main = scores.get(&pair.main_unit_id).copied();
            let junior = scores.get(&pair.junior_unit_id).copied();
            if main.is_none() && junior.is_none() {
                return None;
            }
            Some((
                *pair,
                main.unwrap_or(missing_score)
                    .saturating_add(junior.unwrap_or(missing_score)),
            ))
        })
        .collect();
    sums.sort_by_key(|(pair, _)| *pair);

    assign_places(sums, better)
}

/// Adds the rounded mean of both partners' bonuses to each ranked pair place.
///
/// The bonus is applied after ranking, so the result can contain duplicate or
/// out-of-order places. Rounding is half-to-even.
pub fn add_bonus(
    ranked: Vec<(Pair, u32)>,
    bonuses: &HashMap<Uuid, u32>,
    missing_bonus: u32,
) -> Vec<TandemPlace> {
    ranked
        .into_iter()
        .map(|(pair, base)| {
            let main = bonuses
                .get(&pair.main_unit_id)
                .copied()
                .unwrap_or(missing_bonus);
            let junior = bonuses
                .get(&pair.junior_unit_id)
                .copied()
                .unwrap_or(missing_bonus);
            let bonus = (Decimal::from(main + junior) / Decimal::from(2)).round();
            TandemPlace {
                pair,
                place: Decimal::from(base) + bonus,
            }
        })
        .collect()
}

/// Applies a criterion's tandem policy to the evaluations of its units.
#[derive(Debug)]
pub struct TandemAggregator<'a> {
    definition: &'a CriterionDefinition,
}

impl<'a> TandemAggregator<'a> {
    pub fn new(definition: &'a CriterionDefinition) -> Self {
        Self { definition }
    }

    /// Pair places ordered by place, then by pair.
    pub fn combine(
        &self,
        pairs: &[Pair],
        evaluations: &HashMap<Uuid, Evaluation>,
    ) -> Vec<TandemPlace> {
        let mut combined = match self.definition.tandem_policy {
            TandemPolicy::AverageOfPlaces { missing_place } => {
                let places = self.peer_places(pairs, evaluations);
                average_of_places(pairs, &places, missing_place)
            }
            TandemPolicy::SumThenRank { missing_score } => {
                self.sum_and_rank(pairs, evaluations, missing_score)
            }
        };

        combined.sort_by(|a, b| a.place.cmp(&b.place).then(a.pair.cmp(&b.pair)));
        combined
    }

    /// Places each half among its own peers: mains with mains, juniors with juniors.
    fn peer_places(
        &self,
        pairs: &[Pair],
        evaluations: &HashMap<Uuid, Evaluation>,
    ) -> HashMap<Uuid, u32> {
        let mains: Vec<Uuid> = pairs.iter().map(|pair| pair.main_unit_id).collect();
        let juniors: Vec<Uuid> = pairs.iter().map(|pair| pair.junior_unit_id).collect();

        place_group(&mains, evaluations, self.definition.better)
            .into_iter()
            .chain(place_group(&juniors, evaluations, self.definition.better))
            .collect()
    }

    fn sum_and_rank(
        &self,
        pairs: &[Pair],
        evaluations: &HashMap<Uuid, Evaluation>,
        missing_score: Decimal,
    ) -> Vec<TandemPlace> {
        let scores: HashMap<Uuid, Decimal> = evaluations
            .iter()
            .map(|(unit_id, evaluation)| (*unit_id, evaluation.stored_score()))
            .collect();
        let ranked = sum_then_rank(pairs, &scores, missing_score, self.definition.better);

        let bonuses: HashMap<Uuid, u32> = evaluations
            .iter()
            .filter_map(|(unit_id, evaluation)| match evaluation {
                Evaluation::ScoreWithBonus { bonus, .. } => Some((*unit_id, *bonus)),
                _ => None,
            })
            .collect();

        if bonuses.is_empty() {
            return ranked
                .into_iter()
                .map(|(pair, place)| TandemPlace {
                    pair,
                    place: Decimal::from(place),
                })
                .collect();
        }

        let missing_bonus = match self.definition.empty_evaluation() {
            Some(Evaluation::ScoreWithBonus { bonus, .. }) => bonus,
            _ => 0,
        };
        add_bonus(ranked, &bonuses, missing_bonus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{CriterionRegistry, RankingModel, WorkDaysScorer};
    use rust_decimal_macros::dec;

    fn pair() -> Pair {
        Pair {
            main_unit_id: Uuid::new_v4(),
            junior_unit_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn average_of_two_places() {
        let p = pair();
        let places = HashMap::from([(p.main_unit_id, 4), (p.junior_unit_id, 6)]);
        let combined = average_of_places(&[p], &places, 20);
        assert_eq!(combined[0].place, dec!(5.00));
    }

    #[test]
    fn missing_partner_takes_the_penalty_place() {
        let p = pair();
        let places = HashMap::from([(p.main_unit_id, 4)]);
        let combined = average_of_places(&[p], &places, 20);
        assert_eq!(combined[0].place, dec!(12));

        let odd = average_of_places(&[p], &HashMap::from([(p.junior_unit_id, 4)]), 5);
        assert_eq!(odd[0].place, dec!(4.5));
    }

    #[test]
    fn pair_without_any_report_is_skipped() {
        let combined = average_of_places(&[pair()], &HashMap::new(), 20);
        assert!(combined.is_empty());
    }

    #[test]
    fn sums_are_dense_ranked() {
        let (a, b, c) = (pair(), pair(), pair());
        let scores = HashMap::from([
            (a.main_unit_id, dec!(10)),
            (a.junior_unit_id, dec!(5)),
            (b.main_unit_id, dec!(15)),
            (c.main_unit_id, dec!(1)),
            (c.junior_unit_id, dec!(1)),
        ]);

        let ranked: HashMap<Pair, u32> = sum_then_rank(&[a, b, c], &scores, Decimal::ZERO, Better::High)
            .into_iter()
            .collect();
        assert_eq!(ranked[&a], 1);
        assert_eq!(ranked[&b], 1);
        assert_eq!(ranked[&c], 2);
    }

    #[test]
    fn huge_pair_sums_saturate_instead_of_overflowing() {
        let (a, b) = (pair(), pair());
        let scores = HashMap::from([
            (a.main_unit_id, Decimal::MAX),
            (a.junior_unit_id, Decimal::MAX),
            (b.main_unit_id, dec!(1)),
        ]);

        let ranked: HashMap<Pair, u32> = sum_then_rank(&[a, b], &scores, Decimal::ZERO, Better::High)
            .into_iter()
            .collect();
        assert_eq!(ranked[&a], 1);
        assert_eq!(ranked[&b], 2);
    }

    #[test]
    fn missing_partner_penalty_for_lower_is_better() {
        let (a, b) = (pair(), pair());
        let scores = HashMap::from([
            (a.main_unit_id, dec!(0)),
            (b.main_unit_id, dec!(30)),
            (b.junior_unit_id, dec!(40)),
        ]);

        let ranked: HashMap<Pair, u32> = sum_then_rank(&[a, b], &scores, dec!(365), Better::Low)
            .into_iter()
            .collect();
        assert_eq!(ranked[&b], 1);
        assert_eq!(ranked[&a], 2);
    }

    #[test]
    fn bonus_can_collide_with_other_places() {
        let (a, b) = (pair(), pair());
        let ranked = vec![(a, 1), (b, 2)];
        let bonuses = HashMap::from([
            (a.main_unit_id, 2),
            (a.junior_unit_id, 1),
            (b.main_unit_id, 0),
            (b.junior_unit_id, 1),
        ]);

        let places = add_bonus(ranked, &bonuses, 4);
        // 1 + round(1.5) = 3, 2 + round(0.5) = 2
        assert_eq!(places[0].place, dec!(3));
        assert_eq!(places[1].place, dec!(2));
    }

    #[test]
    fn average_policy_ranks_scores_among_peers() {
        let definition = CriterionDefinition::new(
            "work_days",
            "Work days",
            Better::High,
            TandemPolicy::AverageOfPlaces { missing_place: 10 },
            RankingModel::Tandem,
            Box::new(WorkDaysScorer),
        );
        let (a, b) = (pair(), pair());
        let evaluations = HashMap::from([
            (a.main_unit_id, Evaluation::Score(dec!(30))),
            (b.main_unit_id, Evaluation::Score(dec!(50))),
            (a.junior_unit_id, Evaluation::Score(dec!(80))),
            (b.junior_unit_id, Evaluation::Score(dec!(10))),
        ]);

        let combined = TandemAggregator::new(&definition).combine(&[a, b], &evaluations);
        assert!(combined.iter().all(|row| row.place == dec!(1.5)));
    }

    #[test]
    fn publicity_pairs_get_the_averaged_bonus() {
        let registry = CriterionRegistry::standard();
        let definition = registry.get("publicity").unwrap();
        let (a, b) = (pair(), pair());
        let evaluations = HashMap::from([
            (a.main_unit_id, Evaluation::ScoreWithBonus { score: dec!(6), bonus: 0 }),
            (a.junior_unit_id, Evaluation::ScoreWithBonus { score: dec!(1), bonus: 1 }),
            (b.main_unit_id, Evaluation::ScoreWithBonus { score: dec!(2), bonus: 0 }),
        ]);

        let combined: HashMap<Pair, Decimal> = TandemAggregator::new(definition)
            .combine(&[a, b], &evaluations)
            .into_iter()
            .map(|row| (row.pair, row.place))
            .collect();
        // a: rank 1 + round(0.5) = 1; b: rank 2 + round((0 + 4) / 2) = 4
        assert_eq!(combined[&a], dec!(1));
        assert_eq!(combined[&b], dec!(4));
    }
}
