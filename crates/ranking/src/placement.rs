//! Turning evaluations of a peer group into places.

use std::collections::HashMap;

use uuid::Uuid;

use crate::criteria::Evaluation;
use crate::rank::{Better, assign_places};

/// Places for the members of `group` that have an evaluation.
///
/// Absolute places are taken as-is. Scores are dense-ranked within the group,
/// and a bonus is added to the ranked place. Members without an evaluation get
/// no place. Output is ordered by place, then unit id.
pub fn place_group(
    group: &[Uuid],
    evaluations: &HashMap<Uuid, Evaluation>,
    better: Better,
) -> Vec<(Uuid, u32)> {
    let mut absolute = Vec::new();
    let mut scored = Vec::new();
    let mut bonuses = HashMap::new();

    for unit_id in group {
        match evaluations.get(unit_id) {
            Some(Evaluation::Place(place)) => absolute.push((*unit_id, *place)),
            Some(Evaluation::Score(score)) => scored.push((*unit_id, *score)),
            Some(Evaluation::ScoreWithBonus { score, bonus }) => {
                scored.push((*unit_id, *score));
                bonuses.insert(*unit_id, *bonus);
            }
            None => {}
        }
    }

    // Stable input order keeps tie ordering independent of hashing.
    scored.sort_by_key(|(unit_id, _)| *unit_id);

    let mut places = absolute;
    places.extend(
        assign_places(scored, better)
            .into_iter()
            .map(|(unit_id, place)| (unit_id, place + bonuses.get(&unit_id).copied().unwrap_or(0))),
    );
    places.sort_by_key(|(unit_id, place)| (*place, *unit_id));
    places
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn mixes_absolute_places_and_ranked_scores() {
        let (a, b, c, missing) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let evaluations = HashMap::from([
            (a, Evaluation::Score(dec!(10))),
            (b, Evaluation::Score(dec!(10))),
            (c, Evaluation::Score(dec!(3))),
        ]);

        let places: HashMap<Uuid, u32> = place_group(&[a, b, c, missing], &evaluations, Better::High)
            .into_iter()
            .collect();
        assert_eq!(places.len(), 3);
        assert_eq!(places[&a], 1);
        assert_eq!(places[&b], 1);
        assert_eq!(places[&c], 2);
    }

    #[test]
    fn bonus_is_added_after_ranking() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let evaluations = HashMap::from([
            (a, Evaluation::ScoreWithBonus { score: dec!(9), bonus: 3 }),
            (b, Evaluation::ScoreWithBonus { score: dec!(2), bonus: 0 }),
        ]);

        let places: HashMap<Uuid, u32> = place_group(&[a, b], &evaluations, Better::High)
            .into_iter()
            .collect();
        assert_eq!(places[&a], 4);
        assert_eq!(places[&b], 2);
    }

    #[test]
    fn absolute_places_ignore_peers() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let evaluations = HashMap::from([(a, Evaluation::Place(7)), (b, Evaluation::Place(7))]);

        let places = place_group(&[a, b], &evaluations, Better::Low);
        assert!(places.iter().all(|(_, place)| *place == 7));
    }
}
