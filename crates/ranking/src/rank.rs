//! Dense ranking of scored subjects.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which end of the score scale wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Better {
    High,
    Low,
}

/// Assign dense places to `(subject, score)` pairs.
///
/// Equal scores share a place and the next distinct score continues at
/// `shared_place + 1`, so `[10, 10, 7]` ranks as `[1, 1, 2]`. The output is
/// ordered best first; ties keep their input order.
pub fn assign_places<S>(mut entries: Vec<(S, Decimal)>, better: Better) -> Vec<(S, u32)> {
    match better {
        Better::High => entries.sort_by(|a, b| b.1.cmp(&a.1)),
        Better::Low => entries.sort_by(|a, b| a.1.cmp(&b.1)),
    }

    let mut last_place = 0u32;
    let mut current_place = 0u32;
    let mut previous_score: Option<Decimal> = None;

    entries
        .into_iter()
        .map(|(subject, score)| {
            if previous_score != Some(score) {
                current_place = last_place + 1;
            }
            last_place = current_place;
            previous_score = Some(score);
            (subject, current_place)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn places(entries: Vec<(&'static str, Decimal)>, better: Better) -> Vec<(&'static str, u32)> {
        assign_places(entries, better)
    }

    #[test]
    fn ties_share_a_place_without_gaps() {
        let ranked = places(
            vec![
                ("a", dec!(10)),
                ("b", dec!(10)),
                ("c", dec!(7)),
                ("d", dec!(5)),
                ("e", dec!(5)),
                ("f", dec!(5)),
            ],
            Better::High,
        );
        let got: Vec<u32> = ranked.iter().map(|(_, place)| *place).collect();
        assert_eq!(got, vec![1, 1, 2, 3, 3, 3]);
    }

    #[test]
    fn direction_flips_the_order() {
        let input = vec![("A", dec!(1)), ("B", dec!(2)), ("C", dec!(1))];

        let low = places(input.clone(), Better::Low);
        assert_eq!(low, vec![("A", 1), ("C", 1), ("B", 2)]);

        let high = places(input, Better::High);
        assert_eq!(high, vec![("B", 1), ("A", 2), ("C", 2)]);
    }

    #[test]
    fn empty_and_single_inputs() {
        assert!(places(Vec::new(), Better::High).is_empty());
        assert_eq!(places(vec![("solo", dec!(0))], Better::Low), vec![("solo", 1)]);
    }

    #[test]
    fn scale_does_not_break_ties() {
        let ranked = places(vec![("a", dec!(1.50)), ("b", dec!(1.5))], Better::High);
        assert_eq!(ranked[0].1, ranked[1].1);
    }

    #[test]
    fn distinct_places_match_distinct_scores() {
        let scores = [3, 9, 3, 1, 9, 4, 4, 4, 0];
        let entries: Vec<(usize, Decimal)> = scores
            .iter()
            .enumerate()
            .map(|(i, score)| (i, Decimal::from(*score)))
            .collect();
        let ranked = assign_places(entries, Better::High);

        let mut distinct: Vec<u32> = ranked.iter().map(|(_, place)| *place).collect();
        distinct.dedup();
        assert_eq!(distinct, vec![1, 2, 3, 4, 5]);
    }
}
