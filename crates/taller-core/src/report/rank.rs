//! # Ranker
//!
//! Orders aggregate rows for presentation: highest metric first, ties by
//! display name, then by entity id. The last key makes the order total, so
//! two "Desconocido" rows with equal metrics still come out the same way on
//! every run.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::AggregateRow;

/// Sorts a grouping into a ranking.
///
/// ## Example
/// ```rust
/// use std::collections::HashMap;
/// use taller_core::report::rank;
/// use taller_core::AggregateRow;
///
/// let mut rows = HashMap::new();
/// for (id, name, qty) in [("1", "Harina", 5), ("2", "Azúcar", 5), ("3", "Sal", 9)] {
///     rows.insert(id.to_string(), AggregateRow {
///         entity_id: id.to_string(),
///         display_name: name.to_string(),
///         metric: qty,
///     });
/// }
///
/// let names: Vec<_> = rank(rows).into_iter().map(|r| r.display_name).collect();
/// assert_eq!(names, ["Sal", "Azúcar", "Harina"]);
/// ```
pub fn rank<M: Ord>(rows: HashMap<String, AggregateRow<M>>) -> Vec<AggregateRow<M>> {
    let mut ranking: Vec<AggregateRow<M>> = rows.into_values().collect();
    ranking.sort_by(compare_rows);
    ranking
}

fn compare_rows<M: Ord>(a: &AggregateRow<M>, b: &AggregateRow<M>) -> Ordering {
    b.metric
        .cmp(&a.metric)
        .then_with(|| a.display_name.cmp(&b.display_name))
        .then_with(|| a.entity_id.cmp(&b.entity_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn rows<M: Copy>(entries: &[(&str, &str, M)]) -> HashMap<String, AggregateRow<M>> {
        entries
            .iter()
            .map(|(id, name, metric)| {
                (
                    id.to_string(),
                    AggregateRow {
                        entity_id: id.to_string(),
                        display_name: name.to_string(),
                        metric: *metric,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_descending_by_metric() {
        let ranking = rank(rows(&[("a", "A", 1_i64), ("b", "B", 10), ("c", "C", 5)]));
        let metrics: Vec<i64> = ranking.iter().map(|r| r.metric).collect();
        assert_eq!(metrics, vec![10, 5, 1]);
    }

    #[test]
    fn test_money_ranking() {
        let ranking = rank(rows(&[
            ("p1", "Uno", Money::from_cents(15_000)),
            ("p2", "Dos", Money::from_cents(15_001)),
        ]));
        assert_eq!(ranking[0].entity_id, "p2");
    }

    #[test]
    fn test_ties_break_by_name_then_id() {
        let ranking = rank(rows(&[
            ("9", "Desconocido", 3_i64),
            ("2", "Desconocido", 3),
            ("5", "Azúcar", 3),
        ]));
        let ids: Vec<&str> = ranking.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["5", "2", "9"]);
    }

    #[test]
    fn test_order_is_reproducible() {
        let entries = [
            ("a", "X", 2_i64),
            ("b", "X", 2),
            ("c", "Y", 2),
            ("d", "W", 7),
            ("e", "V", 0),
        ];
        let first = rank(rows(&entries));
        for _ in 0..10 {
            assert_eq!(rank(rows(&entries)), first);
        }
    }

    #[test]
    fn test_empty_grouping() {
        let ranking: Vec<AggregateRow<i64>> = rank(HashMap::new());
        assert!(ranking.is_empty());
    }
}
