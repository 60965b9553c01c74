use std::cmp::Ordering;

use super::types::ScoreVector;
use crate::domain::item::ItemId;

/// Highest-scoring items first, ties broken by ascending item id.
///
/// Excluded items (`-inf`) never appear, so fewer than `n` ids come back when
/// fewer candidates remain.
pub fn top_n(scores: &ScoreVector, n: usize) -> Vec<ItemId> {
    let mut candidates = scores
        .iter()
        .filter(|(_, score)| !score.is_nan() && *score != f64::NEG_INFINITY)
        .collect::<Vec<_>>();

    candidates.sort_by(|a, b| {
        b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0))
    });
    candidates.truncate(n);
    candidates.into_iter().map(|(item_id, _)| item_id).collect()
}

#[cfg(test)]
mod tests {
    use super::top_n;
    use crate::domain::item::ItemId;
    use crate::recommend::ScoreVector;

    fn scores(entries: &[(u64, f64)]) -> ScoreVector {
        ScoreVector::new(
            entries.iter().map(|(id, _)| ItemId(*id)).collect(),
            entries.iter().map(|(_, score)| *score).collect(),
        )
    }

    #[test]
    fn orders_by_score_then_ascending_id() {
        let ranked = top_n(&scores(&[(9, 0.5), (3, 0.9), (4, 0.5), (1, 0.1)]), 3);

        assert_eq!(ranked, vec![ItemId(3), ItemId(4), ItemId(9)]);
    }

    #[test]
    fn all_zero_scores_fall_back_to_id_order() {
        let ranked = top_n(&scores(&[(30, 0.0), (10, 0.0), (20, 0.0)]), 5);

        assert_eq!(ranked, vec![ItemId(10), ItemId(20), ItemId(30)]);
    }

    #[test]
    fn excluded_items_never_pad_the_result() {
        let excluded = f64::NEG_INFINITY;
        let ranked = top_n(&scores(&[(1, excluded), (2, 0.0), (3, excluded)]), 5);

        assert_eq!(ranked, vec![ItemId(2)]);
    }

    #[test]
    fn zero_n_returns_nothing() {
        assert!(top_n(&scores(&[(1, 1.0)]), 0).is_empty());
    }
}
