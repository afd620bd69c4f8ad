//! Total-order ranking of scored items.

use std::cmp::Ordering;

use sift_core::types::ScoredResult;

/// Descending by score, then ascending by ID.
///
/// Adding `0.0` folds `-0.0` into `+0.0` so equal scores always fall through
/// to the ID comparison; `total_cmp` keeps the order total even for NaN.
pub fn compare_ranked(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    (b.score + 0.0)
        .total_cmp(&(a.score + 0.0))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort `scored` in place and return the first `max(1, top_k)` IDs.
pub fn rank_ids(mut scored: Vec<ScoredResult>, top_k: usize) -> Vec<String> {
    scored.sort_by(compare_ranked);
    scored.truncate(top_k.max(1));
    scored.into_iter().map(|entry| entry.id).collect()
}

/// Convert a requested top-K (possibly zero or negative) to a usable limit.
pub fn effective_top_k(requested: i64) -> usize {
    requested.max(1) as usize
}
