//! Dot-product scoring of index items against a query vector.

use tracing::debug;

use sift_core::error::{Result, SiftError};
use sift_core::types::{IndexItem, ScoredResult};

/// How items whose vector length differs from the query are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DimensionPolicy {
    /// Score the overlapping prefix; missing dimensions contribute zero.
    #[default]
    Permissive,
    /// Fail the pass on the first item whose length differs.
    Strict,
}

impl DimensionPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            DimensionPolicy::Strict
        } else {
            DimensionPolicy::Permissive
        }
    }
}

/// Dot product over `min(a.len(), b.len())` components.
///
/// Pairs where either side is non-finite are skipped.
pub fn dot_prefix(a: &[f64], b: &[f64]) -> f64 {
    let mut score = 0.0;
    for (x, y) in a.iter().zip(b) {
        if x.is_finite() && y.is_finite() {
            score += x * y;
        }
    }
    score
}

/// Score every item against `query`, preserving item order.
pub fn score_items(
    items: &[IndexItem],
    query: &[f64],
    policy: DimensionPolicy,
) -> Result<Vec<ScoredResult>> {
    let mut scored = Vec::with_capacity(items.len());
    let mut mismatched = 0usize;

    for item in items {
        if item.vector.len() != query.len() {
            if policy == DimensionPolicy::Strict {
                return Err(SiftError::DimensionMismatch {
                    id: item.id.clone(),
                    expected: query.len(),
                    actual: item.vector.len(),
                });
            }
            mismatched += 1;
        }
        scored.push(ScoredResult {
            id: item.id.clone(),
            score: dot_prefix(&item.vector, query),
        });
    }

    if mismatched > 0 {
        debug!(
            mismatched,
            dimension = query.len(),
            "Scored items over a partial dimension overlap"
        );
    }

    Ok(scored)
}
