//! The retrieval determinism check.
//!
//! Runs the whole probe pipeline (seeded query vector, dot-product scoring,
//! total-order ranking) twice against the same index and requires the two
//! ranked ID lists to be identical and free of duplicates. Any failure is
//! final; the check is a CI gate and is simply re-run by its caller.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use sift_core::error::{Result, SiftError};
use sift_core::types::IndexItem;

use crate::index::load_document;
use crate::query::query_vector;
use crate::rank::{effective_top_k, rank_ids};
use crate::score::{score_items, DimensionPolicy};

/// Parameters of one determinism check.
#[derive(Clone, Debug)]
pub struct DeterminismCheck {
    pub seed: i64,
    pub top_k: usize,
    pub policy: DimensionPolicy,
}

/// Outcome of a passing check.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeterminismReport {
    /// Ranked IDs shared by both runs.
    pub ids: Vec<String>,
    /// Query dimension inferred from the first item.
    pub dimension: usize,
    pub seed: i64,
    pub top_k: usize,
    /// Number of items that passed the index filter.
    pub items: usize,
}

impl DeterminismReport {
    pub fn summary(&self) -> String {
        format!("deterministic output confirmed ({} ids)", self.ids.len())
    }
}

impl Default for DeterminismCheck {
    fn default() -> Self {
        Self {
            seed: sift_core::config::DEFAULT_SEED,
            top_k: effective_top_k(sift_core::config::DEFAULT_TOP_K),
            policy: DimensionPolicy::Permissive,
        }
    }
}

impl DeterminismCheck {
    pub fn new(seed: i64, top_k: i64, policy: DimensionPolicy) -> Self {
        Self {
            seed,
            top_k: effective_top_k(top_k),
            policy,
        }
    }

    /// Load the index at `path` and run the check against its items.
    pub fn run_file(&self, path: &Path) -> Result<DeterminismReport> {
        let document = load_document(path)?;
        let items = document.items();
        debug!(
            entries = document.raw_items.len(),
            valid = items.len(),
            "Filtered index entries"
        );
        self.run(&items)
    }

    /// Run the check against already-loaded items.
    pub fn run(&self, items: &[IndexItem]) -> Result<DeterminismReport> {
        let first_item = items.first().ok_or(SiftError::EmptyIndex)?;
        let dimension = first_item.vector.len();
        if dimension == 0 {
            return Err(SiftError::InvalidDimension(dimension));
        }

        let first = self.ranked_ids(items, dimension)?;
        let second = self.ranked_ids(items, dimension)?;
        verify_runs(&first, &second)?;

        info!(
            seed = self.seed,
            top_k = self.top_k,
            dimension,
            ids = first.len(),
            "Retrieval output is deterministic"
        );

        Ok(DeterminismReport {
            ids: first,
            dimension,
            seed: self.seed,
            top_k: self.top_k,
            items: items.len(),
        })
    }

    /// One full pass: fresh query vector, scores, ranking.
    pub fn ranked_ids(&self, items: &[IndexItem], dimension: usize) -> Result<Vec<String>> {
        let query = query_vector(self.seed, dimension);
        let scored = score_items(items, &query, self.policy)?;
        Ok(rank_ids(scored, self.top_k))
    }
}

/// Compare two ranked lists and reject repeated IDs.
pub fn verify_runs(first: &[String], second: &[String]) -> Result<()> {
    if first != second {
        return Err(SiftError::NonDeterministic {
            first: first.to_vec(),
            second: second.to_vec(),
        });
    }

    let mut seen = HashSet::with_capacity(first.len());
    let mut duplicates: Vec<String> = Vec::new();
    for id in first {
        if !seen.insert(id.as_str()) && !duplicates.contains(id) {
            duplicates.push(id.clone());
        }
    }
    if !duplicates.is_empty() {
        return Err(SiftError::DuplicateIdentifiers(duplicates));
    }

    Ok(())
}
