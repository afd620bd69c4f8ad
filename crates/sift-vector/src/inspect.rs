//! Shape report for an index file.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use sift_core::error::Result;
use sift_core::types::IndexDocument;

use crate::index::load_document;

/// Summary of what an index file contains.
///
/// Built from the permissive view of the document, so it never fails on
/// malformed entries; it counts them instead.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IndexReport {
    pub path: PathBuf,
    pub provider: Option<String>,
    pub declared_dim: Option<usize>,
    /// Vector length of the first valid item.
    pub inferred_dim: Option<usize>,
    pub generated_at: Option<DateTime<Utc>>,
    pub total_entries: usize,
    pub valid_items: usize,
    /// Entries dropped by the item filter.
    pub skipped_entries: usize,
    /// IDs whose vector length differs from the inferred dimension.
    pub dimension_mismatches: Vec<String>,
    pub missing_norms: usize,
    pub duplicate_ids: Vec<String>,
}

impl IndexReport {
    pub fn from_path(path: &Path) -> Result<Self> {
        let document = load_document(path)?;
        Ok(Self::from_document(path, &document))
    }

    pub fn from_document(path: &Path, document: &IndexDocument) -> Self {
        let items = document.items();
        let inferred_dim = items.first().map(|item| item.vector.len());

        let dimension_mismatches = match inferred_dim {
            Some(dim) => items
                .iter()
                .filter(|item| item.vector.len() != dim)
                .map(|item| item.id.clone())
                .collect(),
            None => Vec::new(),
        };

        let mut seen = HashSet::new();
        let mut duplicate_ids: Vec<String> = Vec::new();
        for item in &items {
            if !seen.insert(item.id.as_str()) && !duplicate_ids.contains(&item.id) {
                duplicate_ids.push(item.id.clone());
            }
        }

        Self {
            path: path.to_path_buf(),
            provider: document.provider.clone(),
            declared_dim: document.embedding_dim,
            inferred_dim,
            generated_at: document.generated_at(),
            total_entries: document.raw_items.len(),
            valid_items: items.len(),
            skipped_entries: document.raw_items.len() - items.len(),
            dimension_mismatches,
            missing_norms: items.iter().filter(|item| item.norm.is_none()).count(),
            duplicate_ids,
        }
    }

    /// True when the index would pass the determinism check's preconditions
    /// and has no shape problems worth flagging.
    pub fn is_clean(&self) -> bool {
        self.valid_items > 0
            && self.inferred_dim.unwrap_or(0) > 0
            && self.skipped_entries == 0
            && self.dimension_mismatches.is_empty()
            && self.duplicate_ids.is_empty()
            && self.declared_dim.map_or(true, |d| Some(d) == self.inferred_dim)
    }
}

fn or_dash<T: fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

impl fmt::Display for IndexReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "index:        {}", self.path.display())?;
        writeln!(f, "provider:     {}", or_dash(&self.provider))?;
        writeln!(f, "generated at: {}", or_dash(&self.generated_at))?;
        writeln!(f, "declared dim: {}", or_dash(&self.declared_dim))?;
        writeln!(f, "inferred dim: {}", or_dash(&self.inferred_dim))?;
        writeln!(
            f,
            "items:        {} valid / {} entries ({} skipped)",
            self.valid_items, self.total_entries, self.skipped_entries
        )?;
        writeln!(f, "missing norm: {}", self.missing_norms)?;
        if !self.dimension_mismatches.is_empty() {
            writeln!(
                f,
                "dim mismatch: {}",
                self.dimension_mismatches.join(", ")
            )?;
        }
        if !self.duplicate_ids.is_empty() {
            writeln!(f, "duplicates:   {}", self.duplicate_ids.join(", "))?;
        }
        write!(f, "status:       {}", if self.is_clean() { "ok" } else { "needs attention" })
    }
}
