//! Locating and reading `semantic-index.json`.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use sift_core::config::{DEFAULT_INDEX_PATH, INDEX_CANDIDATES};
use sift_core::error::{Result, SiftError};
use sift_core::types::IndexDocument;

/// Resolve the index file path against `base` (normally the working directory).
///
/// An explicit path is used as given. Otherwise the first existing entry of
/// [`INDEX_CANDIDATES`] wins; when none exists the first candidate is returned
/// so the caller reports a readable "not found" for the expected location.
pub fn resolve_index_path(explicit: Option<&str>, base: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return base.join(path);
    }

    for candidate in INDEX_CANDIDATES.iter().map(|c| base.join(c)) {
        if candidate.is_file() {
            debug!(path = %candidate.display(), "Found semantic index candidate");
            return candidate;
        }
    }
    base.join(DEFAULT_INDEX_PATH)
}

/// Read and parse an index document.
///
/// Both a missing file and malformed JSON are reported as
/// [`SiftError::IndexUnreadable`].
pub fn load_document(path: &Path) -> Result<IndexDocument> {
    let raw = std::fs::read_to_string(path).map_err(|e| SiftError::unreadable(path, e))?;
    let document =
        IndexDocument::from_json_str(&raw).map_err(|e| SiftError::unreadable(path, e))?;
    info!(
        path = %path.display(),
        entries = document.raw_items.len(),
        "Semantic index loaded"
    );
    Ok(document)
}
