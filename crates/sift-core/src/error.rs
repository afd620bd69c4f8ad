use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the Sift toolkit.
///
/// Every variant is terminal for the `sift` process: the binary reports it on
/// stderr and exits with status 1. Nothing is retried; a CI caller re-runs the
/// check instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SiftError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("failed to read index {}: {}", .path.display(), .reason)]
    IndexUnreadable { path: PathBuf, reason: String },

    #[error("no indexed documents found")]
    EmptyIndex,

    #[error("invalid embedding dimension: {0}")]
    InvalidDimension(usize),

    #[error("embedding dimension mismatch for {id}: got {actual}, expected {expected}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },

    #[error("retrieval output is not deterministic: {first:?} != {second:?}")]
    NonDeterministic {
        first: Vec<String>,
        second: Vec<String>,
    },

    #[error("duplicate IDs in ranked response: {}", .0.join(", "))]
    DuplicateIdentifiers(Vec<String>),

    #[error("Search error: {0}")]
    Search(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SiftError {
    /// Build an [`SiftError::IndexUnreadable`] from any displayable cause.
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        SiftError::IndexUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<toml::de::Error> for SiftError {
    fn from(err: toml::de::Error) -> Self {
        SiftError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SiftError {
    fn from(err: toml::ser::Error) -> Self {
        SiftError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SiftError {
    fn from(err: serde_json::Error) -> Self {
        SiftError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Sift operations.
pub type Result<T> = std::result::Result<T, SiftError>;
