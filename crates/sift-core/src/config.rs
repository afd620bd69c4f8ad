use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SiftError};

/// Index file used by the determinism check when nothing else is configured.
pub const DEFAULT_INDEX_PATH: &str = "apps/personal-website/src/data/semantic-index.json";

/// Locations probed, in order, when no index path is configured.
pub const INDEX_CANDIDATES: &[&str] = &[DEFAULT_INDEX_PATH, "src/data/semantic-index.json"];

pub const DEFAULT_SEED: i64 = 42;
pub const DEFAULT_TOP_K: i64 = 5;
pub const DEFAULT_EMBEDDING_DIM: usize = 768;

/// Top-level configuration for the Sift toolkit.
///
/// Loaded from `sift.toml` in the working directory by default. CLI flags and
/// `RETRIEVER_*` environment variables take precedence over every value here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiftConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub retriever: RetrieverConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl SiftConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SiftConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration if the file exists.
    ///
    /// A missing file is the common case and yields `Ok(None)`; a file that
    /// exists but does not parse is an error the caller decides how to report.
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SiftError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Determinism check settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    /// Explicit index path. When unset the [`INDEX_CANDIDATES`] are probed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_path: Option<String>,
    /// Seed for the probe query vector.
    pub seed: i64,
    /// Requested number of ranked IDs. Values below 1 are treated as 1.
    pub top_k: i64,
    /// Fail when an item's vector length differs from the query dimension
    /// instead of scoring the overlapping prefix.
    pub strict_dimensions: bool,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            index_path: None,
            seed: DEFAULT_SEED,
            top_k: DEFAULT_TOP_K,
            strict_dimensions: false,
        }
    }
}

/// Cosine search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Embedding dimension assumed when the index does not declare one.
    pub embedding_dim: usize,
    /// Default number of results.
    pub default_limit: usize,
    /// Maximum number of results.
    pub max_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            default_limit: 5,
            max_limit: 10,
        }
    }
}

impl SearchConfig {
    /// Clamp a requested result count into `1..=max_limit`.
    pub fn clamp_limit(&self, requested: Option<i64>) -> usize {
        let max = self.max_limit.max(1);
        let requested = requested.unwrap_or(self.default_limit as i64);
        requested.clamp(1, max as i64) as usize
    }
}
