//! CLI argument definitions for the `sift` binary.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::warn;

use sift_core::config::{RetrieverConfig, SiftConfig};

pub const ENV_INDEX_PATH: &str = "RETRIEVER_INDEX_PATH";
pub const ENV_SEED: &str = "RETRIEVER_SEED";
pub const ENV_TOP_K: &str = "RETRIEVER_TOP_K";
pub const ENV_CONFIG: &str = "SIFT_CONFIG";

const TWO_POW_32: f64 = 4_294_967_296.0;
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

/// Sift: deterministic retrieval checks and cosine search over a blog's
/// semantic index.
#[derive(Parser, Debug)]
#[command(name = "sift", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Command to run; defaults to `check`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank the index twice with a seeded probe vector and require identical,
    /// duplicate-free output.
    Check(CheckArgs),
    /// Cosine search over the index for a query vector.
    Search(SearchArgs),
    /// Report the shape of an index file.
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Index file (relative to the working directory).
    #[arg(short = 'i', long = "index")]
    pub index: Option<String>,

    /// Seed for the probe query vector.
    #[arg(short = 's', long = "seed", allow_negative_numbers = true)]
    pub seed: Option<i64>,

    /// Number of ranked IDs to compare.
    #[arg(short = 'k', long = "top-k", allow_negative_numbers = true)]
    pub top_k: Option<i64>,

    /// Fail on items whose vector length differs from the first item's.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Print the report as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Index file (relative to the working directory).
    #[arg(short = 'i', long = "index")]
    pub index: Option<String>,

    /// JSON file holding the query vector (`[..]` or `{"vector": [..]}`).
    #[arg(short = 'v', long = "vector", required_unless_present = "seed", conflicts_with = "seed")]
    pub vector: Option<PathBuf>,

    /// Use a seeded probe vector instead of a query file.
    #[arg(short = 's', long = "seed", allow_negative_numbers = true)]
    pub seed: Option<i64>,

    /// Number of results, clamped to the configured maximum.
    #[arg(short = 'k', long = "top-k", allow_negative_numbers = true)]
    pub top_k: Option<i64>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Index file (relative to the working directory).
    #[arg(short = 'i', long = "index")]
    pub index: Option<String>,

    /// Print the report as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

/// Settings for a determinism check after all sources are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCheck {
    pub index_path: Option<String>,
    pub seed: i64,
    pub top_k: i64,
    pub strict: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > SIFT_CONFIG env var > `sift.toml` in the
    /// working directory.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var(ENV_CONFIG) {
            return PathBuf::from(p);
        }
        PathBuf::from("sift.toml")
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config: &SiftConfig) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config.general.log_level.clone())
    }
}

/// Read a variable from the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Resolve an index path: flag > RETRIEVER_INDEX_PATH > config.
///
/// `None` means "probe the default candidates".
pub fn resolve_index_path(
    flag: Option<&str>,
    config: &RetrieverConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    if let Some(path) = flag {
        return Some(path.to_string());
    }
    if let Some(path) = env(ENV_INDEX_PATH).filter(|p| !p.trim().is_empty()) {
        return Some(path);
    }
    config.index_path.clone()
}

/// Merge check flags, environment and config into final settings.
pub fn resolve_check(
    args: &CheckArgs,
    config: &RetrieverConfig,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedCheck {
    let index_path = resolve_index_path(args.index.as_deref(), config, &env);
    let seed = args
        .seed
        .or_else(|| env_integer(ENV_SEED, &env, parse_seed))
        .unwrap_or(config.seed);
    let top_k = args
        .top_k
        .or_else(|| env_integer(ENV_TOP_K, &env, parse_integer))
        .unwrap_or(config.top_k);

    ResolvedCheck {
        index_path,
        seed,
        top_k,
        strict: args.strict || config.strict_dimensions,
    }
}

/// Read an integer-valued environment variable.
///
/// Unset or empty values fall through silently; values that are not numbers
/// fall through with a warning.
fn env_integer(
    key: &str,
    env: impl Fn(&str) -> Option<String>,
    parse: fn(&str) -> Option<i64>,
) -> Option<i64> {
    let raw = env(key)?;
    if raw.trim().is_empty() {
        return None;
    }
    let parsed = parse(&raw);
    if parsed.is_none() {
        warn!(variable = key, value = %raw, "Ignoring non-numeric value");
    }
    parsed
}

/// Parse an integer, truncating finite decimals toward zero.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
}

/// Parse a seed like [`parse_integer`], except that values outside the `i64`
/// range are reduced modulo 2^32 instead of saturating, so they keep the
/// generator state they would have had.
pub fn parse_seed(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    let value = trimmed.parse::<f64>().ok().filter(|v| v.is_finite())?.trunc();
    if value.abs() < TWO_POW_63 {
        Some(value as i64)
    } else {
        Some(value.rem_euclid(TWO_POW_32) as i64)
    }
}
