//! Sift binary - composition root.
//!
//! 1. Parse CLI arguments and load `sift.toml` (if any)
//! 2. Initialize tracing on stderr
//! 3. Resolve the index path and run the requested command
//! 4. Map any failure to exit status 1 with a diagnostic on stderr

mod cli;

use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use clap::error::ErrorKind;
use clap::Parser;

use sift_core::config::SiftConfig;
use sift_core::error::{Result, SiftError};
use sift_core::types::SearchResponse;
use sift_vector::search::DEFAULT_PROVIDER;
use sift_vector::{
    parse_query_vector, query_vector, resolve_index_path, DeterminismCheck, DimensionPolicy,
    IndexReport, SemanticIndex,
};

use cli::{CheckArgs, CliArgs, Command, InspectArgs, SearchArgs};

fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    // Usage errors share exit status 1 with every other failure; only help
    // and version output go through clap's own exit.
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => e.exit(),
            _ => {
                let _ = e.print();
                return ExitCode::FAILURE;
            }
        },
    };

    // Config is read before tracing exists so its log level can apply; a parse
    // failure is reported once the subscriber is up.
    let config_file = args.resolve_config_path();
    let (config, config_error) = match SiftConfig::load_optional(&config_file) {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(e) => (SiftConfig::default(), Some(e)),
    };

    init_tracing(&args.resolve_log_level(&config));
    tracing::debug!("Starting Sift v{}", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        );
    }

    let outcome = match args.command {
        None => run_check(&config, &CheckArgs::default()),
        Some(Command::Check(ref check)) => run_check(&config, check),
        Some(Command::Search(ref search)) => run_search(&config, search),
        Some(Command::Inspect(ref inspect)) => run_inspect(&config, inspect),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[sift] {e}");
            ExitCode::FAILURE
        }
    }
}

fn working_dir() -> Result<std::path::PathBuf> {
    Ok(std::env::current_dir()?)
}

fn run_check(config: &SiftConfig, args: &CheckArgs) -> Result<()> {
    let resolved = cli::resolve_check(args, &config.retriever, cli::process_env);
    let path = resolve_index_path(resolved.index_path.as_deref(), &working_dir()?);
    tracing::info!(
        path = %path.display(),
        seed = resolved.seed,
        top_k = resolved.top_k,
        strict = resolved.strict,
        "Running retrieval determinism check"
    );

    let check = DeterminismCheck::new(
        resolved.seed,
        resolved.top_k,
        DimensionPolicy::from_strict(resolved.strict),
    );
    let report = check.run_file(&path)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("[sift] {}", report.summary());
    }
    Ok(())
}

fn run_search(config: &SiftConfig, args: &SearchArgs) -> Result<()> {
    let started = Instant::now();
    let index_path = cli::resolve_index_path(
        args.index.as_deref(),
        &config.retriever,
        cli::process_env,
    );
    let path = resolve_index_path(index_path.as_deref(), &working_dir()?);
    let index = SemanticIndex::load(&path, config.search.embedding_dim)?;

    let query = match (&args.vector, args.seed) {
        (Some(file), _) => read_query_file(file)?,
        (None, Some(seed)) => query_vector(seed, index.embedding_dim()),
        (None, None) => {
            return Err(SiftError::Search(
                "either --vector or --seed is required".to_string(),
            ))
        }
    };

    let top_k = config.search.clamp_limit(args.top_k);
    let results = index.search(&query, top_k)?;
    tracing::info!(results = results.len(), top_k, "Search complete");

    let response = SearchResponse {
        results,
        took_ms: started.elapsed().as_millis() as u64,
        provider: DEFAULT_PROVIDER.to_string(),
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn read_query_file(file: &Path) -> Result<Vec<f64>> {
    let raw = std::fs::read_to_string(file).map_err(|e| {
        SiftError::Search(format!("cannot read query vector {}: {e}", file.display()))
    })?;
    parse_query_vector(&raw)
}

fn run_inspect(config: &SiftConfig, args: &InspectArgs) -> Result<()> {
    let index_path = cli::resolve_index_path(
        args.index.as_deref(),
        &config.retriever,
        cli::process_env,
    );
    let path = resolve_index_path(index_path.as_deref(), &working_dir()?);
    let report = IndexReport::from_path(&path)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
