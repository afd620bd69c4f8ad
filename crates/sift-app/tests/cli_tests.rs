//! Runs the built `sift` binary against fixture indexes.
//!
//! Each test gets its own temporary working directory and a scrubbed
//! environment so `RETRIEVER_*` settings on the host cannot leak in.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;

fn sift(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sift"));
    cmd.current_dir(dir)
        .args(args)
        .env_remove("RETRIEVER_INDEX_PATH")
        .env_remove("RETRIEVER_SEED")
        .env_remove("RETRIEVER_TOP_K")
        .env_remove("SIFT_CONFIG")
        .env("RUST_LOG", "off");
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.output().expect("failed to run sift")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn write_json(dir: &Path, relative: &str, value: &Value) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, serde_json::to_string(value).unwrap()).unwrap();
}

fn site_index() -> Value {
    json!({
        "provider": "gemini-text-embedding-004",
        "embeddingDim": 3,
        "items": [
            {"id": "rust-notes", "title": "Rust Notes", "url": "/blog/rust-notes", "vector": [1, 0, 0]},
            {"id": "go-notes", "title": "Go Notes", "url": "/blog/go-notes", "vector": [0.6, 0.8, 0]},
            {"id": "bread", "title": "Bread", "url": "/blog/bread", "vector": [0, 0, 1]},
            {"id": "travel", "title": "Travel", "url": "/blog/travel", "vector": [-1, 0, 0]}
        ]
    })
}

#[test]
fn check_succeeds_with_default_index_location() {
    let dir = TempDir::new().unwrap();
    write_json(
        dir.path(),
        "apps/personal-website/src/data/semantic-index.json",
        &site_index(),
    );

    let output = sift(dir.path(), &[], &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "[sift] deterministic output confirmed (4 ids)"
    );
}

#[test]
fn check_reads_env_configuration() {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "custom/index.json", &site_index());

    let output = sift(
        dir.path(),
        &["check", "--json"],
        &[
            ("RETRIEVER_INDEX_PATH", "custom/index.json"),
            ("RETRIEVER_SEED", "7"),
            ("RETRIEVER_TOP_K", "2"),
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["seed"], 7);
    assert_eq!(report["top_k"], 2);
    assert_eq!(report["ids"].as_array().unwrap().len(), 2);
}

#[test]
fn check_output_is_identical_across_processes() {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "index.json", &site_index());

    let first = sift(dir.path(), &["check", "-i", "index.json", "--json"], &[]);
    let second = sift(dir.path(), &["check", "-i", "index.json", "--json"], &[]);
    assert!(first.status.success());
    assert_eq!(stdout(&first), stdout(&second));
}

#[test]
fn check_fails_on_missing_index() {
    let dir = TempDir::new().unwrap();
    let output = sift(dir.path(), &["check"], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to read index"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn check_fails_on_empty_index() {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "index.json", &json!({"items": []}));
    let output = sift(dir.path(), &["check", "-i", "index.json"], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("no indexed documents found"));
}

#[test]
fn check_fails_on_invalid_dimension() {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "index.json", &json!({"items": [{"id": "a", "vector": []}]}));
    let output = sift(dir.path(), &["check", "-i", "index.json"], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid embedding dimension"));
}

#[test]
fn check_fails_on_duplicate_ids() {
    let dir = TempDir::new().unwrap();
    write_json(
        dir.path(),
        "index.json",
        &json!({"items": [
            {"id": "a", "vector": [1, 1]},
            {"id": "a", "vector": [1, 1]}
        ]}),
    );
    let output = sift(dir.path(), &["check", "-i", "index.json"], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("duplicate IDs"));
}

#[test]
fn strict_config_rejects_mismatched_items() {
    let dir = TempDir::new().unwrap();
    write_json(
        dir.path(),
        "index.json",
        &json!({"items": [
            {"id": "a", "vector": [1, 1]},
            {"id": "b", "vector": [1]}
        ]}),
    );
    std::fs::write(
        dir.path().join("sift.toml"),
        "[retriever]\nindex_path = \"index.json\"\n",
    )
    .unwrap();

    let permissive = sift(dir.path(), &["check"], &[]);
    assert!(permissive.status.success(), "stderr: {}", stderr(&permissive));

    std::fs::write(
        dir.path().join("sift.toml"),
        "[retriever]\nindex_path = \"index.json\"\nstrict_dimensions = true\n",
    )
    .unwrap();
    let strict = sift(dir.path(), &["check"], &[]);
    assert_eq!(strict.status.code(), Some(1));
    assert!(stderr(&strict).contains("dimension mismatch for b"));
}

#[test]
fn search_with_query_file() {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "index.json", &site_index());
    write_json(dir.path(), "query.json", &json!({"vector": [1, 0, 0]}));

    let output = sift(
        dir.path(),
        &["search", "-i", "index.json", "--vector", "query.json", "-k", "2"],
        &[],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let response: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(response["provider"], "semantic-index");
    let results = response["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], "rust-notes");
    assert_eq!(results[1]["id"], "go-notes");
    assert_eq!(results[0]["url"], "/blog/rust-notes");
    assert!(response["tookMs"].is_u64());
}

#[test]
fn search_rejects_index_without_items_array() {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "index.json", &json!({"embeddingDim": 3, "items": {}}));

    let output = sift(dir.path(), &["search", "-i", "index.json", "--seed", "1"], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("malformed semantic index"));
}

#[test]
fn invalid_flag_value_exits_with_failure() {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "index.json", &site_index());

    for args in [
        &["check", "--seed", "abc"][..],
        &["check", "--no-such-flag"][..],
        &["search", "-i", "index.json"][..],
    ] {
        let output = sift(dir.path(), args, &[]);
        assert_eq!(output.status.code(), Some(1), "args: {args:?}");
        assert!(!stderr(&output).is_empty());
        assert!(stdout(&output).is_empty());
    }
}

#[test]
fn help_exits_successfully() {
    let dir = TempDir::new().unwrap();
    let output = sift(dir.path(), &["--help"], &[]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Usage"));
}

#[test]
fn check_reduces_large_env_seed() {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "index.json", &site_index());

    let reduced = sift(
        dir.path(),
        &["check", "-i", "index.json", "--json"],
        &[("RETRIEVER_SEED", "1e20")],
    );
    assert!(reduced.status.success(), "stderr: {}", stderr(&reduced));
    let report: Value = serde_json::from_str(&stdout(&reduced)).unwrap();
    assert_eq!(report["seed"], 1_661_992_960_i64);

    let direct = sift(
        dir.path(),
        &["check", "-i", "index.json", "--json", "--seed", "1661992960"],
        &[],
    );
    let direct: Value = serde_json::from_str(&stdout(&direct)).unwrap();
    assert_eq!(report["ids"], direct["ids"]);
}

#[test]
fn search_clamps_top_k() {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "index.json", &site_index());

    let output = sift(dir.path(), &["search", "-i", "index.json", "--seed", "3", "-k", "0"], &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let response: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(response["results"].as_array().unwrap().len(), 1);
}

#[test]
fn search_rejects_wrong_query_dimension() {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "index.json", &site_index());
    write_json(dir.path(), "query.json", &json!([1, 0]));

    let output = sift(dir.path(), &["search", "-i", "index.json", "-v", "query.json"], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("dimension mismatch for query"));
}

#[test]
fn inspect_prints_report() {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "src/data/semantic-index.json", &site_index());

    let output = sift(dir.path(), &["inspect"], &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("provider:     gemini-text-embedding-004"));
    assert!(text.contains("items:        4 valid / 4 entries (0 skipped)"));

    let output = sift(dir.path(), &["inspect", "--json"], &[]);
    let report: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["declared_dim"], 3);
    assert_eq!(report["valid_items"], 4);
}
