use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

// =============================================================================
// Index file
// =============================================================================

/// One embedded blog post as loaded from `semantic-index.json`.
///
/// Vectors are held as `f64` and may contain NaN where the file had a value
/// that does not coerce to a number; scorers skip non-finite components.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexItem {
    /// Unique identifier (the post slug).
    pub id: String,
    /// Embedding vector.
    pub vector: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Precomputed L2 norm of `vector`, when the indexer stored one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norm: Option<f64>,
}

impl IndexItem {
    /// Create an item with only an ID and a vector.
    pub fn new(id: impl Into<String>, vector: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            vector,
            title: None,
            url: None,
            excerpt: None,
            norm: None,
        }
    }

    /// Build an item from a raw JSON entry.
    ///
    /// Returns `None` unless the entry is an object with a string `id` and a
    /// truthy `vector`. A truthy `vector` that is not an array yields an empty
    /// vector rather than dropping the entry.
    pub fn from_value(entry: &Value) -> Option<Self> {
        let obj = entry.as_object()?;
        let id = obj.get("id")?.as_str()?;
        let raw_vector = obj.get("vector")?;
        if !is_truthy(raw_vector) {
            return None;
        }

        let vector = match raw_vector.as_array() {
            Some(values) => values.iter().map(coerce_number).collect(),
            None => Vec::new(),
        };

        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(String::from);

        Some(Self {
            id: id.to_string(),
            vector,
            title: text("title"),
            url: text("url"),
            excerpt: text("excerpt"),
            norm: obj.get("norm").and_then(Value::as_f64).filter(|n| n.is_finite()),
        })
    }
}

/// The whole index document.
///
/// Parsed leniently from a [`Value`]: a document whose `items` is missing or
/// not an array has no items (and `has_items` is false), and unknown fields
/// are ignored.
#[derive(Clone, Debug, Default)]
pub struct IndexDocument {
    /// Embedding provider label written by the indexer.
    pub provider: Option<String>,
    /// Declared embedding dimension, when it is a positive integer.
    pub embedding_dim: Option<usize>,
    /// Raw `generatedAt` string.
    pub generated_at: Option<String>,
    /// Entries of `items` exactly as they appear in the file.
    pub raw_items: Vec<Value>,
    /// Whether the file carried `items` as an array.
    pub has_items: bool,
}

impl IndexDocument {
    /// Parse a document from JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Self::from_value(value))
    }

    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut obj) = value else {
            return Self::default();
        };

        let (raw_items, has_items) = match obj.remove("items") {
            Some(Value::Array(items)) => (items, true),
            _ => (Vec::new(), false),
        };

        let embedding_dim = obj
            .get("embeddingDim")
            .map(coerce_number)
            .filter(|d| d.is_finite() && *d >= 1.0 && d.fract() == 0.0)
            .map(|d| d as usize);

        Self {
            provider: obj.get("provider").and_then(Value::as_str).map(String::from),
            embedding_dim,
            generated_at: obj.get("generatedAt").and_then(Value::as_str).map(String::from),
            raw_items,
            has_items,
        }
    }

    /// Entries that pass the item filter, in file order.
    pub fn items(&self) -> Vec<IndexItem> {
        self.raw_items.iter().filter_map(IndexItem::from_value).collect()
    }

    /// `generatedAt` parsed as an RFC 3339 timestamp.
    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.generated_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }
}

/// Coerce a JSON value to a number the way the site's indexer tooling does.
///
/// Numbers pass through, numeric strings are parsed (an empty string is 0),
/// booleans become 1/0, `null` becomes 0 and everything else is NaN.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// =============================================================================
// Ranking and search output
// =============================================================================

/// A score computed for one item during a single ranking pass.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredResult {
    pub id: String,
    pub score: f64,
}

/// A single cosine search hit with the post's display metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f64,
}

/// Body printed by `sift search`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub took_ms: u64,
    pub provider: String,
}
