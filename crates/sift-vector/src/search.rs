//! Strict cosine search over a semantic index.
//!
//! Unlike the determinism check, every indexed vector must have exactly the
//! index's embedding dimension; a single malformed entry rejects the index,
//! and so does a document without an `items` array.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use sift_core::error::{Result, SiftError};
use sift_core::types::{coerce_number, IndexDocument, ScoredResult, SearchResult};

use crate::index::load_document;
use crate::query::l2_norm;
use crate::rank::compare_ranked;
use crate::score::dot_prefix;

/// Provider label used when the index does not name one, and the label every
/// search response reports.
pub const DEFAULT_PROVIDER: &str = "semantic-index";

#[derive(Debug, Clone)]
struct IndexedDoc {
    id: String,
    title: Option<String>,
    url: Option<String>,
    excerpt: Option<String>,
    vector: Vec<f64>,
    norm: f64,
}

/// An immutable, validated index ready for cosine queries.
#[derive(Debug, Clone)]
pub struct SemanticIndex {
    docs: Vec<IndexedDoc>,
    embedding_dim: usize,
    provider: String,
}

impl SemanticIndex {
    /// Load and validate the index at `path`.
    ///
    /// `fallback_dim` is used when the document does not declare
    /// `embeddingDim`.
    pub fn load(path: &Path, fallback_dim: usize) -> Result<Self> {
        let document = load_document(path)?;
        let index = Self::from_document(&document, fallback_dim)?;
        info!(
            path = %path.display(),
            docs = index.len(),
            embedding_dim = index.embedding_dim,
            provider = %index.provider,
            "Semantic index ready"
        );
        Ok(index)
    }

    pub fn from_document(document: &IndexDocument, fallback_dim: usize) -> Result<Self> {
        if !document.has_items {
            return Err(SiftError::Search(
                "malformed semantic index: items is not an array".to_string(),
            ));
        }

        let embedding_dim = document.embedding_dim.unwrap_or(fallback_dim);
        let mut docs = Vec::with_capacity(document.raw_items.len());

        for (position, entry) in document.raw_items.iter().enumerate() {
            let id = entry
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| SiftError::Search(format!("item {position} has no string id")))?;
            let raw_vector = entry
                .get("vector")
                .and_then(Value::as_array)
                .ok_or_else(|| SiftError::Search(format!("embedding vector missing for {id}")))?;
            if raw_vector.len() != embedding_dim {
                return Err(SiftError::DimensionMismatch {
                    id: id.to_string(),
                    expected: embedding_dim,
                    actual: raw_vector.len(),
                });
            }

            let vector = finite_or_zero(raw_vector.iter().map(coerce_number));
            let norm = entry
                .get("norm")
                .and_then(Value::as_f64)
                .filter(|n| n.is_finite())
                .unwrap_or_else(|| l2_norm(&vector));
            let text = |key: &str| entry.get(key).and_then(Value::as_str).map(String::from);

            docs.push(IndexedDoc {
                id: id.to_string(),
                title: text("title"),
                url: text("url"),
                excerpt: text("excerpt"),
                vector,
                norm,
            });
        }

        Ok(Self {
            docs,
            embedding_dim,
            provider: document
                .provider
                .clone()
                .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
        })
    }

    /// Rank documents by cosine similarity to `query`.
    ///
    /// The query must match the index dimension. A zero query returns no
    /// results. Documents with a zero norm score 0.
    pub fn search(&self, query: &[f64], top_k: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.embedding_dim {
            return Err(SiftError::DimensionMismatch {
                id: "query".to_string(),
                expected: self.embedding_dim,
                actual: query.len(),
            });
        }

        let query = finite_or_zero(query.iter().copied());
        let query_norm = l2_norm(&query);
        if query_norm == 0.0 {
            debug!("Zero query vector, returning no results");
            return Ok(Vec::new());
        }

        let mut scored: Vec<(ScoredResult, &IndexedDoc)> = self
            .docs
            .iter()
            .map(|doc| {
                let denom = doc.norm * query_norm;
                let score = if denom == 0.0 {
                    0.0
                } else {
                    dot_prefix(&query, &doc.vector) / denom
                };
                let score = if score.is_finite() { score } else { 0.0 };
                (
                    ScoredResult {
                        id: doc.id.clone(),
                        score,
                    },
                    doc,
                )
            })
            .collect();

        scored.sort_by(|a, b| compare_ranked(&a.0, &b.0));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(hit, doc)| SearchResult {
                id: hit.id,
                title: doc.title.clone(),
                url: doc.url.clone(),
                excerpt: doc.excerpt.clone(),
                score: hit.score,
            })
            .collect())
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

fn finite_or_zero(values: impl Iterator<Item = f64>) -> Vec<f64> {
    values.map(|v| if v.is_finite() { v } else { 0.0 }).collect()
}

/// Parse a query vector from JSON text: either a bare array or an object
/// with a `vector` array.
pub fn parse_query_vector(raw: &str) -> Result<Vec<f64>> {
    let value: Value = serde_json::from_str(raw)?;
    let values = match &value {
        Value::Array(values) => values,
        Value::Object(obj) => obj
            .get("vector")
            .and_then(Value::as_array)
            .ok_or_else(|| SiftError::Search("query object has no vector array".to_string()))?,
        _ => {
            return Err(SiftError::Search(
                "query must be a JSON array or an object with a vector".to_string(),
            ))
        }
    };
    Ok(values.iter().map(coerce_number).collect())
}
