//! Sift vector crate - seeded probe vectors, dot-product ranking, the
//! determinism check, and strict cosine search over `semantic-index.json`.
//!
//! Everything here is synchronous and allocation-light: an index is loaded
//! once, read-only, and every ranking pass builds its scores from scratch.

pub mod determinism;
pub mod index;
pub mod inspect;
pub mod query;
pub mod rank;
pub mod rng;
pub mod score;
pub mod search;

pub use determinism::{DeterminismCheck, DeterminismReport};
pub use index::{load_document, resolve_index_path};
pub use inspect::IndexReport;
pub use query::query_vector;
pub use rank::rank_ids;
pub use rng::SeededRng;
pub use score::{score_items, DimensionPolicy};
pub use search::{parse_query_vector, SemanticIndex};
