//! Matching backends under measurement
//!
//! The harness sees a backend only through two operations:
//! - bulk insert of the corpus into a fresh, empty index
//! - threshold-parameterized ranked search
//!
//! Bundled implementations:
//! - [`ngram::NgramIndex`]: character n-gram index with cosine ranking

pub mod ngram;

use serde::{Deserialize, Serialize};

pub use ngram::{NgramBackendFactory, NgramConfig, NgramIndex};

/// One ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Position of the matched record in insertion order
    pub id: u64,
    /// Similarity score, higher is closer
    pub score: f64,
}

impl SearchResult {
    pub fn new(id: u64, score: f64) -> Self {
        Self { id, score }
    }
}

/// An approximate string matching engine
///
/// `search` takes `&self`: repeated searches against an unmutated index must
/// not change what later searches measure.
pub trait Backend {
    /// Load every record into the index, in order
    fn insert_all(&mut self, records: &[String]) -> anyhow::Result<()>;

    /// Return matches scoring at least `threshold`, best first
    fn search(&self, query: &str, threshold: f64) -> anyhow::Result<Vec<SearchResult>>;
}

/// Builds backend instances for a given index granularity
pub trait BackendFactory {
    type Backend: Backend;

    /// Identity used to tag result records
    fn name(&self) -> &str;

    /// Construct a fresh, empty backend
    fn create(&self, ngram_size: usize) -> anyhow::Result<Self::Backend>;
}
