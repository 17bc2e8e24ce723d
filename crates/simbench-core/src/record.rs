//! Benchmark result records
//!
//! A record is the unit of output: one per (benchmark kind, grid point),
//! tagged with the producing language and backend so documents from
//! independent runs can be merged without ambiguity.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::grid::GridPoint;
use crate::stats::Stats;
use crate::Result;

/// Operation under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkKind {
    Insert,
    Search,
}

impl BenchmarkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BenchmarkKind::Insert => "insert",
            BenchmarkKind::Search => "search",
        }
    }
}

impl fmt::Display for BenchmarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One measured (benchmark kind, grid point) pair
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub language: String,
    pub backend: String,
    pub benchmark: BenchmarkKind,
    pub parameters: GridPoint,
    pub stats: Stats,
}

/// Append-only collector for one run's records
#[derive(Debug, Clone)]
pub struct ResultRecorder {
    language: String,
    backend: String,
    records: Vec<BenchmarkRecord>,
}

impl ResultRecorder {
    /// Create a recorder tagging every record with `language` and `backend`
    pub fn new(language: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            backend: backend.into(),
            records: Vec::new(),
        }
    }

    /// Append a record for a finished measurement
    pub fn record(
        &mut self,
        benchmark: BenchmarkKind,
        parameters: GridPoint,
        stats: Stats,
    ) -> &BenchmarkRecord {
        self.records.push(BenchmarkRecord {
            language: self.language.clone(),
            backend: self.backend.clone(),
            benchmark,
            parameters,
            stats,
        });
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[BenchmarkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<BenchmarkRecord> {
        self.records
    }
}

/// Serialize records as a pretty-printed JSON array
///
/// Output is byte-identical for identical input.
pub fn to_json(records: &[BenchmarkRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Parse a JSON array of records
pub fn from_json(json: &str) -> Result<Vec<BenchmarkRecord>> {
    Ok(serde_json::from_str(json)?)
}
