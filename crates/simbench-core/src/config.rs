//! Harness configuration
//!
//! Defaults reproduce the reference sweep shared by every language port:
//! n-gram sizes 2, 3, 4; thresholds 0.6 to 0.9; 20 s budget; 100 iterations;
//! the first 100 corpus records as search queries.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::record::BenchmarkKind;
use crate::{Error, Result};

/// Where the workload comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CorpusSource {
    /// One record per line
    File { path: PathBuf },
    /// Seeded generator, for runs without a data file
    Synthetic { count: usize, seed: u64 },
}

impl Default for CorpusSource {
    fn default() -> Self {
        CorpusSource::File {
            path: PathBuf::from("benches/data/company_names.txt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Full configuration for one harness run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Language tag written into every record
    pub language: String,
    /// Overrides the backend factory's own name when set
    pub backend_name: Option<String>,
    pub corpus: CorpusSource,
    /// Index granularity sweep
    pub ngram_sizes: Vec<usize>,
    /// Similarity threshold sweep, search only
    pub thresholds: Vec<f64>,
    /// Wall-clock budget per grid point, in seconds
    pub time_budget_secs: f64,
    /// Sample cap per grid point
    pub max_iterations: usize,
    /// Number of leading corpus records used as search queries
    pub query_count: usize,
    /// Benchmarks to run, in order
    pub benchmarks: Vec<BenchmarkKind>,
    /// JSON document destination; stdout when unset
    pub output: Option<PathBuf>,
    /// Optional Parquet export
    pub parquet: Option<PathBuf>,
    pub logging: LoggingConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            language: "rust".to_string(),
            backend_name: None,
            corpus: CorpusSource::default(),
            ngram_sizes: vec![2, 3, 4],
            thresholds: vec![0.6, 0.7, 0.8, 0.9],
            time_budget_secs: 20.0,
            max_iterations: 100,
            query_count: 100,
            benchmarks: vec![BenchmarkKind::Insert, BenchmarkKind::Search],
            output: None,
            parquet: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Load from a TOML file, or defaults when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p).map_err(|e| {
                    Error::config(format!("cannot read config {}: {}", p.display(), e))
                })?;
                Self::from_toml(&content)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Budget as a `Duration`; values too large to represent saturate
    pub fn time_budget(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_budget_secs).unwrap_or(Duration::MAX)
    }

    pub fn runs(&self, kind: BenchmarkKind) -> bool {
        self.benchmarks.contains(&kind)
    }

    /// Reject values that would make the run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(Error::config("language tag must not be empty"));
        }
        if self.benchmarks.is_empty() {
            return Err(Error::config("no benchmarks selected"));
        }
        if self.ngram_sizes.is_empty() {
            return Err(Error::config("ngram_sizes must not be empty"));
        }
        if self.ngram_sizes.contains(&0) {
            return Err(Error::config("ngram_sizes must be at least 1"));
        }
        if !self.time_budget_secs.is_finite() || self.time_budget_secs < 0.0 {
            return Err(Error::config(format!(
                "time_budget_secs must be a non-negative number, got {}",
                self.time_budget_secs
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::config("max_iterations must be at least 1"));
        }
        if let CorpusSource::Synthetic { count: 0, .. } = self.corpus {
            return Err(Error::config("synthetic corpus count must be at least 1"));
        }

        if self.runs(BenchmarkKind::Search) {
            if self.thresholds.is_empty() {
                return Err(Error::config("thresholds must not be empty"));
            }
            if let Some(t) = self.thresholds.iter().find(|t| !(0.0..=1.0).contains(*t)) {
                return Err(Error::config(format!("threshold {} outside [0, 1]", t)));
            }
            if self.query_count == 0 {
                return Err(Error::config("query_count must be at least 1"));
            }
        }

        Ok(())
    }
}
