//! Error types for simbench

use thiserror::Error;

use crate::grid::GridPoint;
use crate::record::BenchmarkKind;

/// Result type alias for simbench operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for simbench operations
///
/// Every variant is fatal for the run: the harness never emits a partial
/// result set.
#[derive(Error, Debug)]
pub enum Error {
    /// Corpus missing or empty, or an invalid configuration value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The operation under test failed during a timed execution
    #[error("Trial failed for {benchmark} benchmark at [{parameters}]: {source}")]
    TrialExecution {
        benchmark: BenchmarkKind,
        parameters: GridPoint,
        #[source]
        source: anyhow::Error,
    },

    /// Building or populating a backend outside the timed region failed
    #[error("Backend setup failed for {benchmark} benchmark at [{parameters}]: {source}")]
    BackendSetup {
        benchmark: BenchmarkKind,
        parameters: GridPoint,
        #[source]
        source: anyhow::Error,
    },

    /// Statistics were requested over zero samples
    #[error("Cannot compute statistics over an empty sample set")]
    EmptySample,

    /// Filesystem or stream I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Arrow batch construction failed
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet encoding/decoding failed
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl Error {
    /// Shorthand for a [`Error::Configuration`] error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}
