//! simbench core - measurement harness for approximate string matching
//!
//! This crate provides the pieces of a repeatable, cross-language benchmark:
//! - Corpus loading and seeded synthetic workloads
//! - Parameter sweep grids (n-gram size x similarity threshold)
//! - A time-boxed trial runner over an injectable monotonic clock
//! - Mean / population standard deviation summaries
//! - Field-tagged JSON result documents, Parquet export and comparison tables
//!
//! # Architecture
//!
//! Backends are opaque behind [`backend::Backend`]; the harness only times
//! their bulk insert and ranked search calls. Execution is single-threaded
//! and sequential so that timed trials never contend with each other.

pub mod backend;
pub mod clock;
pub mod config;
pub mod corpus;
pub mod error;
pub mod grid;
pub mod harness;
pub mod record;
pub mod report;
pub mod runner;
pub mod stats;
pub mod storage;

pub use backend::{Backend, BackendFactory, NgramBackendFactory, SearchResult};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{CorpusSource, HarnessConfig};
pub use corpus::Corpus;
pub use error::{Error, Result};
pub use grid::{GridPoint, ParamValue, ParameterGrid};
pub use harness::Harness;
pub use record::{BenchmarkKind, BenchmarkRecord, ResultRecorder};
pub use runner::TrialRunner;
pub use stats::Stats;
pub use storage::OutputSink;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
