//! Result sinks for simbench
//!
//! This module moves result documents in and out of the process:
//! - JSON documents to stdout or a file
//! - Reading and merging documents from independent runs
//! - Parquet export via Arrow (see [`parquet`])

pub mod parquet;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

pub use self::parquet::{ParquetExporter, ResultSchema};

use crate::record::{self, BenchmarkRecord};
use crate::{Error, Result};

/// Destination for the JSON result document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputSink {
    /// Write to standard output
    #[default]
    Stdout,
    /// Write to a file, replacing any previous content
    File(PathBuf),
}

impl OutputSink {
    /// Write `records` as one JSON array
    pub fn write(&self, records: &[BenchmarkRecord]) -> Result<()> {
        match self {
            OutputSink::Stdout => {
                let stdout = io::stdout();
                write_json(stdout.lock(), records)
            }
            OutputSink::File(path) => {
                write_json(BufWriter::new(File::create(path)?), records)?;
                info!(path = %path.display(), records = records.len(), "results written");
                Ok(())
            }
        }
    }
}

/// Serialize records to `writer` with a trailing newline
pub fn write_json<W: Write>(mut writer: W, records: &[BenchmarkRecord]) -> Result<()> {
    let json = record::to_json(records)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read a result document from disk
///
/// Files ending in `.parquet` are decoded as Parquet, everything else as
/// JSON.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<Vec<BenchmarkRecord>> {
    let path = path.as_ref();
    if path.extension().is_some_and(|ext| ext == "parquet") {
        return ParquetExporter::read_records(path);
    }

    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            Error::config(format!("result document not found: {}", path.display()))
        }
        _ => Error::Io(e),
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Concatenate documents in argument order
pub fn merge_documents<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<BenchmarkRecord>> {
    let mut merged = Vec::new();
    for path in paths {
        let records = read_document(path)?;
        info!(path = %path.as_ref().display(), records = records.len(), "merged document");
        merged.extend(records);
    }
    Ok(merged)
}
