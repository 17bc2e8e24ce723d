//! Parquet export of result records using Arrow
//!
//! One row per record. Grid parameters are stored as JSON text since the set
//! of sweep dimensions differs between benchmark kinds.

use arrow::array::{Array, ArrayRef, Float64Array, RecordBatch, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use ::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use ::parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::record::{BenchmarkKind, BenchmarkRecord};
use crate::stats::Stats;
use crate::{Error, Result};

/// Arrow schema for result records
pub struct ResultSchema;

impl ResultSchema {
    pub fn get() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("language", DataType::Utf8, false),
            Field::new("backend", DataType::Utf8, false),
            Field::new("benchmark", DataType::Utf8, false),
            Field::new("parameters", DataType::Utf8, false),
            Field::new("mean", DataType::Float64, false),
            Field::new("stddev", DataType::Float64, false),
            Field::new("iterations", DataType::UInt64, false),
        ]))
    }
}

/// Writer/reader for Parquet result files
pub struct ParquetExporter;

impl ParquetExporter {
    /// Build a RecordBatch from result records
    pub fn create_batch(records: &[BenchmarkRecord]) -> Result<RecordBatch> {
        let parameters = records
            .iter()
            .map(|r| serde_json::to_string(&r.parameters))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.language.as_str()))),
            Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.backend.as_str()))),
            Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.benchmark.as_str()))),
            Arc::new(StringArray::from(parameters)),
            Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.stats.mean))),
            Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.stats.stddev))),
            Arc::new(UInt64Array::from_iter_values(
                records.iter().map(|r| r.stats.iterations as u64),
            )),
        ];

        Ok(RecordBatch::try_new(ResultSchema::get(), columns)?)
    }

    /// Write records to a Parquet file
    pub fn write_file<P: AsRef<Path>>(path: P, records: &[BenchmarkRecord]) -> Result<()> {
        let path = path.as_ref();
        let batch = Self::create_batch(records)?;

        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
        writer.write(&batch)?;
        writer.close()?;

        info!(path = %path.display(), rows = batch.num_rows(), "parquet export written");
        Ok(())
    }

    /// Read all batches from a Parquet file
    pub fn read_batches<P: AsRef<Path>>(path: P) -> Result<Vec<RecordBatch>> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut batches = Vec::new();
        for batch in reader {
            batches.push(batch?);
        }
        Ok(batches)
    }

    /// Decode result records from a Parquet file written by [`Self::write_file`]
    pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<BenchmarkRecord>> {
        let mut records = Vec::new();

        for batch in Self::read_batches(path)? {
            let language = string_column(&batch, "language")?;
            let backend = string_column(&batch, "backend")?;
            let benchmark = string_column(&batch, "benchmark")?;
            let parameters = string_column(&batch, "parameters")?;
            let mean = typed_column::<Float64Array>(&batch, "mean")?;
            let stddev = typed_column::<Float64Array>(&batch, "stddev")?;
            let iterations = typed_column::<UInt64Array>(&batch, "iterations")?;

            for row in 0..batch.num_rows() {
                records.push(BenchmarkRecord {
                    language: language.value(row).to_string(),
                    backend: backend.value(row).to_string(),
                    benchmark: parse_kind(benchmark.value(row))?,
                    parameters: serde_json::from_str(parameters.value(row))?,
                    stats: Stats {
                        mean: mean.value(row),
                        stddev: stddev.value(row),
                        iterations: iterations.value(row) as usize,
                    },
                });
            }
        }

        Ok(records)
    }
}

fn typed_column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|col| col.as_any().downcast_ref::<T>())
        .ok_or_else(|| Error::config(format!("parquet column `{}` missing or mistyped", name)))
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    typed_column::<StringArray>(batch, name)
}

fn parse_kind(value: &str) -> Result<BenchmarkKind> {
    match value {
        "insert" => Ok(BenchmarkKind::Insert),
        "search" => Ok(BenchmarkKind::Search),
        other => Err(Error::config(format!("unknown benchmark kind `{}`", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridPoint, ParamValue, NGRAM_SIZE, THRESHOLD};

    fn records() -> Vec<BenchmarkRecord> {
        vec![
            BenchmarkRecord {
                language: "rust".to_string(),
                backend: "simbench-ngram".to_string(),
                benchmark: BenchmarkKind::Insert,
                parameters: GridPoint::new(vec![(NGRAM_SIZE.to_string(), ParamValue::Integer(2))]),
                stats: Stats {
                    mean: 10.0,
                    stddev: 1.0,
                    iterations: 100,
                },
            },
            BenchmarkRecord {
                language: "rust".to_string(),
                backend: "simbench-ngram".to_string(),
                benchmark: BenchmarkKind::Search,
                parameters: GridPoint::new(vec![
                    (NGRAM_SIZE.to_string(), ParamValue::Integer(2)),
                    (THRESHOLD.to_string(), ParamValue::Float(0.8)),
                ]),
                stats: Stats {
                    mean: 2.5,
                    stddev: 0.5,
                    iterations: 7,
                },
            },
        ]
    }

    #[test]
    fn test_create_batch() {
        let batch = ParquetExporter::create_batch(&records()).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 7);
        assert_eq!(batch.schema(), ResultSchema::get());
    }

    #[test]
    fn test_parquet_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.parquet");

        ParquetExporter::write_file(&path, &records()).unwrap();

        let batches = ParquetExporter::read_batches(&path).unwrap();
        assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 2);

        assert_eq!(ParquetExporter::read_records(&path).unwrap(), records());
    }

    #[test]
    fn test_unknown_kind() {
        assert!(parse_kind("delete").is_err());
    }
}
