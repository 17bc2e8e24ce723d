//! Sweep orchestration
//!
//! Runs each selected benchmark over its parameter grid, one grid point at a
//! time, and collects one record per point:
//! - `insert`: grid over `ngram_size`; every sample builds a fresh backend
//!   (untimed) and times the bulk insert of the whole corpus
//! - `search`: grid over `ngram_size` x `threshold`; each point builds and
//!   populates one backend (untimed), then times a pass of every query
//!
//! Any failure aborts the whole run, so a returned result set is always
//! complete.

use std::hint::black_box;

use tracing::{debug, info};

use crate::backend::{Backend, BackendFactory};
use crate::clock::{Clock, MonotonicClock};
use crate::config::HarnessConfig;
use crate::corpus::Corpus;
use crate::grid::{GridPoint, ParameterGrid, NGRAM_SIZE, THRESHOLD};
use crate::record::{BenchmarkKind, BenchmarkRecord, ResultRecorder};
use crate::runner::{TrialError, TrialRunner};
use crate::stats::Stats;
use crate::{Error, Result};

/// Benchmark driver for one configuration
#[derive(Debug)]
pub struct Harness<C = MonotonicClock> {
    runner: TrialRunner,
    language: String,
    backend_name: Option<String>,
    ngram_sizes: Vec<usize>,
    thresholds: Vec<f64>,
    query_count: usize,
    benchmarks: Vec<BenchmarkKind>,
    clock: C,
}

impl Harness<MonotonicClock> {
    /// Build a harness from a validated configuration
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            runner: TrialRunner::new(config.time_budget(), config.max_iterations)?,
            language: config.language.clone(),
            backend_name: config.backend_name.clone(),
            ngram_sizes: config.ngram_sizes.clone(),
            thresholds: config.thresholds.clone(),
            query_count: config.query_count,
            benchmarks: config.benchmarks.clone(),
            clock: MonotonicClock::new(),
        })
    }
}

impl<C: Clock> Harness<C> {
    /// Swap the time source
    pub fn with_clock<D: Clock>(self, clock: D) -> Harness<D> {
        Harness {
            runner: self.runner,
            language: self.language,
            backend_name: self.backend_name,
            ngram_sizes: self.ngram_sizes,
            thresholds: self.thresholds,
            query_count: self.query_count,
            benchmarks: self.benchmarks,
            clock,
        }
    }

    pub fn insert_grid(&self) -> ParameterGrid {
        ParameterGrid::new().with_dimension(NGRAM_SIZE, self.ngram_sizes.iter().copied())
    }

    pub fn search_grid(&self) -> ParameterGrid {
        ParameterGrid::new()
            .with_dimension(NGRAM_SIZE, self.ngram_sizes.iter().copied())
            .with_dimension(THRESHOLD, self.thresholds.iter().copied())
    }

    /// Run every selected benchmark against backends from `factory`
    pub fn run<F: BackendFactory>(
        &self,
        corpus: &Corpus,
        factory: &F,
    ) -> Result<Vec<BenchmarkRecord>> {
        let backend = self.backend_name.as_deref().unwrap_or(factory.name());
        let mut recorder = ResultRecorder::new(&self.language, backend);

        info!(
            language = %self.language,
            backend,
            records = corpus.len(),
            budget_secs = self.runner.time_budget().as_secs_f64(),
            max_iterations = self.runner.max_iterations(),
            "starting benchmark run"
        );

        for kind in &self.benchmarks {
            match kind {
                BenchmarkKind::Insert => self.bench_insert(corpus, factory, &mut recorder)?,
                BenchmarkKind::Search => self.bench_search(corpus, factory, &mut recorder)?,
            }
        }

        info!(results = recorder.len(), "benchmark run complete");
        Ok(recorder.into_records())
    }

    fn bench_insert<F: BackendFactory>(
        &self,
        corpus: &Corpus,
        factory: &F,
        recorder: &mut ResultRecorder,
    ) -> Result<()> {
        let kind = BenchmarkKind::Insert;
        let grid = self.insert_grid();
        info!(benchmark = %kind, points = grid.len(), "sweeping grid");

        for point in grid.points() {
            let ngram_size = ngram_size(&point)?;

            let samples = self
                .runner
                .run_with_setup(
                    &self.clock,
                    || factory.create(ngram_size),
                    |mut backend| {
                        backend.insert_all(corpus.records())?;
                        Ok::<_, anyhow::Error>(backend)
                    },
                )
                .map_err(|e| match e {
                    TrialError::Setup(source) => Error::BackendSetup {
                        benchmark: kind,
                        parameters: point.clone(),
                        source,
                    },
                    TrialError::Body(source) => Error::TrialExecution {
                        benchmark: kind,
                        parameters: point.clone(),
                        source,
                    },
                })?;

            self.finish_point(recorder, kind, point, &samples)?;
        }

        Ok(())
    }

    fn bench_search<F: BackendFactory>(
        &self,
        corpus: &Corpus,
        factory: &F,
        recorder: &mut ResultRecorder,
    ) -> Result<()> {
        let kind = BenchmarkKind::Search;
        let grid = self.search_grid();
        let queries = corpus.head(self.query_count);
        info!(benchmark = %kind, points = grid.len(), queries = queries.len(), "sweeping grid");

        for point in grid.points() {
            let ngram_size = ngram_size(&point)?;
            let threshold = point
                .get(THRESHOLD)
                .map(|v| v.as_f64())
                .ok_or_else(|| Error::config(format!("grid point [{}] lacks {}", point, THRESHOLD)))?;

            let setup_error = |source| Error::BackendSetup {
                benchmark: kind,
                parameters: point.clone(),
                source,
            };
            let mut backend = factory.create(ngram_size).map_err(setup_error)?;
            backend.insert_all(corpus.records()).map_err(setup_error)?;
            debug!(point = %point, "backend populated");

            let samples = self
                .runner
                .run(&self.clock, || {
                    for query in queries {
                        black_box(backend.search(query, threshold)?);
                    }
                    Ok::<(), anyhow::Error>(())
                })
                .map_err(|source| Error::TrialExecution {
                    benchmark: kind,
                    parameters: point.clone(),
                    source,
                })?;
            drop(backend);

            self.finish_point(recorder, kind, point, &samples)?;
        }

        Ok(())
    }

    fn finish_point(
        &self,
        recorder: &mut ResultRecorder,
        kind: BenchmarkKind,
        point: GridPoint,
        samples: &[std::time::Duration],
    ) -> Result<()> {
        let stats = Stats::from_durations(samples)?;
        info!(
            benchmark = %kind,
            point = %point,
            mean_ms = stats.mean,
            stddev_ms = stats.stddev,
            iterations = stats.iterations,
            "grid point measured"
        );
        recorder.record(kind, point, stats);
        Ok(())
    }
}

fn ngram_size(point: &GridPoint) -> Result<usize> {
    point
        .get(NGRAM_SIZE)
        .and_then(|v| v.as_i64())
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| Error::config(format!("grid point [{}] lacks a valid {}", point, NGRAM_SIZE)))
}
