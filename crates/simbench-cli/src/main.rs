//! simbench - cross-implementation benchmark harness for approximate string matching
//!
//! With no arguments, runs the default insert and search sweeps over
//! `benches/data/company_names.txt` and prints the JSON result document to
//! stdout. Logs go to stderr.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use simbench_core::backend::{BackendFactory, NgramBackendFactory};
use simbench_core::storage::{self, OutputSink, ParquetExporter};
use simbench_core::{report, BenchmarkKind, Corpus, CorpusSource, Harness, HarnessConfig};

const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Parser)]
#[command(name = "simbench", version, about = "Approximate string matching benchmark harness")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge result documents and render comparison tables
    Compare {
        /// JSON or Parquet result documents, merged in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write Markdown here instead of stdout
        #[arg(long)]
        markdown: Option<PathBuf>,
    },
}

#[derive(Debug, Default, clap::Args)]
struct RunArgs {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Corpus file, one record per line
    #[arg(long, conflicts_with = "synthetic")]
    corpus: Option<PathBuf>,

    /// Generate this many synthetic records instead of reading a file
    #[arg(long)]
    synthetic: Option<usize>,

    /// Seed for the synthetic corpus [default: 42]
    #[arg(long, requires = "synthetic")]
    seed: Option<u64>,

    /// JSON result document path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also export results as Parquet
    #[arg(long)]
    parquet: Option<PathBuf>,

    #[arg(long, value_delimiter = ',')]
    ngram_sizes: Option<Vec<usize>>,

    #[arg(long, value_delimiter = ',')]
    thresholds: Option<Vec<f64>>,

    /// Per grid point budget, in seconds
    #[arg(long)]
    time_budget: Option<f64>,

    #[arg(long)]
    max_iterations: Option<usize>,

    /// Number of leading corpus records used as search queries
    #[arg(long)]
    queries: Option<usize>,

    /// Run a single benchmark
    #[arg(long, value_enum)]
    only: Option<OnlyArg>,

    #[arg(long)]
    language: Option<String>,

    #[arg(long)]
    backend_name: Option<String>,

    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    /// Print comparison tables to stderr after the run
    #[arg(long)]
    summary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OnlyArg {
    Insert,
    Search,
}

impl From<OnlyArg> for BenchmarkKind {
    fn from(arg: OnlyArg) -> Self {
        match arg {
            OnlyArg::Insert => BenchmarkKind::Insert,
            OnlyArg::Search => BenchmarkKind::Search,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

impl RunArgs {
    /// Layer command line flags over the loaded configuration
    fn apply(&self, config: &mut HarnessConfig) {
        if let Some(path) = &self.corpus {
            config.corpus = CorpusSource::File { path: path.clone() };
        }
        if let Some(count) = self.synthetic {
            config.corpus = CorpusSource::Synthetic {
                count,
                seed: self.seed.unwrap_or(DEFAULT_SEED),
            };
        }
        if let Some(path) = &self.output {
            config.output = Some(path.clone());
        }
        if let Some(path) = &self.parquet {
            config.parquet = Some(path.clone());
        }
        if let Some(sizes) = &self.ngram_sizes {
            config.ngram_sizes = sizes.clone();
        }
        if let Some(thresholds) = &self.thresholds {
            config.thresholds = thresholds.clone();
        }
        if let Some(secs) = self.time_budget {
            config.time_budget_secs = secs;
        }
        if let Some(n) = self.max_iterations {
            config.max_iterations = n;
        }
        if let Some(n) = self.queries {
            config.query_count = n;
        }
        if let Some(only) = self.only {
            config.benchmarks = vec![only.into()];
        }
        if let Some(language) = &self.language {
            config.language = language.clone();
        }
        if let Some(name) = &self.backend_name {
            config.backend_name = Some(name.clone());
        }
        if let Some(format) = self.log_format {
            config.logging.format = format.as_str().to_string();
        }
    }
}

/// Initialize the subscriber on stderr, so stdout stays a clean document.
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn run_benchmarks(config: &HarnessConfig, summary: bool) -> anyhow::Result<()> {
    let corpus = Corpus::from_source(&config.corpus)?;
    let harness = Harness::new(config)?;
    let factory = NgramBackendFactory::new();
    info!(backend = factory.name(), "using reference backend");

    let records = harness.run(&corpus, &factory)?;

    let sink = config
        .output
        .clone()
        .map(OutputSink::File)
        .unwrap_or_default();
    sink.write(&records)?;

    if let Some(path) = &config.parquet {
        ParquetExporter::write_file(path, &records)?;
    }

    if summary {
        eprint!("{}", report::terminal(&records));
    }

    Ok(())
}

fn compare(files: &[PathBuf], markdown: Option<&Path>) -> anyhow::Result<()> {
    let records = storage::merge_documents(files)?;
    let rendered = report::markdown(&records);

    match markdown {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), records = records.len(), "comparison written");
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Full error chain, printed even when logging is filtered out
fn failure_message(err: &anyhow::Error) -> String {
    format!("Error: {:#}", err)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match HarnessConfig::load(cli.run.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.run.apply(&mut config);

    init_logging(&config.logging.level, &config.logging.format);

    let result = match &cli.command {
        Some(Command::Compare { files, markdown }) => compare(files, markdown.as_deref()),
        None => run_benchmarks(&config, cli.run.summary),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{}", failure_message(&e));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simbench_core::record;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("simbench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_arguments_keeps_defaults() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());

        let mut config = HarnessConfig::default();
        cli.run.apply(&mut config);
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&[
            "--synthetic",
            "50",
            "--seed",
            "7",
            "--ngram-sizes",
            "3",
            "--thresholds",
            "0.5,0.75",
            "--time-budget",
            "0.5",
            "--max-iterations",
            "5",
            "--queries",
            "10",
            "--only",
            "search",
            "--language",
            "rust-nightly",
            "--log-format",
            "json",
        ]);

        let mut config = HarnessConfig::default();
        cli.run.apply(&mut config);

        assert_eq!(config.corpus, CorpusSource::Synthetic { count: 50, seed: 7 });
        assert_eq!(config.ngram_sizes, vec![3]);
        assert_eq!(config.thresholds, vec![0.5, 0.75]);
        assert_eq!(config.time_budget_secs, 0.5);
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.query_count, 10);
        assert_eq!(config.benchmarks, vec![BenchmarkKind::Search]);
        assert_eq!(config.language, "rust-nightly");
        assert_eq!(config.logging.format, "json");
        config.validate().unwrap();
    }

    #[test]
    fn test_corpus_and_synthetic_conflict() {
        let result = Cli::try_parse_from(["simbench", "--corpus", "a.txt", "--synthetic", "5"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_compare_requires_files() {
        assert!(Cli::try_parse_from(["simbench", "compare"]).is_err());

        let cli = parse(&["compare", "a.json", "b.parquet", "--markdown", "out.md"]);
        match cli.command {
            Some(Command::Compare { files, markdown }) => {
                assert_eq!(files, vec![PathBuf::from("a.json"), PathBuf::from("b.parquet")]);
                assert_eq!(markdown, Some(PathBuf::from("out.md")));
            }
            None => panic!("expected compare subcommand"),
        }
    }

    #[test]
    fn test_failure_message_names_point() {
        let config = HarnessConfig {
            corpus: CorpusSource::File {
                path: PathBuf::from("/nonexistent/names.txt"),
            },
            ..Default::default()
        };
        let err = run_benchmarks(&config, false).unwrap_err();
        let message = failure_message(&err);
        assert!(message.starts_with("Error: "));
        assert!(message.contains("names.txt"));

        let err = anyhow::Error::new(simbench_core::Error::TrialExecution {
            benchmark: BenchmarkKind::Insert,
            parameters: simbench_core::GridPoint::new(vec![(
                "ngram_size".to_string(),
                simbench_core::ParamValue::Integer(2),
            )]),
            source: anyhow::anyhow!("disk full"),
        });
        let message = failure_message(&err);
        assert!(message.contains("insert"));
        assert!(message.contains("ngram_size=2"));
        assert!(message.contains("disk full"));
    }

    #[test]
    fn test_run_then_compare() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("rust.json");
        let parquet = dir.path().join("rust.parquet");
        let markdown = dir.path().join("report.md");

        let config = HarnessConfig {
            corpus: CorpusSource::Synthetic { count: 30, seed: 1 },
            ngram_sizes: vec![2],
            thresholds: vec![0.8],
            time_budget_secs: 60.0,
            max_iterations: 2,
            query_count: 5,
            output: Some(output.clone()),
            parquet: Some(parquet.clone()),
            ..Default::default()
        };
        run_benchmarks(&config, false).unwrap();

        let written = record::from_json(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|r| r.stats.iterations == 2));

        compare(&[output, parquet], Some(&markdown)).unwrap();
        let md = fs::read_to_string(&markdown).unwrap();
        assert!(md.contains("### Insert Benchmark"));
        assert!(md.contains("### Search Benchmark"));
        assert!(md.contains("simbench-ngram"));
    }
}
