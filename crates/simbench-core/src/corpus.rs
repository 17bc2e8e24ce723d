//! Workload corpus
//!
//! The corpus is an ordered list of text records, loaded once per run and
//! read-only afterwards. Order is kept exactly as read and duplicates are
//! not removed, since insert order can matter to some backends.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{info, warn};

use crate::config::CorpusSource;
use crate::{Error, Result};

/// Ordered, immutable set of workload records
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    records: Vec<String>,
}

impl Corpus {
    /// Build a corpus from in-memory records; fails when empty
    pub fn from_records(records: Vec<String>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::config("corpus contains no records"));
        }
        Ok(Self { records })
    }

    /// Read one record per line from a reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let records = reader.lines().collect::<io::Result<Vec<String>>>()?;

        let blank = records.iter().filter(|r| r.is_empty()).count();
        if blank > 0 && blank == records.len() {
            return Err(Error::config("corpus contains no non-blank records"));
        }
        if blank > 0 {
            warn!(blank, "corpus contains blank records");
        }

        Self::from_records(records)
    }

    /// Load a line-oriented text file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                Error::config(format!("corpus file not found: {}", path.display()))
            }
            _ => Error::Io(e),
        })?;

        let corpus = Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            Error::Configuration(msg) => Error::config(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

        info!(path = %path.display(), records = corpus.len(), "loaded corpus");
        Ok(corpus)
    }

    /// Generate `count` company-style names from a fixed seed
    ///
    /// The same `(count, seed)` pair always yields the same corpus.
    pub fn synthetic(count: usize, seed: u64) -> Result<Self> {
        const STEMS: &[&str] = &[
            "Acme", "Apex", "Blue", "Bright", "Cedar", "Crown", "Delta", "Eagle", "Falcon",
            "Global", "Granite", "Harbor", "Iron", "Lake", "Maple", "North", "Omni", "Pacific",
            "Pioneer", "Quantum", "River", "Silver", "Summit", "Union", "Vertex", "Western",
        ];
        const TRADES: &[&str] = &[
            "Analytics", "Bakery", "Capital", "Chemicals", "Consulting", "Energy", "Foods",
            "Freight", "Health", "Insurance", "Logistics", "Media", "Motors", "Partners",
            "Pharma", "Realty", "Software", "Steel", "Systems", "Textiles",
        ];
        const SUFFIXES: &[&str] = &["Inc", "LLC", "Ltd", "Corp", "Group", "Holdings", "GmbH", "SA"];

        let mut rng = StdRng::seed_from_u64(seed);
        let records = (0..count)
            .map(|_| {
                let stem = STEMS.choose(&mut rng).copied().unwrap_or("Acme");
                let trade = TRADES.choose(&mut rng).copied().unwrap_or("Systems");
                let suffix = SUFFIXES.choose(&mut rng).copied().unwrap_or("Inc");
                if rng.gen_bool(0.3) {
                    let second = STEMS.choose(&mut rng).copied().unwrap_or("Union");
                    format!("{} {} {} {}", stem, second, trade, suffix)
                } else {
                    format!("{} {} {}", stem, trade, suffix)
                }
            })
            .collect();

        Self::from_records(records)
    }

    /// Resolve the configured workload
    pub fn from_source(source: &CorpusSource) -> Result<Self> {
        match source {
            CorpusSource::File { path } => Self::load(path),
            CorpusSource::Synthetic { count, seed } => {
                let corpus = Self::synthetic(*count, *seed)?;
                info!(records = corpus.len(), seed, "generated synthetic corpus");
                Ok(corpus)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a constructed corpus
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[String] {
        &self.records
    }

    /// The first `n` records, used as search queries
    pub fn head(&self, n: usize) -> &[String] {
        &self.records[..n.min(self.records.len())]
    }
}
