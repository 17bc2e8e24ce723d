//! Character n-gram index with cosine ranking
//!
//! Follows the SimString approach: records are bucketed by feature count,
//! each bucket keeps an inverted list from feature to record ids, and a
//! query only visits the buckets whose size can possibly reach the
//! threshold.

use anyhow::{bail, ensure};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::{Backend, BackendFactory, SearchResult};

/// Slack for float rounding in size and overlap bounds
const EPSILON: f64 = 1e-9;

/// An n-gram plus its occurrence number within one string
type Feature = (String, u32);

/// Configuration for the n-gram index
#[derive(Debug, Clone, PartialEq)]
pub struct NgramConfig {
    /// Characters per n-gram
    pub n: usize,
    /// Padding character added `n - 1` times on both ends
    pub pad: char,
}

impl Default for NgramConfig {
    fn default() -> Self {
        Self { n: 3, pad: ' ' }
    }
}

/// In-memory n-gram index
#[derive(Debug, Clone)]
pub struct NgramIndex {
    config: NgramConfig,
    records: Vec<String>,
    /// feature count -> feature -> record ids
    buckets: HashMap<usize, HashMap<Feature, Vec<u64>>>,
    max_size: usize,
}

impl NgramIndex {
    /// Create an empty index
    pub fn new(config: NgramConfig) -> anyhow::Result<Self> {
        ensure!(config.n > 0, "n-gram size must be at least 1");
        Ok(Self {
            config,
            records: Vec::new(),
            buckets: HashMap::new(),
            max_size: 0,
        })
    }

    /// Create with the default padding
    pub fn with_ngram_size(n: usize) -> anyhow::Result<Self> {
        Self::new(NgramConfig {
            n,
            ..Default::default()
        })
    }

    /// Padded n-grams, made unique by occurrence number
    pub fn features(&self, text: &str) -> Vec<Feature> {
        let n = self.config.n;
        let pad = n - 1;

        let mut chars = Vec::with_capacity(text.len() + 2 * pad);
        chars.extend(std::iter::repeat(self.config.pad).take(pad));
        chars.extend(text.chars());
        chars.extend(std::iter::repeat(self.config.pad).take(pad));

        if chars.len() < n {
            return Vec::new();
        }

        let mut seen: HashMap<String, u32> = HashMap::new();
        chars
            .windows(n)
            .map(|w| {
                let gram: String = w.iter().collect();
                let count = seen.entry(gram.clone()).or_insert(0);
                *count += 1;
                (gram, *count)
            })
            .collect()
    }

    /// Add a single record
    pub fn insert(&mut self, record: &str) {
        let id = self.records.len() as u64;
        let features = self.features(record);
        let size = features.len();

        let bucket = self.buckets.entry(size).or_default();
        for feature in features {
            bucket.entry(feature).or_default().push(id);
        }

        self.max_size = self.max_size.max(size);
        self.records.push(record.to_string());
    }

    /// Get a record by id
    pub fn get(&self, id: u64) -> Option<&str> {
        self.records.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ngram_size(&self) -> usize {
        self.config.n
    }
}

impl Backend for NgramIndex {
    fn insert_all(&mut self, records: &[String]) -> anyhow::Result<()> {
        for record in records {
            self.insert(record);
        }
        Ok(())
    }

    fn search(&self, query: &str, threshold: f64) -> anyhow::Result<Vec<SearchResult>> {
        if !(0.0..=1.0).contains(&threshold) {
            bail!("threshold {} outside [0, 1]", threshold);
        }

        let features = self.features(query);
        let q = features.len();
        if q == 0 {
            return Ok(Vec::new());
        }

        let alpha2 = threshold * threshold;
        let min_size = ((alpha2 * q as f64 - EPSILON).ceil() as usize).max(1);
        let max_size = if threshold == 0.0 {
            self.max_size
        } else {
            ((q as f64 / alpha2 + EPSILON).floor() as usize).min(self.max_size)
        };

        let mut results = Vec::new();
        let mut overlaps: HashMap<u64, usize> = HashMap::new();

        for size in min_size..=max_size {
            let Some(bucket) = self.buckets.get(&size) else {
                continue;
            };

            let norm = ((q * size) as f64).sqrt();
            let min_overlap = ((threshold * norm - EPSILON).ceil() as usize).max(1);

            overlaps.clear();
            for feature in &features {
                if let Some(ids) = bucket.get(feature) {
                    for id in ids {
                        *overlaps.entry(*id).or_insert(0) += 1;
                    }
                }
            }

            results.extend(
                overlaps
                    .iter()
                    .filter(|(_, &overlap)| overlap >= min_overlap)
                    .map(|(&id, &overlap)| SearchResult::new(id, overlap as f64 / norm)),
            );
        }

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        Ok(results)
    }
}

/// Factory for [`NgramIndex`] instances
#[derive(Debug, Clone)]
pub struct NgramBackendFactory {
    name: String,
    pad: char,
}

impl NgramBackendFactory {
    pub fn new() -> Self {
        Self {
            name: "simbench-ngram".to_string(),
            pad: ' ',
        }
    }

    /// Override the backend tag written into result records
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for NgramBackendFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendFactory for NgramBackendFactory {
    type Backend = NgramIndex;

    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self, ngram_size: usize) -> anyhow::Result<NgramIndex> {
        NgramIndex::new(NgramConfig {
            n: ngram_size,
            pad: self.pad,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(n: usize, records: &[&str]) -> NgramIndex {
        let mut index = NgramIndex::with_ngram_size(n).unwrap();
        let owned: Vec<String> = records.iter().map(|s| s.to_string()).collect();
        index.insert_all(&owned).unwrap();
        index
    }

    #[test]
    fn test_zero_ngram_size_rejected() {
        assert!(NgramIndex::with_ngram_size(0).is_err());
    }

    #[test]
    fn test_features_padded() {
        let index = NgramIndex::with_ngram_size(2).unwrap();
        let grams: Vec<String> = index.features("abc").into_iter().map(|(g, _)| g).collect();
        assert_eq!(grams, vec![" a", "ab", "bc", "c "]);
    }

    #[test]
    fn test_repeated_ngrams_are_numbered() {
        let index = NgramIndex::with_ngram_size(1).unwrap();
        let features = index.features("aab");
        assert_eq!(
            features,
            vec![
                ("a".to_string(), 1),
                ("a".to_string(), 2),
                ("b".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_search_ranks_exact_match_first() {
        let index = index(2, &["abd", "abc", "xyz"]);

        let results = index.search("abc", 0.4).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, 1);
        assert!((results[0].score - 1.0).abs() < 1e-9);
        assert_eq!(results[1].id, 0);
        assert!((results[1].score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_filters() {
        let index = index(2, &["abd", "abc", "xyz"]);

        let results = index.search("abc", 0.6).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(index.get(results[0].id), Some("abc"));
    }

    #[test]
    fn test_invalid_threshold() {
        let index = index(3, &["abc"]);
        assert!(index.search("abc", 1.5).is_err());
        assert!(index.search("abc", -0.1).is_err());
    }

    #[test]
    fn test_empty_index_returns_nothing() {
        let index = NgramIndex::with_ngram_size(3).unwrap();
        assert!(index.is_empty());
        assert!(index.search("anything", 0.5).unwrap().is_empty());
    }

    #[test]
    fn test_search_is_repeatable() {
        let index = index(3, &["Acme Corp", "Acme Corporation", "Globex"]);
        let first = index.search("Acme Corp", 0.5).unwrap();
        let second = index.search("Acme Corp", 0.5).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_factory_builds_fresh_index() {
        let factory = NgramBackendFactory::new();
        assert_eq!(factory.name(), "simbench-ngram");

        let backend = factory.create(4).unwrap();
        assert!(backend.is_empty());
        assert_eq!(backend.ngram_size(), 4);

        let renamed = NgramBackendFactory::new().with_name("custom");
        assert_eq!(renamed.name(), "custom");
    }
}
