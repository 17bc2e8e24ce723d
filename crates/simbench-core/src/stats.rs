//! Summary statistics over timing samples
//!
//! The standard deviation is the population form: the sum of squared
//! deviations divided by `n`, not `n - 1`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{Error, Result};

/// Mean, standard deviation and sample count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    pub stddev: f64,
    pub iterations: usize,
}

impl Stats {
    /// Summarize raw samples; fails on an empty slice
    pub fn from_samples(samples: &[f64]) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::EmptySample);
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples
            .iter()
            .map(|x| {
                let d = x - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        Ok(Self {
            mean,
            stddev: variance.sqrt(),
            iterations: samples.len(),
        })
    }

    /// Summarize durations, reported in milliseconds
    pub fn from_durations(samples: &[Duration]) -> Result<Self> {
        let millis: Vec<f64> = samples.iter().map(|d| d.as_secs_f64() * 1000.0).collect();
        Self::from_samples(&millis)
    }
}
