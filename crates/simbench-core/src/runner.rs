//! Time-boxed trial runner
//!
//! Executes a trial body repeatedly and records the elapsed time of each
//! execution. Sampling stops at whichever bound is hit first:
//! - the time budget, measured from the first execution
//! - the iteration cap
//!
//! The bounds are only checked between executions, so at least one sample is
//! always taken and the final execution may overshoot the budget.

use std::hint::black_box;
use std::time::Duration;

use tracing::debug;

use crate::clock::Clock;
use crate::{Error, Result};

/// Failure raised while sampling
#[derive(Debug)]
pub enum TrialError<E> {
    /// The untimed setup step failed
    Setup(E),
    /// The timed body failed
    Body(E),
}

/// Dual-bound sampling loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialRunner {
    time_budget: Duration,
    max_iterations: usize,
}

impl TrialRunner {
    /// Create a runner; `max_iterations` must be at least one
    pub fn new(time_budget: Duration, max_iterations: usize) -> Result<Self> {
        if max_iterations == 0 {
            return Err(Error::config("max_iterations must be at least 1"));
        }
        Ok(Self {
            time_budget,
            max_iterations,
        })
    }

    pub fn time_budget(&self) -> Duration {
        self.time_budget
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Time `body` until a bound is reached
    ///
    /// The first error aborts sampling and is returned as-is.
    pub fn run<C, E, F>(&self, clock: &C, mut body: F) -> std::result::Result<Vec<Duration>, E>
    where
        C: Clock + ?Sized,
        F: FnMut() -> std::result::Result<(), E>,
    {
        self.run_with_setup(clock, || Ok(()), |()| body())
            .map_err(|e| match e {
                TrialError::Setup(e) | TrialError::Body(e) => e,
            })
    }

    /// Time `body` with a fresh input from `setup` for every execution
    ///
    /// Only `body` is timed. Setup time and dropping the body's output are
    /// excluded from the samples but still count against the budget.
    pub fn run_with_setup<C, E, I, O, S, F>(
        &self,
        clock: &C,
        mut setup: S,
        mut body: F,
    ) -> std::result::Result<Vec<Duration>, TrialError<E>>
    where
        C: Clock + ?Sized,
        S: FnMut() -> std::result::Result<I, E>,
        F: FnMut(I) -> std::result::Result<O, E>,
    {
        let mut samples = Vec::with_capacity(self.max_iterations.min(1024));
        let start = clock.now();

        loop {
            let input = setup().map_err(TrialError::Setup)?;

            let t0 = clock.now();
            let output = body(black_box(input)).map_err(TrialError::Body)?;
            let elapsed = clock.now().saturating_sub(t0);

            drop(black_box(output));
            samples.push(elapsed);

            if samples.len() >= self.max_iterations {
                break;
            }
            if clock.now().saturating_sub(start) >= self.time_budget {
                break;
            }
        }

        debug!(
            samples = samples.len(),
            wall_ms = clock.now().saturating_sub(start).as_secs_f64() * 1000.0,
            "sampling finished"
        );

        Ok(samples)
    }
}
