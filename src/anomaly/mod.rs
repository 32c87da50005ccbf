// DataGuard - GPL-3.0-or-later
// This file is part of DataGuard.
//
// Copyright (C) 2025 Daniel Freiermuth
//
// DataGuard is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// DataGuard is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with DataGuard.  If not, see <https://www.gnu.org/licenses/>.

//! Isolation-forest anomaly engine.
//!
//! [`detect`] is the single entry point: observations, a contamination
//! fraction and a seed go in, one `(score, flag)` pair per observation comes
//! out in input order. Nothing is kept between calls.

pub mod cancel;
pub mod forest;
pub mod path_length;
pub mod sampler;
pub mod threshold;
pub mod tree;

pub use cancel::CancelToken;
pub use forest::{ForestConfig, IsolationForest, DEFAULT_MAX_SAMPLES, DEFAULT_TREES};

use crate::error::{DetectError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Minimum number of observations the forest can work with
pub const MIN_OBSERVATIONS: usize = 2;

/// One value of the series, with the row it came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub value: f64,
    pub timestamp: Option<NaiveDate>,
    /// Caller's identifier, usually the original row index
    pub id: usize,
}

impl Observation {
    #[must_use]
    pub const fn new(value: f64, id: usize) -> Self {
        Self {
            value,
            timestamp: None,
            id,
        }
    }

    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: NaiveDate) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Score and flag for one observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// In `[0, 1]`, higher is more anomalous, 0.5 means no signal
    pub score: f64,
    pub anomaly: bool,
}

/// Full result of one detection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRun {
    /// Aligned one-to-one with the input observations
    pub detections: Vec<Detection>,
    /// Score of the lowest-ranked flagged observation
    pub threshold: Option<f64>,
    pub flagged: usize,
}

impl DetectionRun {
    const fn empty() -> Self {
        Self {
            detections: Vec::new(),
            threshold: None,
            flagged: 0,
        }
    }
}

/// Fits a fresh forest per call with a fixed engine configuration.
#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: ForestConfig,
}

impl Detector {
    #[must_use]
    pub const fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Score and flag every observation.
    pub fn detect(
        &self,
        observations: &[Observation],
        contamination: f64,
        seed: u64,
    ) -> Result<Vec<Detection>> {
        self.run(observations, contamination, seed, None)
            .map(|run| run.detections)
    }

    /// Like [`Detector::detect`], stopping between tree builds once `cancel` is set.
    pub fn detect_with_cancel(
        &self,
        observations: &[Observation],
        contamination: f64,
        seed: u64,
        cancel: &CancelToken,
    ) -> Result<Vec<Detection>> {
        self.run(observations, contamination, seed, Some(cancel))
            .map(|run| run.detections)
    }

    /// Fit, score and threshold, keeping the cutoff alongside the detections.
    pub fn run(
        &self,
        observations: &[Observation],
        contamination: f64,
        seed: u64,
        cancel: Option<&CancelToken>,
    ) -> Result<DetectionRun> {
        profiling::scope!("Detector::run");

        // Everything is validated before any tree is built
        self.config.validate()?;
        threshold::validate_contamination(contamination)?;

        if observations.is_empty() {
            tracing::debug!("Empty dataset, nothing to score");
            return Ok(DetectionRun::empty());
        }
        if observations.len() < MIN_OBSERVATIONS {
            return Err(DetectError::InsufficientData {
                needed: MIN_OBSERVATIONS,
                got: observations.len(),
            });
        }
        if let Some((index, obs)) = observations
            .iter()
            .enumerate()
            .find(|(_, obs)| !obs.value.is_finite())
        {
            return Err(DetectError::InvalidValue {
                index,
                value: obs.value,
            });
        }

        let values: Vec<f64> = observations.iter().map(|obs| obs.value).collect();
        let scores = self.in_pool(|| {
            let forest = IsolationForest::fit(&values, &self.config, seed, cancel)?;
            Ok(forest.score_all(&values))
        })?;

        let thresholded = threshold::apply(&scores, contamination)?;
        let detections = scores
            .iter()
            .zip(&thresholded.flags)
            .map(|(&score, &anomaly)| Detection { score, anomaly })
            .collect();

        tracing::info!(
            "Scored {} observations, {} flagged as anomalous",
            observations.len(),
            thresholded.flagged
        );

        Ok(DetectionRun {
            detections,
            threshold: thresholded.threshold,
            flagged: thresholded.flagged,
        })
    }

    /// Run `work` on a dedicated pool of `workers` threads, or on the global pool.
    fn in_pool<T, F>(&self, work: F) -> Result<T>
    where
        T: Send,
        F: FnOnce() -> Result<T> + Send,
    {
        match self.config.workers {
            Some(workers) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("dataguard-worker-{i}"))
                    .build()
                    .map_err(|e| DetectError::WorkerPool(e.to_string()))?;
                pool.install(work)
            }
            None => work(),
        }
    }
}

/// Score and flag `observations` with the default forest configuration.
pub fn detect(
    observations: &[Observation],
    contamination: f64,
    seed: u64,
) -> Result<Vec<Detection>> {
    Detector::default().detect(observations, contamination, seed)
}

/// Convenience wrapper over [`detect`] for a bare value series.
pub fn detect_values(values: &[f64], contamination: f64, seed: u64) -> Result<Vec<Detection>> {
    let observations: Vec<Observation> = values
        .iter()
        .enumerate()
        .map(|(id, &value)| Observation::new(value, id))
        .collect();
    detect(&observations, contamination, seed)
}
