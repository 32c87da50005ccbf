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

//! Isolation forest: many randomized trees, one averaged score per value.
//!
//! Trees are built and values are scored with rayon on whatever pool is
//! installed by the caller. Each tree draws from its own indexed stream and
//! per-value sums always run over trees in ordinal order, so the output does
//! not depend on the number of worker threads.

use crate::anomaly::cancel::CancelToken;
use crate::anomaly::path_length::average_path_length;
use crate::anomaly::sampler::Sampler;
use crate::anomaly::tree::{depth_limit, IsolationTree};
use crate::error::{DetectError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Number of trees when nothing else is configured
pub const DEFAULT_TREES: usize = 100;

/// Subsample cap per tree when nothing else is configured
pub const DEFAULT_MAX_SAMPLES: usize = 256;

/// Engine tunables beyond contamination and seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_samples: usize,
    /// Size of the worker pool, `None` uses rayon's global pool
    pub workers: Option<usize>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_TREES,
            max_samples: DEFAULT_MAX_SAMPLES,
            workers: None,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(DetectError::InvalidParameter(
                "n_trees must be at least 1".to_string(),
            ));
        }
        if self.max_samples < 2 {
            return Err(DetectError::InvalidParameter(format!(
                "max_samples must be at least 2, got {}",
                self.max_samples
            )));
        }
        if self.workers == Some(0) {
            return Err(DetectError::InvalidParameter(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
    /// `c(m)` for the subsample size, the score normaliser
    normaliser: f64,
}

impl IsolationForest {
    /// Build `config.n_trees` trees over `values`.
    ///
    /// `cancel` is checked before each tree; once set, no further trees are
    /// started and `DetectError::Cancelled` is returned.
    pub fn fit(
        values: &[f64],
        config: &ForestConfig,
        seed: u64,
        cancel: Option<&CancelToken>,
    ) -> Result<Self> {
        profiling::scope!("IsolationForest::fit");

        config.validate()?;
        let sampler = Sampler::new(values.len(), config.max_samples, seed)?;
        let sample_size = sampler.sample_size();
        let max_depth = depth_limit(sample_size);
        let requested = config.n_trees;

        tracing::debug!(
            "Fitting isolation forest: {} trees, subsample {}, depth limit {}, workers {:?}",
            requested,
            sample_size,
            max_depth,
            config.workers
        );

        let built = AtomicUsize::new(0);
        let trees = (0..requested)
            .into_par_iter()
            .map(|tree_index| {
                if cancel.is_some_and(CancelToken::is_cancelled) {
                    return Err(DetectError::Cancelled {
                        built: built.load(Ordering::Relaxed),
                        requested,
                    });
                }

                let (indices, mut rng) = sampler.draw(tree_index);
                let mut subsample: Vec<f64> = indices.iter().map(|&i| values[i]).collect();
                let tree = IsolationTree::build(&mut subsample, max_depth, &mut rng);

                tracing::trace!(
                    "Tree {} built: {} nodes, height {}",
                    tree_index,
                    tree.node_count(),
                    tree.height()
                );
                built.fetch_add(1, Ordering::Relaxed);
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            trees,
            sample_size,
            normaliser: average_path_length(sample_size),
        })
    }

    #[must_use]
    pub fn trees(&self) -> &[IsolationTree] {
        &self.trees
    }

    #[must_use]
    pub const fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Mean adjusted path length `E[h(v)]` across all trees.
    #[must_use]
    pub fn mean_path_length(&self, value: f64) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.path_length(value)).sum();
        total / self.trees.len() as f64
    }

    /// Anomaly score `s(v) = 2^(-E[h(v)] / c(m))`, in `[0, 1]`.
    #[must_use]
    pub fn score(&self, value: f64) -> f64 {
        let score = (-self.mean_path_length(value) / self.normaliser).exp2();
        score.clamp(0.0, 1.0)
    }

    /// Score every value, preserving input order.
    #[must_use]
    pub fn score_all(&self, values: &[f64]) -> Vec<f64> {
        profiling::scope!("IsolationForest::score_all");
        values.par_iter().map(|&value| self.score(value)).collect()
    }
}
