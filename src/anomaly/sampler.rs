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

//! Seeded subsampling for tree construction.
//!
//! Every tree gets its own `ChaCha8` stream, addressed by the run seed and the
//! tree's ordinal. Building tree 57 therefore yields the same subsample and the
//! same split values whether it runs first, last or on another thread.

use crate::error::{DetectError, Result};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Draws per-tree subsamples of dataset indices without replacement.
#[derive(Debug, Clone, Copy)]
pub struct Sampler {
    seed: u64,
    population: usize,
    sample_size: usize,
}

impl Sampler {
    /// Create a sampler over `population` indices, capping each draw at `max_samples`.
    pub fn new(population: usize, max_samples: usize, seed: u64) -> Result<Self> {
        if population < 2 {
            return Err(DetectError::InsufficientData {
                needed: 2,
                got: population,
            });
        }
        if max_samples < 2 {
            return Err(DetectError::InvalidParameter(format!(
                "max_samples must be at least 2, got {max_samples}"
            )));
        }

        Ok(Self {
            seed,
            population,
            sample_size: population.min(max_samples),
        })
    }

    /// Number of indices in every draw (`m = min(max_samples, n)`)
    #[must_use]
    pub const fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Random stream reserved for the tree with the given ordinal.
    #[must_use]
    pub fn stream(&self, tree_index: usize) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(tree_index as u64);
        rng
    }

    /// Draw the subsample for one tree.
    ///
    /// Returns the sorted indices together with the stream positioned right
    /// after the draw, so split selection continues on the same sequence.
    #[must_use]
    pub fn draw(&self, tree_index: usize) -> (Vec<usize>, ChaCha8Rng) {
        let mut rng = self.stream(tree_index);
        let mut indices = index::sample(&mut rng, self.population, self.sample_size).into_vec();
        indices.sort_unstable();
        (indices, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_rejects_tiny_population() {
        assert_eq!(
            Sampler::new(1, 256, 7).unwrap_err(),
            DetectError::InsufficientData { needed: 2, got: 1 }
        );
        assert!(Sampler::new(0, 256, 7).is_err());
    }

    #[test]
    fn test_sample_size_is_capped() {
        assert_eq!(Sampler::new(20, 256, 1).unwrap().sample_size(), 20);
        assert_eq!(Sampler::new(1000, 256, 1).unwrap().sample_size(), 256);
    }

    #[test]
    fn test_draw_without_replacement() {
        let sampler = Sampler::new(1000, 256, 42).unwrap();
        let (indices, _) = sampler.draw(3);
        assert_eq!(indices.len(), 256);
        assert!(indices.windows(2).all(|w| w[0] < w[1]), "sorted and unique");
        assert!(indices.iter().all(|&i| i < 1000));
    }

    #[test]
    fn test_draws_are_reproducible() {
        let sampler = Sampler::new(500, 64, 42).unwrap();
        let (a, mut rng_a) = sampler.draw(9);
        let (b, mut rng_b) = sampler.draw(9);
        assert_eq!(a, b);
        assert_eq!(rng_a.gen::<u64>(), rng_b.gen::<u64>());
    }

    #[test]
    fn test_trees_get_independent_streams() {
        let sampler = Sampler::new(500, 64, 42).unwrap();
        let (first, _) = sampler.draw(0);
        let (second, _) = sampler.draw(1);
        assert_ne!(first, second);

        let other_seed = Sampler::new(500, 64, 43).unwrap();
        assert_ne!(first, other_seed.draw(0).0);
    }

    #[test]
    fn test_draw_order_does_not_matter() {
        let sampler = Sampler::new(300, 32, 5).unwrap();
        let forward: Vec<_> = (0..10).map(|i| sampler.draw(i).0).collect();
        let mut backward: Vec<_> = (0..10).rev().map(|i| sampler.draw(i).0).collect();
        backward.reverse();
        assert_eq!(forward, backward);
    }
}
