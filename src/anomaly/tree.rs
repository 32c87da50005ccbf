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

//! Isolation tree stored as a flat node arena.
//!
//! Nodes reference their children by index into the arena; the root is always
//! slot 0. Construction uses an explicit work stack instead of recursion and
//! partitions the subsample in place, so a tree owns exactly one `Vec<Node>`.

use crate::anomaly::path_length::average_path_length;
use rand::Rng;

/// Index of a node inside its tree's arena
pub type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    /// Values `< split` go left, everything else goes right
    Internal {
        split: f64,
        left: NodeId,
        right: NodeId,
    },
    /// Leaf remembering how many subsample points ended here and at which depth
    External { size: usize, depth: usize },
}

/// Pending node: arena slot, range of the partition buffer, depth
struct Work {
    slot: NodeId,
    start: usize,
    end: usize,
    depth: usize,
}

/// Depth limit `ceil(log2(m))` for a subsample of size `m`
#[must_use]
pub const fn depth_limit(sample_size: usize) -> usize {
    if sample_size <= 1 {
        0
    } else {
        sample_size.next_power_of_two().trailing_zeros() as usize
    }
}

#[derive(Debug, Clone)]
pub struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    /// Build a tree over `values`, which is reordered in place while partitioning.
    pub fn build<R: Rng + ?Sized>(values: &mut [f64], max_depth: usize, rng: &mut R) -> Self {
        profiling::scope!("IsolationTree::build");

        let mut nodes = vec![Node::External { size: 0, depth: 0 }];
        let mut stack = vec![Work {
            slot: ROOT,
            start: 0,
            end: values.len(),
            depth: 0,
        }];

        while let Some(work) = stack.pop() {
            let size = work.end - work.start;
            let leaf = Node::External {
                size,
                depth: work.depth,
            };

            if size <= 1 || work.depth >= max_depth {
                nodes[work.slot] = leaf;
                continue;
            }

            let segment = &mut values[work.start..work.end];
            let (min, max) = min_max(segment);
            if min >= max {
                // All values identical, nothing left to separate
                nodes[work.slot] = leaf;
                continue;
            }

            let split = draw_split(min, max, rng);
            let pivot = work.start + partition(segment, split);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::External { size: 0, depth: 0 });
            nodes.push(Node::External { size: 0, depth: 0 });
            nodes[work.slot] = Node::Internal { split, left, right };

            // Left subtree is expanded first
            stack.push(Work {
                slot: right,
                start: pivot,
                end: work.end,
                depth: work.depth + 1,
            });
            stack.push(Work {
                slot: left,
                start: work.start,
                end: pivot,
                depth: work.depth + 1,
            });
        }

        Self { nodes }
    }

    /// Adjusted path length `h(v)`: leaf depth plus `c(leaf size)`.
    #[must_use]
    pub fn path_length(&self, value: f64) -> f64 {
        let mut current = ROOT;
        loop {
            match self.nodes[current] {
                Node::Internal { split, left, right } => {
                    current = if value < split { left } else { right };
                }
                Node::External { size, depth } => {
                    return depth as f64 + average_path_length(size);
                }
            }
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest leaf in the tree
    #[must_use]
    pub fn height(&self) -> usize {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::External { depth, .. } => Some(*depth),
                Node::Internal { .. } => None,
            })
            .max()
            .unwrap_or(0)
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Uniform split in `(min, max]`, so the minimum always lands left and the
/// maximum always lands right.
fn draw_split<R: Rng + ?Sized>(min: f64, max: f64, rng: &mut R) -> f64 {
    let t: f64 = rng.gen();
    // Convex combination avoids overflow of `max - min` for huge magnitudes
    let split = (1.0 - t).mul_add(max, t * min);
    if split <= min {
        // Rounding collapsed onto the minimum, e.g. for adjacent floats
        max
    } else {
        split.min(max)
    }
}

/// Move values `< split` to the front; returns how many there are.
fn partition(values: &mut [f64], split: f64) -> usize {
    let mut boundary = 0;
    for i in 0..values.len() {
        if values[i] < split {
            values.swap(i, boundary);
            boundary += 1;
        }
    }
    boundary
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn leaves(tree: &IsolationTree) -> Vec<(usize, usize)> {
        tree.nodes()
            .iter()
            .filter_map(|node| match node {
                Node::External { size, depth } => Some((*size, *depth)),
                Node::Internal { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_depth_limit() {
        assert_eq!(depth_limit(1), 0);
        assert_eq!(depth_limit(2), 1);
        assert_eq!(depth_limit(3), 2);
        assert_eq!(depth_limit(4), 2);
        assert_eq!(depth_limit(20), 5);
        assert_eq!(depth_limit(256), 8);
    }

    #[test]
    fn test_single_point_is_leaf() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tree = IsolationTree::build(&mut [5.0], 4, &mut rng);
        assert_eq!(tree.nodes(), &[Node::External { size: 1, depth: 0 }]);
        assert_eq!(tree.path_length(5.0), 0.0);
    }

    #[test]
    fn test_identical_values_stop_splitting() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut values = vec![3.0; 8];
        let tree = IsolationTree::build(&mut values, 3, &mut rng);
        assert_eq!(tree.node_count(), 1);
        // depth 0 plus c(8)
        assert!((tree.path_length(3.0) - average_path_length(8)).abs() < 1e-12);
    }

    #[test]
    fn test_leaves_account_for_every_point() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut values: Vec<f64> = (0..64).map(f64::from).collect();
        let tree = IsolationTree::build(&mut values, depth_limit(64), &mut rng);

        let total: usize = leaves(&tree).iter().map(|(size, _)| size).sum();
        assert_eq!(total, 64);
        assert!(tree.height() <= depth_limit(64));
    }

    #[test]
    fn test_two_distinct_points_split_once() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let tree = IsolationTree::build(&mut [1.0, 2.0], 1, &mut rng);
        let mut found = leaves(&tree);
        found.sort_unstable();
        assert_eq!(found, vec![(1, 1), (1, 1)]);
        assert_eq!(tree.path_length(1.0), 1.0);
        assert_eq!(tree.path_length(2.0), 1.0);
    }

    #[test]
    fn test_outlier_isolated_quickly() {
        let mut values = vec![100.0; 19];
        values.push(1000.0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let tree = IsolationTree::build(&mut values, depth_limit(20), &mut rng);

        // The first split lies in (100, 1000], separating the outlier at depth 1
        assert_eq!(tree.path_length(1000.0), 1.0);
        assert!(tree.path_length(100.0) > 1.0);
    }

    #[test]
    fn test_partition() {
        let mut values = [5.0, 1.0, 4.0, 2.0, 3.0];
        let pivot = partition(&mut values, 3.0);
        assert_eq!(pivot, 2);
        assert!(values[..pivot].iter().all(|&v| v < 3.0));
        assert!(values[pivot..].iter().all(|&v| v >= 3.0));
    }

    #[test]
    fn test_split_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            let split = draw_split(-1.0, 1.0, &mut rng);
            assert!(split > -1.0 && split <= 1.0);
        }
        let huge = draw_split(-f64::MAX, f64::MAX, &mut rng);
        assert!(huge.is_finite());
    }
}
