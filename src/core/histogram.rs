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

//! Sales value histogram, split into normal and anomalous counts.

use serde::{Deserialize, Serialize};

/// Number of value buckets
pub const NUM_BUCKETS: usize = 30;

/// Counts within one value bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    pub normal: usize,
    pub anomalous: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueHistogram {
    /// Value range covered, `None` when there were no values
    pub range: Option<(f64, f64)>,
    /// Width of each bucket
    pub bucket_size: f64,
    pub buckets: Vec<BucketCounts>,
}

impl ValueHistogram {
    /// Bucket `values` into [`NUM_BUCKETS`] equal-width bins between min and max.
    ///
    /// `flags` must be aligned with `values`.
    #[must_use]
    pub fn compute(values: &[f64], flags: &[bool]) -> Self {
        profiling::scope!("ValueHistogram::compute");

        let Some((min, max)) = Self::calculate_range(values) else {
            return Self {
                range: None,
                bucket_size: 0.0,
                buckets: Vec::new(),
            };
        };

        let bucket_size = (max - min) / NUM_BUCKETS as f64;
        let mut buckets = vec![BucketCounts::default(); NUM_BUCKETS];
        for (&value, &anomalous) in values.iter().zip(flags) {
            if !value.is_finite() {
                continue;
            }
            let counts = &mut buckets[Self::value_to_bucket(value, min, bucket_size)];
            if anomalous {
                counts.anomalous += 1;
            } else {
                counts.normal += 1;
            }
        }

        Self {
            range: Some((min, max)),
            bucket_size,
            buckets,
        }
    }

    fn calculate_range(values: &[f64]) -> Option<(f64, f64)> {
        let mut finite = values.iter().copied().filter(|v| v.is_finite());
        let first = finite.next()?;
        Some(finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    fn value_to_bucket(value: f64, min: f64, bucket_size: f64) -> usize {
        if bucket_size <= 0.0 {
            return 0;
        }
        (((value - min) / bucket_size) as usize).min(NUM_BUCKETS - 1)
    }
}
