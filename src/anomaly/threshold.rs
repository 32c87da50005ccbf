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

//! Turns continuous scores into anomaly flags for a contamination fraction.

use crate::error::{DetectError, Result};
use std::cmp::Ordering;

/// Upper bound of the accepted contamination range `(0, 0.5]`
pub const MAX_CONTAMINATION: f64 = 0.5;

/// Outcome of thresholding one run
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholded {
    /// One flag per score, in input order
    pub flags: Vec<bool>,
    /// Score of the lowest-ranked flagged observation, `None` if nothing was flagged
    pub threshold: Option<f64>,
    /// Number of flagged observations, `round(contamination * n)`
    pub flagged: usize,
}

/// Reject contamination outside `(0, 0.5]` (NaN included).
pub fn validate_contamination(contamination: f64) -> Result<()> {
    if contamination > 0.0 && contamination <= MAX_CONTAMINATION {
        Ok(())
    } else {
        Err(DetectError::InvalidParameter(format!(
            "contamination must be in (0, {MAX_CONTAMINATION}], got {contamination}"
        )))
    }
}

/// How many observations a contamination fraction flags out of `n`
#[must_use]
pub fn flag_count(contamination: f64, n: usize) -> usize {
    ((contamination * n as f64).round() as usize).min(n)
}

/// Flag the `round(contamination * n)` highest scores.
///
/// Ranking is by descending score; equal scores keep input order, so the
/// earlier observation wins a tie at the boundary.
pub fn apply(scores: &[f64], contamination: f64) -> Result<Thresholded> {
    profiling::scope!("threshold::apply");
    validate_contamination(contamination)?;

    let k = flag_count(contamination, scores.len());

    let mut ranking: Vec<usize> = (0..scores.len()).collect();
    ranking.sort_by(|&a, &b| descending(scores[a], scores[b]));

    let mut flags = vec![false; scores.len()];
    for &idx in &ranking[..k] {
        flags[idx] = true;
    }
    let threshold = k.checked_sub(1).map(|last| scores[ranking[last]]);

    tracing::debug!(
        "Flagged {} of {} observations (contamination {}, cutoff {:?})",
        k,
        scores.len(),
        contamination,
        threshold
    );

    Ok(Thresholded {
        flags,
        threshold,
        flagged: k,
    })
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contamination_bounds() {
        assert!(validate_contamination(0.05).is_ok());
        assert!(validate_contamination(0.5).is_ok());
        assert!(validate_contamination(0.0).is_err());
        assert!(validate_contamination(-0.1).is_err());
        assert!(validate_contamination(0.6).is_err());
        assert!(validate_contamination(f64::NAN).is_err());
    }

    #[test]
    fn test_flag_count_rounds() {
        assert_eq!(flag_count(0.05, 20), 1);
        assert_eq!(flag_count(0.05, 30), 2); // 1.5 rounds away from zero
        assert_eq!(flag_count(0.01, 20), 0);
        assert_eq!(flag_count(0.5, 3), 2);
        assert_eq!(flag_count(0.5, 0), 0);
    }

    #[test]
    fn test_flags_highest_scores() {
        let scores = [0.4, 0.9, 0.3, 0.7, 0.5];
        let result = apply(&scores, 0.4).unwrap();
        assert_eq!(result.flags, vec![false, true, false, true, false]);
        assert_eq!(result.flagged, 2);
        assert_eq!(result.threshold, Some(0.7));
    }

    #[test]
    fn test_ties_prefer_earlier_observation() {
        let scores = [0.5, 0.8, 0.8, 0.8, 0.1];
        let result = apply(&scores, 0.4).unwrap();
        assert_eq!(result.flags, vec![false, true, true, false, false]);
    }

    #[test]
    fn test_nothing_flagged_when_k_is_zero() {
        let result = apply(&[0.9, 0.1, 0.2], 0.1).unwrap();
        assert_eq!(result.flags, vec![false; 3]);
        assert_eq!(result.threshold, None);
    }

    #[test]
    fn test_empty_scores() {
        let result = apply(&[], 0.05).unwrap();
        assert!(result.flags.is_empty());
        assert_eq!(result.flagged, 0);
    }

    #[test]
    fn test_invalid_contamination_rejected() {
        assert!(matches!(
            apply(&[0.1, 0.2], 0.6),
            Err(DetectError::InvalidParameter(_))
        ));
    }
}
