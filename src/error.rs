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

//! Error types for the anomaly engine.

use thiserror::Error;

/// Result type alias for detection operations.
pub type Result<T> = std::result::Result<T, DetectError>;

/// Errors that can occur while fitting and scoring a forest.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    /// Fewer observations than the forest needs to isolate anything.
    #[error("insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// A tunable is outside its accepted range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An observation value is NaN or infinite.
    #[error("invalid value at index {index}: {value} is not finite")]
    InvalidValue { index: usize, value: f64 },

    /// Construction was stopped through a `CancelToken`.
    #[error("detection cancelled after {built} of {requested} trees")]
    Cancelled { built: usize, requested: usize },

    /// The worker pool could not be created.
    #[error("worker pool error: {0}")]
    WorkerPool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = DetectError::InsufficientData { needed: 2, got: 1 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 2 observations, got 1"
        );

        let err = DetectError::InvalidParameter("contamination must be in (0, 0.5]".to_string());
        assert_eq!(
            err.to_string(),
            "invalid parameter: contamination must be in (0, 0.5]"
        );

        let err = DetectError::InvalidValue {
            index: 3,
            value: f64::INFINITY,
        };
        assert_eq!(err.to_string(), "invalid value at index 3: inf is not finite");

        let err = DetectError::Cancelled {
            built: 10,
            requested: 100,
        };
        assert_eq!(err.to_string(), "detection cancelled after 10 of 100 trees");
    }
}
