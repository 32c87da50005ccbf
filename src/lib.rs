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

//! `DataGuard` - isolation-forest anomaly detection for daily store sales.
//!
//! The [`anomaly`] module is the engine; [`parser`], [`core`] and [`config`]
//! load sales files, segment them per store and turn a run into a report.

pub mod anomaly;
pub mod config;
pub mod core;
pub mod error;
pub mod parser;

pub use anomaly::{detect, detect_values, Detection, Detector, Observation};
pub use error::{DetectError, Result};
