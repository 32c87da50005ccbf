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

//! Expected path length of an unsuccessful binary search tree lookup.

/// Euler-Mascheroni constant
pub const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Approximate harmonic number H(k) = ln(k) + gamma, with H(0) = 0.
#[must_use]
pub fn harmonic(k: usize) -> f64 {
    if k == 0 {
        0.0
    } else {
        (k as f64).ln() + EULER_GAMMA
    }
}

/// Average path length `c(n)` of an unsuccessful search among `n` points.
///
/// Used both to normalise the mean depth of a forest and to account for the
/// unbuilt subtree below a leaf that still holds more than one point.
#[must_use]
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let nf = n as f64;
            2.0f64.mul_add(harmonic(n - 1), -(2.0 * (nf - 1.0) / nf))
        }
    }
}
