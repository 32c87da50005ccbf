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

use crate::anomaly::{ForestConfig, DEFAULT_MAX_SAMPLES, DEFAULT_TREES};
use crate::parser::CsvColumns;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONTAMINATION: f64 = 0.05;
pub const DEFAULT_SEED: u64 = 42;

/// Fewer filtered rows than this and the model is not run at all
pub const DEFAULT_MIN_ROWS: usize = 11;

/// Global user configuration stored in config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_contamination")]
    pub contamination: f64,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_trees")]
    pub n_trees: usize,

    #[serde(default = "default_max_samples")]
    pub max_samples: usize,

    /// Worker threads for tree building and scoring (unset = one per core)
    #[serde(default)]
    pub workers: Option<usize>,

    #[serde(default = "default_min_rows")]
    pub min_rows: usize,

    #[serde(default)]
    pub columns: CsvColumns,
}

const fn default_contamination() -> f64 {
    DEFAULT_CONTAMINATION
}

const fn default_seed() -> u64 {
    DEFAULT_SEED
}

const fn default_trees() -> usize {
    DEFAULT_TREES
}

const fn default_max_samples() -> usize {
    DEFAULT_MAX_SAMPLES
}

const fn default_min_rows() -> usize {
    DEFAULT_MIN_ROWS
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            contamination: DEFAULT_CONTAMINATION,
            seed: DEFAULT_SEED,
            n_trees: DEFAULT_TREES,
            max_samples: DEFAULT_MAX_SAMPLES,
            workers: None,
            min_rows: DEFAULT_MIN_ROWS,
            columns: CsvColumns::default(),
        }
    }
}

impl GlobalConfig {
    /// Get the path to the global config file
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|config_dir| config_dir.join("dataguard").join("config.json"))
    }

    /// Load global config from disk, returning defaults if not found
    #[must_use]
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load config from `path`; a missing or unreadable file yields defaults
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("No global config found, using defaults");
            return Self::default();
        }

        tracing::info!("Loading global config from {}", path.display());
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring invalid config {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Cannot read config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Save global config to disk
    pub fn save(&self) -> Result<(), String> {
        let path = Self::config_path().ok_or("Could not determine config directory")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Create directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {e}"))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {e}"))?;

        std::fs::write(path, json).map_err(|e| format!("Failed to write config file: {e}"))?;

        tracing::info!("Saved global config to {}", path.display());
        Ok(())
    }

    /// Engine settings derived from this configuration
    #[must_use]
    pub const fn forest(&self) -> ForestConfig {
        ForestConfig {
            n_trees: self.n_trees,
            max_samples: self.max_samples,
            workers: self.workers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: GlobalConfig = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.contamination, DEFAULT_CONTAMINATION);
        assert_eq!(config.n_trees, DEFAULT_TREES);
        assert_eq!(config.min_rows, DEFAULT_MIN_ROWS);
        assert_eq!(config.columns, CsvColumns::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = GlobalConfig {
            contamination: 0.1,
            workers: Some(2),
            ..GlobalConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(GlobalConfig::load_from(&path), config);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(GlobalConfig::load_from(&path), GlobalConfig::default());
        assert_eq!(
            GlobalConfig::load_from(&dir.path().join("absent.json")),
            GlobalConfig::default()
        );
    }

    #[test]
    fn test_forest_settings() {
        let config = GlobalConfig {
            n_trees: 50,
            max_samples: 64,
            workers: Some(3),
            ..GlobalConfig::default()
        };
        assert_eq!(
            config.forest(),
            ForestConfig {
                n_trees: 50,
                max_samples: 64,
                workers: Some(3),
            }
        );
    }
}
