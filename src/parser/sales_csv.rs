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

//! Loader for daily sales CSV files (`date,magasin,ventes`).

use super::parse_date;
use super::record::SalesRecord;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading a sales file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read sales file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("column '{0}' not found in header")]
    MissingColumn(String),

    #[error("row {row}: invalid date '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: invalid sales value '{value}'")]
    InvalidValue { row: usize, value: String },

    #[error("no data rows in sales file")]
    NoRows,
}

/// Header names of the three columns the loader needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvColumns {
    pub date: String,
    pub store: String,
    pub sales: String,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            store: "magasin".to_string(),
            sales: "ventes".to_string(),
        }
    }
}

struct ColumnIndices {
    date: usize,
    store: usize,
    sales: usize,
}

impl ColumnIndices {
    fn resolve(headers: &csv::StringRecord, columns: &CsvColumns) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            date: find(&columns.date)?,
            store: find(&columns.store)?,
            sales: find(&columns.sales)?,
        })
    }
}

/// Load all records from a sales CSV file.
pub fn load_sales(path: &Path, columns: &CsvColumns) -> Result<Vec<SalesRecord>, LoadError> {
    tracing::info!("Loading sales data from {}", path.display());
    let file = File::open(path)?;
    let records = read_sales(BufReader::new(file), columns)?;
    tracing::info!("Loaded {} rows from {}", records.len(), path.display());
    Ok(records)
}

/// Read records from any CSV source; the first line must be the header.
pub fn read_sales<R: Read>(reader: R, columns: &CsvColumns) -> Result<Vec<SalesRecord>, LoadError> {
    profiling::scope!("read_sales");

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let indices = ColumnIndices::resolve(reader.headers()?, columns)?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let field = |idx: usize| record.get(idx).unwrap_or_default();

        let raw_date = field(indices.date);
        let date = parse_date(raw_date).ok_or_else(|| LoadError::InvalidDate {
            row,
            value: raw_date.to_string(),
        })?;

        let raw_sales = field(indices.sales);
        let sales = raw_sales
            .parse::<f64>()
            .map_err(|_| LoadError::InvalidValue {
                row,
                value: raw_sales.to_string(),
            })?;
        if !sales.is_finite() {
            tracing::warn!("Row {row}: non-finite sales value '{raw_sales}'");
        }

        records.push(SalesRecord::new(row, date, field(indices.store), sales));
    }

    if records.is_empty() {
        return Err(LoadError::NoRows);
    }
    Ok(records)
}
