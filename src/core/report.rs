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

//! Per-store analysis: run the engine on a selection and summarise it.

use crate::anomaly::threshold::validate_contamination;
use crate::anomaly::{Detector, ForestConfig};
use crate::config::GlobalConfig;
use crate::core::histogram::ValueHistogram;
use crate::core::sales_store::observations;
use crate::core::stats::SummaryStats;
use crate::error::Result;
use crate::parser::record::weekday_name;
use crate::parser::SalesRecord;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Everything that influences one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub contamination: f64,
    pub seed: u64,
    pub forest: ForestConfig,
    /// Below this many rows the model is skipped and nothing is flagged
    pub min_rows: usize,
}

impl From<&GlobalConfig> for AnalysisSettings {
    fn from(config: &GlobalConfig) -> Self {
        Self {
            contamination: config.contamination,
            seed: config.seed,
            forest: config.forest(),
            min_rows: config.min_rows,
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self::from(&GlobalConfig::default())
    }
}

/// One analysed sales day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub row: usize,
    pub date: NaiveDate,
    pub store: String,
    pub sales: f64,
    pub score: f64,
    pub anomaly: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayCount {
    pub day: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreReport {
    pub store: String,
    /// First and last date of the selection
    pub period: Option<(NaiveDate, NaiveDate)>,
    pub settings: AnalysisSettings,
    /// False when the selection was too small to run the model
    pub model_ran: bool,
    pub threshold: Option<f64>,
    pub stats: Option<SummaryStats>,
    pub rows: Vec<ReportRow>,
    pub anomaly_count: usize,
    /// Monday first, days without anomalies included
    pub anomalies_by_weekday: Vec<WeekdayCount>,
    pub histogram: ValueHistogram,
}

/// Analyse the date-sorted `records` of one store.
pub fn analyze(
    store: &str,
    records: &[&SalesRecord],
    settings: &AnalysisSettings,
) -> Result<StoreReport> {
    profiling::scope!("analyze");

    // Settings are checked even when the selection is too small for the model
    settings.forest.validate()?;
    validate_contamination(settings.contamination)?;

    let values: Vec<f64> = records.iter().map(|r| r.sales).collect();
    let model_ran = records.len() >= settings.min_rows;

    let (scores, flags, threshold) = if model_ran {
        let run = Detector::new(settings.forest).run(
            &observations(records),
            settings.contamination,
            settings.seed,
            None,
        )?;
        let scores: Vec<f64> = run.detections.iter().map(|d| d.score).collect();
        let flags: Vec<bool> = run.detections.iter().map(|d| d.anomaly).collect();
        (scores, flags, run.threshold)
    } else {
        tracing::warn!(
            "Only {} rows for store '{}', need {} to run the model; nothing flagged",
            records.len(),
            store,
            settings.min_rows
        );
        (vec![0.0; records.len()], vec![false; records.len()], None)
    };

    let rows: Vec<ReportRow> = records
        .iter()
        .zip(scores.iter().zip(&flags))
        .map(|(record, (&score, &anomaly))| ReportRow {
            row: record.row,
            date: record.date,
            store: record.store.clone(),
            sales: record.sales,
            score,
            anomaly,
        })
        .collect();

    let anomalies_by_weekday = WEEK
        .iter()
        .map(|&day| WeekdayCount {
            day: weekday_name(day).to_string(),
            count: records
                .iter()
                .zip(&flags)
                .filter(|(record, &anomaly)| anomaly && record.weekday() == day)
                .count(),
        })
        .collect();

    let period = records
        .first()
        .zip(records.last())
        .map(|(first, last)| (first.date, last.date));

    Ok(StoreReport {
        store: store.to_string(),
        period,
        settings: *settings,
        model_ran,
        threshold,
        stats: SummaryStats::compute(&values),
        anomaly_count: flags.iter().filter(|&&f| f).count(),
        histogram: ValueHistogram::compute(&values, &flags),
        rows,
        anomalies_by_weekday,
    })
}

impl StoreReport {
    pub fn anomalies(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(|row| row.anomaly)
    }

    /// Plain-text summary: headline figures followed by the anomaly table
    #[must_use]
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis: {}", self.store)?;
        if let Some((first, last)) = self.period {
            writeln!(f, "Period: {first} to {last} ({} days)", self.rows.len())?;
        }
        writeln!(
            f,
            "Contamination: {:.2}  Seed: {}  Trees: {}",
            self.settings.contamination, self.settings.seed, self.settings.forest.n_trees
        )?;
        writeln!(f)?;

        if let Some(stats) = &self.stats {
            writeln!(f, "Mean sales:   {:>12.2} €", stats.mean)?;
            writeln!(f, "Median sales: {:>12.2} €", stats.median)?;
            writeln!(f, "Std dev:      {:>12.2} €", stats.std)?;
            writeln!(f, "Max sales:    {:>12.2} €", stats.max)?;
            writeln!(f, "Min sales:    {:>12.2} €", stats.min)?;
        }
        writeln!(f, "Anomalies:    {:>12}", self.anomaly_count)?;
        writeln!(f)?;

        if !self.model_ran {
            return writeln!(
                f,
                "Not enough data in this period to run the model (need {} rows).",
                self.settings.min_rows
            );
        }

        if self.anomaly_count == 0 {
            return writeln!(f, "No anomaly detected in this period.");
        }

        writeln!(f, "{:<12} {:<16} {:>12} {:>8}", "date", "store", "sales", "score")?;
        for row in self.anomalies() {
            writeln!(
                f,
                "{:<12} {:<16} {:>10.2} € {:>8.4}",
                row.date.to_string(),
                row.store,
                row.sales,
                row.score
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Anomalies per weekday:")?;
        for day in &self.anomalies_by_weekday {
            writeln!(f, "  {:<10} {}", day.day, day.count)?;
        }
        Ok(())
    }
}
