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

//! Analyse every store of a sales file and write the reports as JSON.

use anyhow::Context;
use clap::Parser;
use dataguard::config::GlobalConfig;
use dataguard::core::{analyze, AnalysisSettings, SalesStore, StoreReport};
use dataguard::parser::load_sales;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dataguard-export")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
#[command(about = "Export per-store anomaly reports as JSON", long_about = None)]
struct Args {
    /// Sales CSV file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Output JSON file
    #[arg(short, long, value_name = "OUT")]
    output: PathBuf,

    /// Expected fraction of anomalous days, in (0, 0.5]
    #[arg(short, long)]
    contamination: Option<f64>,

    /// Random seed for reproducible results
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dataguard=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = GlobalConfig::load();

    let mut settings = AnalysisSettings::from(&config);
    if let Some(contamination) = args.contamination {
        settings.contamination = contamination;
    }
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }

    let records = load_sales(&args.file, &config.columns)
        .with_context(|| format!("Cannot load {}", args.file.display()))?;
    let store = SalesStore::new(records);

    let reports = store
        .stores()
        .map(|name| {
            let selection = store.select(name, None, None);
            analyze(name, &selection, &settings)
                .with_context(|| format!("Anomaly detection failed for store '{name}'"))
        })
        .collect::<anyhow::Result<Vec<StoreReport>>>()?;

    let file = File::create(&args.output)
        .with_context(|| format!("Cannot create {}", args.output.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &reports)?;

    let anomalies: usize = reports.iter().map(|r| r.anomaly_count).sum();
    tracing::info!(
        "Exported {} store reports ({} anomalies) to {}",
        reports.len(),
        anomalies,
        args.output.display()
    );
    Ok(())
}
