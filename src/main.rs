/// `DataGuard` - anomaly detection for store sales
///
/// Copyright (C) 2025 Daniel Freiermuth
///
/// This program is free software: you can redistribute it and/or modify
/// it under the terms of the GNU General Public License as published by
/// the Free Software Foundation, either version 3 of the License, or
/// (at your option) any later version.
///
/// This program is distributed in the hope that it will be useful,
/// but WITHOUT ANY WARRANTY; without even the implied warranty of
/// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
/// GNU General Public License for more details.
///
/// You should have received a copy of the GNU General Public License
/// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::Parser;
use dataguard::config::GlobalConfig;
use dataguard::core::{analyze, AnalysisSettings, SalesStore};
use dataguard::parser::{load_sales, parse_date};
use std::path::PathBuf;

#[cfg(feature = "ram-profiling")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[derive(Parser, Debug)]
#[command(name = "dataguard")]
#[command(author = "DataGuard Team")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
#[command(about = "Flag anomalous daily sales with an isolation forest", long_about = None)]
struct Args {
    /// Sales CSV file with date, store and sales columns
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Store to analyse (defaults to the first store in alphabetical order)
    #[arg(short, long)]
    store: Option<String>,

    /// First day of the analysed period (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day)]
    from: Option<NaiveDate>,

    /// Last day of the analysed period (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day)]
    to: Option<NaiveDate>,

    /// Expected fraction of anomalous days, in (0, 0.5]
    #[arg(short, long)]
    contamination: Option<f64>,

    /// Random seed for reproducible results
    #[arg(long)]
    seed: Option<u64>,

    /// Number of isolation trees
    #[arg(long)]
    trees: Option<usize>,

    /// Subsample size per tree
    #[arg(long)]
    max_samples: Option<usize>,

    /// Worker threads for building and scoring
    #[arg(long)]
    workers: Option<usize>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// List the stores found in the file and exit
    #[arg(long)]
    list_stores: bool,

    /// Path for the DHAT heap profiling output (only used when built with --features ram-profiling)
    #[cfg(feature = "ram-profiling")]
    #[arg(
        long = "profile-output",
        value_name = "PROFILE_FILE",
        default_value = "dhat-heap.json"
    )]
    profile_output: PathBuf,
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn settings(args: &Args, config: &GlobalConfig) -> AnalysisSettings {
    let mut settings = AnalysisSettings::from(config);
    if let Some(contamination) = args.contamination {
        settings.contamination = contamination;
    }
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(trees) = args.trees {
        settings.forest.n_trees = trees;
    }
    if let Some(max_samples) = args.max_samples {
        settings.forest.max_samples = max_samples;
    }
    if args.workers.is_some() {
        settings.forest.workers = args.workers;
    }
    settings
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG environment variable to override (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dataguard=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        "DataGuard starting up (version {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );

    let args = Args::parse();

    #[cfg(feature = "ram-profiling")]
    let _profiler = {
        tracing::info!("RAM profiling enabled, output: {:?}", args.profile_output);
        dhat::Profiler::builder()
            .file_name(args.profile_output.clone())
            .build()
    };

    #[cfg(feature = "cpu-profiling")]
    {
        tracing::info!("CPU profiling enabled with Tracy - run Tracy profiler to connect");
    }

    let config = GlobalConfig::load();
    let records = load_sales(&args.file, &config.columns)
        .with_context(|| format!("Cannot load {}", args.file.display()))?;
    let store = SalesStore::new(records);

    if args.list_stores {
        for name in store.stores() {
            println!("{name}");
        }
        return Ok(());
    }

    let store_name = match &args.store {
        Some(name) if store.contains_store(name) => name.clone(),
        Some(name) => bail!("Store '{name}' not found in {}", args.file.display()),
        None => store
            .stores()
            .next()
            .map(str::to_string)
            .context("No store found in sales file")?,
    };

    if let Some((first, last)) = store.date_range() {
        tracing::info!("Data covers {first} to {last}");
    }

    let selection = store.select(&store_name, args.from, args.to);
    let settings = settings(&args, &config);
    let report = analyze(&store_name, &selection, &settings)
        .with_context(|| format!("Anomaly detection failed for store '{store_name}'"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    Ok(())
}
