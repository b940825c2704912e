use anyhow::{Context, Result};
use clap::Parser;
use ida_core::Config;
use ida_matching::ComparisonPipeline;
use ida_report::{save_results, ForecastMetrics};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ida-compare")]
#[command(about = "Compare intraday auction prices with day-ahead price forecasts", long_about = None)]
struct Cli {
    /// Forecast CSV file
    #[arg(long, default_value = "IBForecastNoScenariosDK.csv")]
    forecast_path: PathBuf,

    /// Directory searched recursively for auction result files
    #[arg(long, default_value = ".")]
    auction_dir: PathBuf,

    /// Directory the results are written to
    #[arg(long, default_value = "./results_dir")]
    save_dir: PathBuf,

    /// Matching threads (0 = one per core, 1 = sequential)
    #[arg(long, default_value_t = 0)]
    workers: usize,

    /// JSON file with column names and other settings
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Build the run configuration, resolving paths against `cwd`.
    fn into_config(self, cwd: &Path) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => Config::default(),
        };

        config.paths.forecast_path = resolve(cwd, self.forecast_path);
        config.paths.auction_dir = resolve(cwd, self.auction_dir);
        config.paths.save_dir = resolve(cwd, self.save_dir);
        config.runtime.workers = self.workers;
        Ok(config)
    }
}

fn resolve(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("ida_compare=info,ida_matching=info,ida_ingestion=info")
        }))
        .init();

    let cwd = std::env::current_dir().context("resolving working directory")?;
    let config = Cli::parse().into_config(&cwd)?;

    println!("Forecast path: {}", config.paths.forecast_path.display());
    println!("Auction directory: {}", config.paths.auction_dir.display());
    println!("Save directory: {}", config.paths.save_dir.display());

    let save_dir = config.paths.save_dir.clone();
    let run = ComparisonPipeline::new(config)
        .run()
        .context("matching forecasts with auction results")?;

    for skipped in &run.skipped_files {
        warn!(file = %skipped.display(), "Auction file skipped");
    }
    info!(
        auctions = run.matched_auctions,
        rows = run.table.len(),
        "Matched forecasts with auctions"
    );

    let metrics = ForecastMetrics::compute_all(&run.table.rows);
    let saved = save_results(&run.table, &metrics, &save_dir)
        .with_context(|| format!("saving results to {}", save_dir.display()))?;
    info!(csv = %saved.csv.display(), "Results saved");

    for m in &metrics {
        println!("{m}");
    }
    Ok(())
}
