//! Reporting for forecast/auction comparisons.
//!
//! Accuracy metrics, the results CSV and SVG charts.

pub mod export;
pub mod metrics;
pub mod plots;

pub use export::write_results_csv;
pub use metrics::ForecastMetrics;
pub use plots::{plot_price_diff_dist, plot_prices_and_diffs};

use ida_core::{MergedTable, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Results CSV file name.
pub const RESULTS_CSV: &str = "forecast_auction_performance.csv";
/// Price difference histogram file name.
pub const PRICE_DIFF_DIST_SVG: &str = "price_diff_dist.svg";
/// Price comparison chart file name.
pub const PRICES_AND_DIFFS_SVG: &str = "prices_and_diffs.svg";
/// Metrics file name.
pub const METRICS_JSON: &str = "forecast_metrics.json";

/// Files written by [`save_results`].
#[derive(Debug, Clone)]
pub struct SavedResults {
    pub csv: PathBuf,
    pub price_diff_dist: PathBuf,
    pub prices_and_diffs: PathBuf,
    pub metrics: PathBuf,
}

/// Write the table, charts and metrics into `dir`, creating it if needed.
pub fn save_results(
    table: &MergedTable,
    metrics: &[ForecastMetrics],
    dir: &Path,
) -> Result<SavedResults> {
    fs::create_dir_all(dir)?;

    let saved = SavedResults {
        csv: dir.join(RESULTS_CSV),
        price_diff_dist: dir.join(PRICE_DIFF_DIST_SVG),
        prices_and_diffs: dir.join(PRICES_AND_DIFFS_SVG),
        metrics: dir.join(METRICS_JSON),
    };

    write_results_csv(table, &saved.csv)?;
    plot_price_diff_dist(table, &saved.price_diff_dist)?;
    plot_prices_and_diffs(table, &saved.prices_and_diffs)?;
    fs::write(&saved.metrics, serde_json::to_string_pretty(metrics)?)?;

    info!(dir = %dir.display(), "Saved results");
    Ok(saved)
}
