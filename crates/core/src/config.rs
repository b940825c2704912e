//! Configuration structures for the forecast/auction comparison.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for a comparison run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input and output locations.
    pub paths: PathsConfig,
    /// Forecast source layout and validation.
    pub forecast: ForecastConfig,
    /// Auction file discovery and parsing.
    pub auction: AuctionConfig,
    /// Execution settings.
    pub runtime: RuntimeConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Forecast CSV file.
    pub forecast_path: PathBuf,
    /// Directory searched recursively for auction result files.
    pub auction_dir: PathBuf,
    /// Directory receiving the results CSV, plots and metrics.
    pub save_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            forecast_path: PathBuf::from("IBForecastNoScenariosDK.csv"),
            auction_dir: PathBuf::from("."),
            save_dir: PathBuf::from("results_dir"),
        }
    }
}

/// Column names of the forecast CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastColumns {
    /// Issuance timestamp column.
    pub issuance_time: String,
    /// Horizon (delivery hour) timestamp column.
    pub horizon_time: String,
    /// DK1 forecast price column.
    pub price_dk1: String,
    /// DK2 forecast price column.
    pub price_dk2: String,
}

impl Default for ForecastColumns {
    fn default() -> Self {
        Self {
            issuance_time: "PTime".to_string(),
            horizon_time: "Time".to_string(),
            price_dk1: "cor_pe_RegPrice.DK1".to_string(),
            price_dk2: "cor_pe_RegPrice.DK2".to_string(),
        }
    }
}

/// Forecast loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Source column names.
    pub columns: ForecastColumns,
    /// Reject sources with duplicate (issuance, horizon) pairs.
    pub validate_unique: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            columns: ForecastColumns::default(),
            validate_unique: true,
        }
    }
}

/// Auction file configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionConfig {
    /// File extensions (without dot, case-insensitive) considered auction results.
    pub accepted_extensions: Vec<String>,
    /// Header of the 15-minute price column.
    pub price_column: String,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            accepted_extensions: vec!["csv".to_string(), "xlsx".to_string()],
            price_column: "Schedule".to_string(),
        }
    }
}

/// Execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Number of parallel matching workers (0 = auto, 1 = sequential).
    pub workers: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { workers: 0 }
    }
}
