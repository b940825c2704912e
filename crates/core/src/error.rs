//! Error types for the forecast/auction comparison.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::{AuctionGroup, Region, Timestamp};

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the forecast/auction comparison.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (bad paths, corrupt forecast source).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (invalid or missing values).
    #[error("Data error: {0}")]
    Data(String),

    /// A source file could not be read or held no usable rows.
    #[error("Failed to read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    /// No forecast was issued at the hour an auction requires.
    #[error(
        "No forecasts issued at hour {issuance_hour} on or the day before {delivery_date} \
         for auction {auction_group} {region} ({})",
        .file_path.display()
    )]
    NoForecast {
        file_path: PathBuf,
        delivery_date: NaiveDate,
        region: Region,
        auction_group: AuctionGroup,
        issuance_hour: u32,
    },

    /// Forecasts exist but none covers the auction's delivery window.
    #[error(
        "No relevant forecasts within {window_start} - {window_end} for auction \
         {auction_group} {region} delivered {delivery_date} ({})",
        .file_path.display()
    )]
    NoRelevantForecast {
        file_path: PathBuf,
        delivery_date: NaiveDate,
        region: Region,
        auction_group: AuctionGroup,
        window_start: Timestamp,
        window_end: Timestamp,
    },

    /// Plot rendering error.
    #[error("Plot error: {0}")]
    Plot(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create a read error for a file.
    pub fn read(path: impl Into<PathBuf>, msg: impl ToString) -> Self {
        Error::Read {
            path: path.into(),
            message: msg.to_string(),
        }
    }

    /// Create a plot error.
    pub fn plot(msg: impl ToString) -> Self {
        Error::Plot(msg.to_string())
    }

    /// True for errors caused by missing forecast coverage.
    pub fn is_data_availability(&self) -> bool {
        matches!(self, Error::NoForecast { .. } | Error::NoRelevantForecast { .. })
    }
}
