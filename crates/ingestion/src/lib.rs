//! Data ingestion and normalization for the forecast/auction comparison.
//!
//! This crate handles:
//! - Date detection in auction filenames
//! - Auction catalog building (region, auction group, delivery date)
//! - Tabular file reading (CSV and XLSX)
//! - Hourly aggregation of 15-minute auction prices
//! - Forecast loading and validation

pub mod auction;
pub mod catalog;
pub mod date_probe;
pub mod forecast;
pub mod hourly;
pub mod table;

pub use auction::{AuctionReader, AuctionSource};
pub use catalog::AuctionCatalog;
pub use date_probe::date_from_str;
pub use forecast::{check_unique_combinations, ForecastSet};
pub use hourly::HourlyAggregator;
pub use table::{Cell, RawTable};
