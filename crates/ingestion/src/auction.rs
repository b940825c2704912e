//! Single auction result reading.
//!
//! Turns one auction result file (15-minute prices, one row per interval)
//! into hourly average prices for the file's region.

use crate::hourly::{first_interval_start, HourlyAggregator};
use crate::table::RawTable;
use ida_core::config::AuctionConfig;
use ida_core::{AuctionCatalogEntry, AuctionHourlyPrice, Error, Result};
use tracing::debug;

/// Source of hourly auction prices for catalog entries.
pub trait AuctionSource: Sync {
    /// Hourly prices for one entry, sorted by start time.
    fn hourly_prices(&self, entry: &AuctionCatalogEntry) -> Result<Vec<AuctionHourlyPrice>>;
}

/// Reads auction result files from disk.
#[derive(Debug, Clone)]
pub struct AuctionReader {
    /// Header of the 15-minute price column.
    price_column: String,
}

impl AuctionReader {
    /// Create a reader looking for the given price column.
    pub fn new(price_column: impl Into<String>) -> Self {
        Self {
            price_column: price_column.into(),
        }
    }

    /// Create a reader from configuration.
    pub fn from_config(config: &AuctionConfig) -> Self {
        Self::new(config.price_column.clone())
    }

    /// Read and aggregate the entry's file.
    pub fn read(&self, entry: &AuctionCatalogEntry) -> Result<Vec<AuctionHourlyPrice>> {
        let table = RawTable::read(&entry.file_path)?;
        self.parse(table, entry)
    }

    /// Aggregate an already-loaded table for the entry.
    pub fn parse(
        &self,
        mut table: RawTable,
        entry: &AuctionCatalogEntry,
    ) -> Result<Vec<AuctionHourlyPrice>> {
        let path = &entry.file_path;

        table.drop_incomplete_rows();
        table.drop_unnamed_columns();

        let price_idx = table.column_index(&self.price_column).ok_or_else(|| {
            Error::read(
                path,
                format!(
                    "price column '{}' not found (columns: {:?})",
                    self.price_column, table.headers
                ),
            )
        })?;

        if table.height() == 0 {
            return Err(Error::read(path, "no complete price rows"));
        }

        let prices = table
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row[price_idx].as_f64().ok_or_else(|| {
                    Error::read(path, format!("row {}: price {:?} is not a number", i + 1, row[price_idx]))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        let mut aggregator = HourlyAggregator::new();
        aggregator.add_sequence(
            first_interval_start(entry.delivery_date, entry.auction_group),
            &prices,
        );
        let hourly = aggregator.finalize(entry.region);

        debug!(
            file = %path.display(),
            intervals = prices.len(),
            hours = hourly.len(),
            "Aggregated auction file"
        );

        Ok(hourly)
    }
}

impl Default for AuctionReader {
    fn default() -> Self {
        Self::from_config(&AuctionConfig::default())
    }
}

impl AuctionSource for AuctionReader {
    fn hourly_prices(&self, entry: &AuctionCatalogEntry) -> Result<Vec<AuctionHourlyPrice>> {
        self.read(entry)
    }
}
