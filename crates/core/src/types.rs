//! Core data types for the forecast/auction comparison.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

/// Naive wall-clock timestamp (hour granular for forecasts and hourly auction prices).
pub type Timestamp = NaiveDateTime;

/// Format used for all timestamps read from and written to delimited files.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Price region (bidding zone).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "DK1")]
    Dk1,
    #[serde(rename = "DK2")]
    Dk2,
}

impl Region {
    /// All regions, in column order.
    pub const ALL: [Region; 2] = [Region::Dk1, Region::Dk2];

    /// Token used in filenames and column names.
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Dk1 => "DK1",
            Region::Dk2 => "DK2",
        }
    }

    /// Classify a filename. Anything not tagged `DK1` is treated as `DK2`.
    pub fn from_file_name(name: &str) -> Self {
        if name.contains("DK1") {
            Region::Dk1
        } else {
            Region::Dk2
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DK1" => Ok(Region::Dk1),
            "DK2" => Ok(Region::Dk2),
            other => Err(Error::data(format!("unknown region '{other}'"))),
        }
    }
}

/// Intraday auction group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AuctionGroup {
    #[serde(rename = "IDA1")]
    Ida1,
    #[serde(rename = "IDA2")]
    Ida2,
    #[serde(rename = "IDA3")]
    Ida3,
}

impl AuctionGroup {
    /// Token used in filenames.
    pub fn as_str(self) -> &'static str {
        match self {
            AuctionGroup::Ida1 => "IDA1",
            AuctionGroup::Ida2 => "IDA2",
            AuctionGroup::Ida3 => "IDA3",
        }
    }

    /// Classify a filename, falling back to `IDA3` when neither of the
    /// first two tokens is present.
    pub fn from_file_name(name: &str) -> Self {
        if name.contains("IDA1") {
            AuctionGroup::Ida1
        } else if name.contains("IDA2") {
            AuctionGroup::Ida2
        } else {
            AuctionGroup::Ida3
        }
    }

    /// IDA1 and IDA2 are held the day before delivery.
    pub fn delivers_next_day(self) -> bool {
        matches!(self, AuctionGroup::Ida1 | AuctionGroup::Ida2)
    }

    /// Delivery date for a file written on `written_date`.
    pub fn delivery_date(self, written_date: NaiveDate) -> NaiveDate {
        if self.delivers_next_day() {
            written_date + Duration::days(1)
        } else {
            written_date
        }
    }

    /// Hour of day at which the forecast used for this auction is issued.
    pub fn issuance_hour(self) -> u32 {
        match self {
            AuctionGroup::Ida1 => 15,
            AuctionGroup::Ida2 => 22,
            AuctionGroup::Ida3 => 10,
        }
    }

    /// Hour of the delivery day covered by the first auction interval.
    /// IDA3 only covers the second half of the day.
    pub fn first_delivery_hour(self) -> u32 {
        match self {
            AuctionGroup::Ida3 => 12,
            AuctionGroup::Ida1 | AuctionGroup::Ida2 => 0,
        }
    }
}

impl fmt::Display for AuctionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuctionGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IDA1" => Ok(AuctionGroup::Ida1),
            "IDA2" => Ok(AuctionGroup::Ida2),
            "IDA3" => Ok(AuctionGroup::Ida3),
            other => Err(Error::data(format!("unknown auction group '{other}'"))),
        }
    }
}

/// A single day-ahead forecast row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// When the forecast was produced (`PTime`).
    pub issuance_time: Timestamp,
    /// Delivery hour the forecast is for (`Time`).
    pub horizon_time: Timestamp,
    /// Forecast price for DK1.
    pub forecast_price_dk1: f64,
    /// Forecast price for DK2.
    pub forecast_price_dk2: f64,
}

impl ForecastRecord {
    /// Forecast price for a region.
    #[inline]
    pub fn price(&self, region: Region) -> f64 {
        match region {
            Region::Dk1 => self.forecast_price_dk1,
            Region::Dk2 => self.forecast_price_dk2,
        }
    }
}

/// One auction result file discovered on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionCatalogEntry {
    /// Path to the result file.
    pub file_path: PathBuf,
    pub region: Region,
    pub auction_group: AuctionGroup,
    /// Date found in the filename.
    pub written_date: NaiveDate,
    /// Day the auctioned power is delivered.
    pub delivery_date: NaiveDate,
}

impl AuctionCatalogEntry {
    /// Create an entry, deriving the delivery date from the group.
    pub fn new(
        file_path: impl Into<PathBuf>,
        region: Region,
        auction_group: AuctionGroup,
        written_date: NaiveDate,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            region,
            auction_group,
            written_date,
            delivery_date: auction_group.delivery_date(written_date),
        }
    }

    /// Catalog processing order.
    pub fn sort_key(&self) -> (NaiveDate, Region, AuctionGroup, &PathBuf) {
        (self.delivery_date, self.region, self.auction_group, &self.file_path)
    }
}

impl fmt::Display for AuctionCatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} delivery {} ({})",
            self.auction_group,
            self.region,
            self.delivery_date,
            self.file_path.display()
        )
    }
}

/// Hourly average auction price for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionHourlyPrice {
    pub region: Region,
    /// Start of the earliest 15-minute interval in the hour.
    pub start_time: Timestamp,
    /// Mean of the 15-minute prices in the hour.
    pub price: f64,
}

/// A forecast row joined to one auction's hourly price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedRow {
    /// Join key: forecast horizon and auction hour start.
    pub horizon_time: Timestamp,
    pub issuance_time: Timestamp,
    pub forecast_price_dk1: f64,
    pub forecast_price_dk2: f64,
    /// Auction price for `region`, if the auction covered this hour.
    pub auction_price: Option<f64>,
    pub auction_group: AuctionGroup,
    pub region: Region,
    pub source_file: PathBuf,
}

/// A row of the consolidated comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub horizon_time: Timestamp,
    pub issuance_time: Timestamp,
    pub forecast_price_dk1: f64,
    pub forecast_price_dk2: f64,
    pub auction_price_dk1: Option<f64>,
    pub auction_price_dk2: Option<f64>,
    pub auction_group: AuctionGroup,
    pub region: Region,
    pub source_file: PathBuf,
}

impl MergedRow {
    /// Forecast price for a region.
    #[inline]
    pub fn forecast_price(&self, region: Region) -> f64 {
        match region {
            Region::Dk1 => self.forecast_price_dk1,
            Region::Dk2 => self.forecast_price_dk2,
        }
    }

    /// Auction price for a region.
    #[inline]
    pub fn auction_price(&self, region: Region) -> Option<f64> {
        match region {
            Region::Dk1 => self.auction_price_dk1,
            Region::Dk2 => self.auction_price_dk2,
        }
    }

    /// Mutable auction price slot for a region.
    #[inline]
    pub fn auction_price_mut(&mut self, region: Region) -> &mut Option<f64> {
        match region {
            Region::Dk1 => &mut self.auction_price_dk1,
            Region::Dk2 => &mut self.auction_price_dk2,
        }
    }

    /// Forecast minus auction price, if the auction price is known.
    #[inline]
    pub fn price_diff(&self, region: Region) -> Option<f64> {
        self.auction_price(region)
            .map(|auction| self.forecast_price(region) - auction)
    }

    /// True when no region carries an auction price.
    pub fn has_no_auction_price(&self) -> bool {
        Region::ALL.iter().all(|&r| self.auction_price(r).is_none())
    }
}

impl From<MatchedRow> for MergedRow {
    /// Place the matched auction price in its own region's column.
    fn from(row: MatchedRow) -> Self {
        let mut merged = MergedRow {
            horizon_time: row.horizon_time,
            issuance_time: row.issuance_time,
            forecast_price_dk1: row.forecast_price_dk1,
            forecast_price_dk2: row.forecast_price_dk2,
            auction_price_dk1: None,
            auction_price_dk2: None,
            auction_group: row.auction_group,
            region: row.region,
            source_file: row.source_file,
        };
        *merged.auction_price_mut(row.region) = row.auction_price;
        merged
    }
}

/// The consolidated comparison table, sorted by horizon time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedTable {
    pub rows: Vec<MergedRow>,
}

impl MergedTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest horizon time.
    pub fn time_span(&self) -> Option<(Timestamp, Timestamp)> {
        let first = self.rows.first()?.horizon_time;
        let last = self.rows.last()?.horizon_time;
        Some((first, last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn test_delivery_date_rule() {
        let written = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(
            AuctionGroup::Ida1.delivery_date(written),
            NaiveDate::from_ymd_opt(2024, 1, 11).unwrap()
        );
        assert_eq!(
            AuctionGroup::Ida2.delivery_date(written),
            NaiveDate::from_ymd_opt(2024, 1, 11).unwrap()
        );
        assert_eq!(AuctionGroup::Ida3.delivery_date(written), written);
    }

    #[test]
    fn test_issuance_hours() {
        assert_eq!(AuctionGroup::Ida1.issuance_hour(), 15);
        assert_eq!(AuctionGroup::Ida2.issuance_hour(), 22);
        assert_eq!(AuctionGroup::Ida3.issuance_hour(), 10);
        assert_eq!(AuctionGroup::Ida3.first_delivery_hour(), 12);
    }

    #[test]
    fn test_classify_file_names() {
        assert_eq!(Region::from_file_name("IDA1_DK1_20240110_120000.xlsx"), Region::Dk1);
        assert_eq!(Region::from_file_name("IDA1_DK2_20240110_120000.xlsx"), Region::Dk2);
        // No region token falls through to DK2
        assert_eq!(Region::from_file_name("results.csv"), Region::Dk2);

        assert_eq!(AuctionGroup::from_file_name("IDA2_DK1.csv"), AuctionGroup::Ida2);
        assert_eq!(AuctionGroup::from_file_name("auction_DK1.csv"), AuctionGroup::Ida3);
    }

    #[test]
    fn test_parse_round_trip_tokens() {
        assert_eq!("dk1".parse::<Region>().unwrap(), Region::Dk1);
        assert_eq!("IDA3".parse::<AuctionGroup>().unwrap(), AuctionGroup::Ida3);
        assert!("DK3".parse::<Region>().is_err());
    }

    #[test]
    fn test_matched_row_lands_in_own_column() {
        let row = MatchedRow {
            horizon_time: ts("2024-01-11 05:00:00"),
            issuance_time: ts("2024-01-10 15:00:00"),
            forecast_price_dk1: 50.0,
            forecast_price_dk2: 52.0,
            auction_price: Some(47.5),
            auction_group: AuctionGroup::Ida1,
            region: Region::Dk2,
            source_file: PathBuf::from("IDA1_DK2.csv"),
        };
        let merged = MergedRow::from(row);
        assert_eq!(merged.auction_price_dk1, None);
        assert_eq!(merged.auction_price_dk2, Some(47.5));
        assert_eq!(merged.price_diff(Region::Dk2), Some(4.5));
        assert_eq!(merged.price_diff(Region::Dk1), None);
        assert!(!merged.has_no_auction_price());
    }

    #[test]
    fn test_entry_display_names_context() {
        let entry = AuctionCatalogEntry::new(
            "data/IDA3_DK1_10.01.2024.csv",
            Region::Dk1,
            AuctionGroup::Ida3,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        );
        let text = entry.to_string();
        assert!(text.contains("IDA3"));
        assert!(text.contains("DK1"));
        assert!(text.contains("2024-01-10"));
        assert!(text.contains("IDA3_DK1_10.01.2024.csv"));
    }
}
