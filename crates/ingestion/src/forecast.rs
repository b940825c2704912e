//! Forecast loading and validation.

use crate::table::{Cell, RawTable};
use chrono::{NaiveDate, NaiveDateTime};
use ida_core::config::{ForecastColumns, ForecastConfig};
use ida_core::{Error, ForecastRecord, Result, Timestamp, TIMESTAMP_FORMAT};
use std::collections::{BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Immutable set of forecast records, sorted by issuance time.
#[derive(Debug, Clone, Default)]
pub struct ForecastSet {
    records: Vec<ForecastRecord>,
}

impl ForecastSet {
    /// Load and validate a forecast CSV.
    pub fn load(path: &Path, config: &ForecastConfig) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::config(format!(
                "forecast path {} does not exist",
                path.display()
            )));
        }
        let file = std::fs::File::open(path)?;
        let set = Self::from_csv_reader(file, config)?;
        info!(
            file = %path.display(),
            records = set.len(),
            "Loaded forecasts"
        );
        Ok(set)
    }

    /// Parse forecasts from CSV content.
    pub fn from_csv_reader<R: Read>(reader: R, config: &ForecastConfig) -> Result<Self> {
        let table = RawTable::from_csv_reader(reader)?;
        let records = parse_records(table, &config.columns)?;
        Self::from_records(records, config.validate_unique)
    }

    /// Build from parsed records, sorting by issuance time.
    pub fn from_records(mut records: Vec<ForecastRecord>, validate_unique: bool) -> Result<Self> {
        records.sort_by_key(|r| r.issuance_time);
        if validate_unique && !check_unique_combinations(&records) {
            return Err(Error::config(
                "the combinations of issuance time and horizon time are not unique",
            ));
        }
        Ok(Self { records })
    }

    /// All records.
    pub fn records(&self) -> &[ForecastRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Calendar dates covered by forecast horizons.
    pub fn horizon_dates(&self) -> BTreeSet<NaiveDate> {
        self.records.iter().map(|r| r.horizon_time.date()).collect()
    }
}

/// True iff no two records share (issuance time, horizon time).
pub fn check_unique_combinations(records: &[ForecastRecord]) -> bool {
    let distinct: HashSet<(Timestamp, Timestamp)> = records
        .iter()
        .map(|r| (r.horizon_time, r.issuance_time))
        .collect();
    distinct.len() == records.len()
}

fn parse_records(mut table: RawTable, columns: &ForecastColumns) -> Result<Vec<ForecastRecord>> {
    let column = |name: &str| {
        table
            .column_index(name)
            .ok_or_else(|| Error::config(format!("forecast column '{name}' not found")))
    };
    let issuance_idx = column(&columns.issuance_time)?;
    let horizon_idx = column(&columns.horizon_time)?;
    let dk1_idx = column(&columns.price_dk1)?;
    let dk2_idx = column(&columns.price_dk2)?;

    table.drop_missing_rows();

    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Ok(ForecastRecord {
                issuance_time: parse_timestamp(&row[issuance_idx], i)?,
                horizon_time: parse_timestamp(&row[horizon_idx], i)?,
                forecast_price_dk1: parse_price(&row[dk1_idx], i)?,
                forecast_price_dk2: parse_price(&row[dk2_idx], i)?,
            })
        })
        .collect()
}

fn parse_timestamp(cell: &Cell, row: usize) -> Result<Timestamp> {
    let text = cell.as_text().unwrap_or_default();
    NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
        .map_err(|e| Error::data(format!("forecast row {}: invalid timestamp '{text}': {e}", row + 1)))
}

fn parse_price(cell: &Cell, row: usize) -> Result<f64> {
    cell.as_f64()
        .ok_or_else(|| Error::data(format!("forecast row {}: invalid price {cell:?}", row + 1)))
}
