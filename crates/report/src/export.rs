//! CSV export of the merged table.

use ida_core::{MergedRow, MergedTable, Region, Result, TIMESTAMP_FORMAT};
use std::path::Path;
use tracing::info;

/// A column of the results file.
struct Column {
    name: &'static str,
    value: fn(&MergedRow) -> String,
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Every exported column, in declaration order.
fn columns() -> Vec<Column> {
    vec![
        Column { name: "horizon_time", value: |r| r.horizon_time.format(TIMESTAMP_FORMAT).to_string() },
        Column { name: "issuance_time", value: |r| r.issuance_time.format(TIMESTAMP_FORMAT).to_string() },
        Column { name: "forecast_price_dk1", value: |r| r.forecast_price_dk1.to_string() },
        Column { name: "forecast_price_dk2", value: |r| r.forecast_price_dk2.to_string() },
        Column { name: "auction_price_dk1", value: |r| optional(r.auction_price_dk1) },
        Column { name: "auction_price_dk2", value: |r| optional(r.auction_price_dk2) },
        Column { name: "price_diff_dk1", value: |r| optional(r.price_diff(Region::Dk1)) },
        Column { name: "price_diff_dk2", value: |r| optional(r.price_diff(Region::Dk2)) },
        Column { name: "auction_group", value: |r| r.auction_group.to_string() },
        Column { name: "region", value: |r| r.region.to_string() },
        Column { name: "auction_filepath", value: |r| r.source_file.display().to_string() },
    ]
}

/// Rank of a column name: file paths, then times, then prices, then the rest.
fn column_rank(name: &str) -> u8 {
    let lower = name.to_lowercase();
    if lower.contains("filepath") {
        0
    } else if lower.contains("time") {
        1
    } else if lower.contains("price") {
        2
    } else {
        3
    }
}

/// Sort key: rank group first, then case-insensitive name.
fn column_key(name: &str) -> (u8, String) {
    (column_rank(name), name.to_lowercase())
}

/// Order column names for readability, case-insensitively within each group.
pub fn order_columns<'a>(names: &[&'a str]) -> Vec<&'a str> {
    let mut ordered = names.to_vec();
    ordered.sort_by_key(|name| column_key(name));
    ordered
}

/// Exported columns in file order.
fn ordered_columns() -> Vec<Column> {
    let mut columns = columns();
    columns.sort_by_key(|c| column_key(c.name));
    columns
}

/// Header of the results file.
pub fn header() -> Vec<&'static str> {
    ordered_columns().iter().map(|c| c.name).collect()
}

/// Write the merged table as CSV.
pub fn write_results_csv(table: &MergedTable, path: &Path) -> Result<()> {
    let columns = ordered_columns();

    let mut writer = csv::Writer::from_path(path).map_err(std::io::Error::from)?;
    writer
        .write_record(columns.iter().map(|c| c.name))
        .map_err(std::io::Error::from)?;
    for row in &table.rows {
        writer
            .write_record(columns.iter().map(|c| (c.value)(row)))
            .map_err(std::io::Error::from)?;
    }
    writer.flush()?;

    info!(
        file = %path.display(),
        rows = table.len(),
        "Wrote results CSV"
    );
    Ok(())
}
