//! Forecast accuracy metrics.
//!
//! Compares forecast prices with auction prices per region.

use ida_core::{MergedRow, Region};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Substitute denominator for zero auction prices in MAPE.
pub const MAPE_EPSILON: f64 = 1e-10;

/// Accuracy metrics for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetrics {
    /// Region the metrics cover.
    pub region: Region,
    /// Rows with an auction price for the region.
    pub count: usize,
    /// Mean absolute error.
    pub mae: f64,
    /// Mean squared error.
    pub mse: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute percentage error (as a fraction).
    pub mape: f64,
}

impl ForecastMetrics {
    /// Metrics with no samples.
    pub fn empty(region: Region) -> Self {
        Self {
            region,
            count: 0,
            mae: 0.0,
            mse: 0.0,
            rmse: 0.0,
            mape: 0.0,
        }
    }

    /// Compute metrics over rows carrying an auction price for `region`.
    pub fn compute(rows: &[MergedRow], region: Region) -> Self {
        let pairs = rows
            .iter()
            .filter_map(|row| Some((row.forecast_price(region), row.auction_price(region)?)));
        Self::from_pairs(region, pairs)
    }

    /// Compute metrics for both regions.
    pub fn compute_all(rows: &[MergedRow]) -> Vec<Self> {
        Region::ALL.iter().map(|&r| Self::compute(rows, r)).collect()
    }

    /// Compute metrics from `(forecast, auction)` pairs.
    pub fn from_pairs(region: Region, pairs: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut count = 0usize;
        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        let mut pct_sum = 0.0;

        for (forecast, auction) in pairs {
            let error = (forecast - auction).abs();
            let denominator = if auction == 0.0 { MAPE_EPSILON } else { auction };

            count += 1;
            abs_sum += error;
            sq_sum += error * error;
            pct_sum += error / denominator;
        }

        if count == 0 {
            return Self::empty(region);
        }

        let n = count as f64;
        let mse = sq_sum / n;
        Self {
            region,
            count,
            mae: abs_sum / n,
            mse,
            rmse: mse.sqrt(),
            mape: pct_sum / n,
        }
    }
}

impl fmt::Display for ForecastMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = self.region;
        writeln!(f, "{region} forecast metrics ({} hours)", self.count)?;
        writeln!(f, "  MAE_{region}:  {:>12.4}", self.mae)?;
        writeln!(f, "  MSE_{region}:  {:>12.4}", self.mse)?;
        writeln!(f, "  RMSE_{region}: {:>12.4}", self.rmse)?;
        write!(f, "  MAPE_{region}: {:>12.4}", self.mape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use ida_core::AuctionGroup;
    use std::path::PathBuf;

    fn row(hour: u32, forecast_dk1: f64, auction_dk1: Option<f64>, auction_dk2: Option<f64>) -> MergedRow {
        let time = NaiveDate::from_ymd_opt(2024, 1, 11)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        MergedRow {
            horizon_time: time,
            issuance_time: time,
            forecast_price_dk1: forecast_dk1,
            forecast_price_dk2: 10.0,
            auction_price_dk1: auction_dk1,
            auction_price_dk2: auction_dk2,
            auction_group: AuctionGroup::Ida1,
            region: Region::Dk1,
            source_file: PathBuf::from("a.csv"),
        }
    }

    #[test]
    fn test_known_values() {
        let rows = vec![
            row(0, 1.0, Some(1.0), None),
            row(1, 2.0, Some(1.0), None),
            row(2, 3.0, Some(3.0), None),
        ];

        let m = ForecastMetrics::compute(&rows, Region::Dk1);

        assert_eq!(m.count, 3);
        assert_relative_eq!(m.mae, 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(m.mse, 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(m.rmse, 0.5774, epsilon = 1e-4);
        assert_relative_eq!(m.mape, 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_null_auction_prices_skipped() {
        let rows = vec![
            row(0, 4.0, Some(2.0), Some(10.0)),
            row(1, 100.0, None, Some(12.0)),
        ];

        let dk1 = ForecastMetrics::compute(&rows, Region::Dk1);
        assert_eq!(dk1.count, 1);
        assert_relative_eq!(dk1.mae, 2.0);
        assert_relative_eq!(dk1.mape, 1.0);

        let dk2 = ForecastMetrics::compute(&rows, Region::Dk2);
        assert_eq!(dk2.count, 2);
        assert_relative_eq!(dk2.mae, 1.0);
        assert_relative_eq!(dk2.mse, 2.0);
    }

    #[test]
    fn test_zero_auction_price_uses_epsilon() {
        let m = ForecastMetrics::from_pairs(Region::Dk1, [(1.0, 0.0)]);
        assert_relative_eq!(m.mape, 1.0 / MAPE_EPSILON);
    }

    #[test]
    fn test_no_samples() {
        let m = ForecastMetrics::compute(&[row(0, 1.0, None, Some(2.0))], Region::Dk1);
        assert_eq!(m, ForecastMetrics::empty(Region::Dk1));
        assert_eq!(ForecastMetrics::compute_all(&[]).len(), 2);
    }

    #[test]
    fn test_display() {
        let m = ForecastMetrics::from_pairs(Region::Dk2, [(2.0, 1.0)]);
        let text = m.to_string();
        assert!(text.starts_with("DK2 forecast metrics (1 hours)"));
        assert!(text.contains("RMSE_DK2"));
    }
}
