//! Hourly bucket building from 15-minute auction prices.
//!
//! Averages quarter-hour prices per (calendar date, hour).

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use ida_core::{AuctionGroup, AuctionHourlyPrice, Region, Timestamp};
use std::collections::BTreeMap;

/// Length of one auction interval.
pub const INTERVAL_MINUTES: i64 = 15;

/// An hour that's currently being accumulated.
#[derive(Debug, Clone)]
struct HourInProgress {
    first_start: Timestamp,
    price_sum: f64,
    count: u32,
}

impl HourInProgress {
    fn new(start: Timestamp) -> Self {
        Self {
            first_start: start,
            price_sum: 0.0,
            count: 0,
        }
    }

    fn add_interval(&mut self, start: Timestamp, price: f64) {
        self.first_start = self.first_start.min(start);
        self.price_sum += price;
        self.count += 1;
    }

    fn to_hourly(&self, region: Region) -> AuctionHourlyPrice {
        AuctionHourlyPrice {
            region,
            start_time: self.first_start,
            price: self.price_sum / self.count as f64,
        }
    }
}

/// Builder for hourly average prices from quarter-hour intervals.
#[derive(Debug, Default)]
pub struct HourlyAggregator {
    /// Hours being built, keyed by (date, hour).
    hours: BTreeMap<(NaiveDate, u32), HourInProgress>,
}

impl HourlyAggregator {
    /// Create a new aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one interval price.
    pub fn add_interval(&mut self, start: Timestamp, price: f64) {
        let key = (start.date(), start.hour());
        self.hours
            .entry(key)
            .or_insert_with(|| HourInProgress::new(start))
            .add_interval(start, price);
    }

    /// Add consecutive interval prices starting at `first_start`.
    pub fn add_sequence(&mut self, first_start: Timestamp, prices: &[f64]) {
        for (start, &price) in interval_starts(first_start).zip(prices) {
            self.add_interval(start, price);
        }
    }

    /// Number of hours currently being built.
    pub fn pending_hour_count(&self) -> usize {
        self.hours.len()
    }

    /// Emit one price per hour, sorted by start time.
    pub fn finalize(self, region: Region) -> Vec<AuctionHourlyPrice> {
        let mut hourly: Vec<AuctionHourlyPrice> =
            self.hours.values().map(|h| h.to_hourly(region)).collect();
        hourly.sort_by_key(|h| h.start_time);
        hourly
    }
}

/// Start of the first interval of an auction delivered on `delivery_date`.
pub fn first_interval_start(delivery_date: NaiveDate, group: AuctionGroup) -> Timestamp {
    let time = NaiveTime::from_hms_opt(group.first_delivery_hour(), 0, 0).unwrap_or(NaiveTime::MIN);
    delivery_date.and_time(time)
}

/// Endless sequence of interval starts, 15 minutes apart.
pub fn interval_starts(first_start: Timestamp) -> impl Iterator<Item = Timestamp> {
    (0i64..).map(move |i| first_start + Duration::minutes(i * INTERVAL_MINUTES))
}
