//! Per-auction forecast matching.
//!
//! For one catalog entry, picks the forecasts issued at the hour the auction
//! requires, narrows them to the auction's delivery window, and left-joins the
//! auction's hourly prices onto them.

use chrono::{Duration, Timelike};
use ida_core::{
    AuctionCatalogEntry, AuctionHourlyPrice, Error, ForecastRecord, MatchedRow, Result, Timestamp,
};
use ida_ingestion::{AuctionSource, ForecastSet};
use std::collections::BTreeMap;
use tracing::debug;

/// Matches catalog entries against a shared forecast set.
pub struct Matcher<'a, S: AuctionSource> {
    forecasts: &'a ForecastSet,
    source: &'a S,
}

impl<'a, S: AuctionSource> Matcher<'a, S> {
    /// Create a matcher over `forecasts`, reading auctions from `source`.
    pub fn new(forecasts: &'a ForecastSet, source: &'a S) -> Self {
        Self { forecasts, source }
    }

    /// Forecasts issued for the entry's auction, sorted by horizon time.
    ///
    /// Fails with [`Error::NoForecast`] when nothing was issued at the
    /// required hour on the delivery day or the day before.
    pub fn forecasts_for(&self, entry: &AuctionCatalogEntry) -> Result<Vec<&'a ForecastRecord>> {
        let hour = entry.auction_group.issuance_hour();
        let day_before = entry.delivery_date - Duration::days(1);

        let mut issued: Vec<&'a ForecastRecord> = self
            .forecasts
            .records()
            .iter()
            .filter(|r| {
                let date = r.issuance_time.date();
                (date == entry.delivery_date || date == day_before) && r.issuance_time.hour() == hour
            })
            .collect();

        if issued.is_empty() {
            return Err(Error::NoForecast {
                file_path: entry.file_path.clone(),
                delivery_date: entry.delivery_date,
                region: entry.region,
                auction_group: entry.auction_group,
                issuance_hour: hour,
            });
        }

        issued.sort_by_key(|r| r.horizon_time);
        Ok(issued)
    }

    /// Join the entry's auction prices onto its relevant forecasts.
    pub fn match_entry(&self, entry: &AuctionCatalogEntry) -> Result<Vec<MatchedRow>> {
        let issued = self.forecasts_for(entry)?;

        let auction = self.source.hourly_prices(entry)?;
        let (auction_start, auction_end) = span(auction.iter().map(|a| a.start_time))
            .ok_or_else(|| Error::read(&entry.file_path, "auction holds no hourly prices"))?;

        // Auctions cover 12 or 24 hours; only forecasts inside that window count.
        let relevant: Vec<&ForecastRecord> = issued
            .into_iter()
            .filter(|r| r.horizon_time >= auction_start && r.horizon_time <= auction_end)
            .collect();

        let Some((forecast_start, forecast_end)) = span(relevant.iter().map(|r| r.horizon_time))
        else {
            return Err(Error::NoRelevantForecast {
                file_path: entry.file_path.clone(),
                delivery_date: entry.delivery_date,
                region: entry.region,
                auction_group: entry.auction_group,
                window_start: auction_start,
                window_end: auction_end,
            });
        };

        let prices = hourly_index(&auction, forecast_start, forecast_end);

        let rows: Vec<MatchedRow> = relevant
            .iter()
            .map(|forecast| MatchedRow {
                horizon_time: forecast.horizon_time,
                issuance_time: forecast.issuance_time,
                forecast_price_dk1: forecast.forecast_price_dk1,
                forecast_price_dk2: forecast.forecast_price_dk2,
                auction_price: prices.get(&forecast.horizon_time).copied(),
                auction_group: entry.auction_group,
                region: entry.region,
                source_file: entry.file_path.clone(),
            })
            .collect();

        debug!(
            entry = %entry,
            forecasts = rows.len(),
            matched = rows.iter().filter(|r| r.auction_price.is_some()).count(),
            "Matched auction"
        );

        Ok(rows)
    }
}

/// Smallest and largest timestamp.
fn span(times: impl Iterator<Item = Timestamp>) -> Option<(Timestamp, Timestamp)> {
    times.fold(None, |acc, t| match acc {
        None => Some((t, t)),
        Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
    })
}

/// Auction prices inside `[start, end]`, keyed by hour start.
fn hourly_index(
    auction: &[AuctionHourlyPrice],
    start: Timestamp,
    end: Timestamp,
) -> BTreeMap<Timestamp, f64> {
    auction
        .iter()
        .filter(|a| a.start_time >= start && a.start_time <= end)
        .map(|a| (a.start_time, a.price))
        .collect()
}
