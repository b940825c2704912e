//! End-to-end comparison pipeline.
//!
//! Loads forecasts, builds the auction catalog, matches every auction against
//! the forecasts and merges the results.

use crate::matcher::Matcher;
use crate::merger::merge_matches;
use ida_core::{AuctionCatalogEntry, Config, Error, MatchedRow, MergedTable, Result};
use ida_ingestion::{AuctionCatalog, AuctionReader, AuctionSource, ForecastSet};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// Output of one pipeline run.
#[derive(Debug, Clone)]
pub struct ComparisonRun {
    /// Merged forecast/auction table.
    pub table: MergedTable,
    /// Number of auctions matched.
    pub matched_auctions: usize,
    /// Auction files skipped for lack of a date in their name.
    pub skipped_files: Vec<PathBuf>,
}

/// Forecast vs. auction comparison pipeline.
pub struct ComparisonPipeline {
    config: Config,
}

impl ComparisonPipeline {
    /// Create a pipeline from configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full pipeline against the configured paths.
    pub fn run(&self) -> Result<ComparisonRun> {
        let paths = &self.config.paths;

        let forecasts = ForecastSet::load(&paths.forecast_path, &self.config.forecast)?;
        let mut catalog =
            AuctionCatalog::scan(&paths.auction_dir, &self.config.auction.accepted_extensions)?;
        catalog.retain_delivery_dates(&forecasts.horizon_dates());

        let reader = AuctionReader::from_config(&self.config.auction);
        let matches = self.match_all(&catalog, &forecasts, &reader)?;
        let table = merge_matches(&matches);

        info!(
            auctions = matches.len(),
            skipped = catalog.skipped().len(),
            rows = table.len(),
            "Comparison complete"
        );

        Ok(ComparisonRun {
            table,
            matched_auctions: matches.len(),
            skipped_files: catalog.skipped().to_vec(),
        })
    }

    /// Match every catalog entry, returning per-entry rows in catalog order.
    ///
    /// The first failing entry aborts the whole run.
    pub fn match_all<S: AuctionSource>(
        &self,
        catalog: &AuctionCatalog,
        forecasts: &ForecastSet,
        source: &S,
    ) -> Result<Vec<Vec<MatchedRow>>> {
        let matcher = Matcher::new(forecasts, source);
        let entries = catalog.entries();
        let workers = self.config.runtime.workers;

        info!(
            auctions = entries.len(),
            workers,
            "Matching auctions"
        );

        match workers {
            1 => entries
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    debug!(progress = i + 1, total = entries.len(), "Processing auction");
                    matcher.match_entry(entry)
                })
                .collect(),
            0 => match_parallel(&matcher, entries),
            n => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| Error::Other(format!("failed to build worker pool: {e}")))?;
                pool.install(|| match_parallel(&matcher, entries))
            }
        }
    }
}

fn match_parallel<S: AuctionSource>(
    matcher: &Matcher<'_, S>,
    entries: &[AuctionCatalogEntry],
) -> Result<Vec<Vec<MatchedRow>>> {
    entries
        .par_iter()
        .map(|entry| matcher.match_entry(entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ida_core::{AuctionGroup, AuctionHourlyPrice, ForecastRecord, Region};

    /// Flat auction: every hour of the delivery window at one price.
    struct FlatAuctions(f64);

    impl AuctionSource for FlatAuctions {
        fn hourly_prices(&self, entry: &AuctionCatalogEntry) -> Result<Vec<AuctionHourlyPrice>> {
            let first = entry.auction_group.first_delivery_hour();
            Ok((first..24)
                .map(|h| AuctionHourlyPrice {
                    region: entry.region,
                    start_time: entry.delivery_date.and_hms_opt(h, 0, 0).unwrap(),
                    price: self.0,
                })
                .collect())
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn forecasts() -> ForecastSet {
        let mut records = Vec::new();
        for written in 9..=12 {
            for h in 0..24 {
                records.push(ForecastRecord {
                    issuance_time: date(written).and_hms_opt(15, 0, 0).unwrap(),
                    horizon_time: date(written + 1).and_hms_opt(h, 0, 0).unwrap(),
                    forecast_price_dk1: h as f64,
                    forecast_price_dk2: h as f64 + 0.5,
                });
            }
        }
        ForecastSet::from_records(records, true).unwrap()
    }

    fn catalog() -> AuctionCatalog {
        let mut entries = Vec::new();
        for written in 9..=12 {
            for region in Region::ALL {
                entries.push(AuctionCatalogEntry::new(
                    format!("IDA1_{region}_202401{written:02}.csv"),
                    region,
                    AuctionGroup::Ida1,
                    date(written),
                ));
            }
        }
        AuctionCatalog::from_entries(entries)
    }

    fn pipeline(workers: usize) -> ComparisonPipeline {
        let mut config = Config::default();
        config.runtime.workers = workers;
        ComparisonPipeline::new(config)
    }

    #[test]
    fn test_worker_counts_agree() {
        let forecasts = forecasts();
        let catalog = catalog();
        let source = FlatAuctions(20.0);

        let sequential = pipeline(1).match_all(&catalog, &forecasts, &source).unwrap();
        let default_pool = pipeline(0).match_all(&catalog, &forecasts, &source).unwrap();
        let dedicated = pipeline(3).match_all(&catalog, &forecasts, &source).unwrap();

        assert_eq!(sequential.len(), 8);
        assert_eq!(sequential, default_pool);
        assert_eq!(sequential, dedicated);
        assert_eq!(merge_matches(&sequential), merge_matches(&dedicated));
    }

    #[test]
    fn test_results_in_catalog_order() {
        let forecasts = forecasts();
        let catalog = catalog();

        let matches = pipeline(2)
            .match_all(&catalog, &forecasts, &FlatAuctions(1.0))
            .unwrap();

        for (entry, rows) in catalog.entries().iter().zip(&matches) {
            assert_eq!(rows.len(), 24);
            assert!(rows.iter().all(|r| r.source_file == entry.file_path));
        }
    }

    #[test]
    fn test_first_error_aborts() {
        let forecasts = forecasts();
        let mut entries = catalog().entries().to_vec();
        // No forecasts are issued at 22:00
        entries.push(AuctionCatalogEntry::new(
            "IDA2_DK1_20240110.csv",
            Region::Dk1,
            AuctionGroup::Ida2,
            date(10),
        ));
        let catalog = AuctionCatalog::from_entries(entries);

        for workers in [0, 1, 2] {
            let err = pipeline(workers)
                .match_all(&catalog, &forecasts, &FlatAuctions(1.0))
                .unwrap_err();
            assert!(matches!(err, Error::NoForecast { .. }));
        }
    }
}
