//! Merging per-auction matches into one table.
//!
//! Every matched row carries a single auction price for its own region. Rows
//! sharing a horizon time are compacted so that each region column holds its
//! non-null prices first, then rows with no price left in any region are
//! dropped.

use ida_core::{MatchedRow, MergedRow, MergedTable, Region, Timestamp};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Merge the matched tables of every auction, in catalog order.
pub fn merge_matches(tables: &[Vec<MatchedRow>]) -> MergedTable {
    let mut groups: BTreeMap<Timestamp, Vec<MergedRow>> = BTreeMap::new();
    for row in tables.iter().flatten() {
        groups
            .entry(row.horizon_time)
            .or_default()
            .push(MergedRow::from(row.clone()));
    }

    let input_rows: usize = tables.iter().map(Vec::len).sum();
    let mut rows = Vec::with_capacity(input_rows);
    for (_, mut group) in groups {
        group.sort_by(row_order);
        compact_group(&mut group);
        rows.extend(group.into_iter().filter(|r| !r.has_no_auction_price()));
    }

    debug!(
        tables = tables.len(),
        input_rows,
        merged_rows = rows.len(),
        "Merged matches"
    );

    MergedTable { rows }
}

/// Order within one horizon group: catalog order (region, auction group),
/// so compacted prices stay on the rows of the auction group they came from.
fn row_order(a: &MergedRow, b: &MergedRow) -> Ordering {
    (a.region, a.auction_group, a.issuance_time, &a.source_file).cmp(&(
        b.region,
        b.auction_group,
        b.issuance_time,
        &b.source_file,
    ))
}

/// Move each region's non-null prices to the front of the group.
fn compact_group(group: &mut [MergedRow]) {
    for region in Region::ALL {
        let present = group.iter().fold(Vec::new(), |mut acc, row| {
            if let Some(price) = row.auction_price(region) {
                acc.push(price);
            }
            acc
        });
        for (i, row) in group.iter_mut().enumerate() {
            *row.auction_price_mut(region) = present.get(i).copied();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use ida_core::{AuctionGroup, TIMESTAMP_FORMAT};
    use std::path::PathBuf;

    fn ts(s: &str) -> Timestamp {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn matched(
        horizon: &str,
        issued: &str,
        region: Region,
        group: AuctionGroup,
        price: Option<f64>,
        file: &str,
    ) -> MatchedRow {
        MatchedRow {
            horizon_time: ts(horizon),
            issuance_time: ts(issued),
            forecast_price_dk1: 50.0,
            forecast_price_dk2: 60.0,
            auction_price: price,
            auction_group: group,
            region,
            source_file: PathBuf::from(file),
        }
    }

    #[test]
    fn test_regions_share_one_row() {
        let dk1 = vec![matched(
            "2024-01-11 05:00:00",
            "2024-01-10 15:00:00",
            Region::Dk1,
            AuctionGroup::Ida1,
            Some(5.0),
            "dk1.csv",
        )];
        let dk2 = vec![matched(
            "2024-01-11 05:00:00",
            "2024-01-10 15:00:00",
            Region::Dk2,
            AuctionGroup::Ida1,
            Some(7.0),
            "dk2.csv",
        )];

        let merged = merge_matches(&[dk1, dk2]);

        assert_eq!(merged.len(), 1);
        let row = &merged.rows[0];
        assert_eq!(row.auction_price_dk1, Some(5.0));
        assert_eq!(row.auction_price_dk2, Some(7.0));
        assert_eq!(row.region, Region::Dk1);
        assert_eq!(row.price_diff(Region::Dk2), Some(53.0));
    }

    #[test]
    fn test_same_region_prices_stack() {
        let ida1 = vec![matched(
            "2024-01-11 14:00:00",
            "2024-01-10 15:00:00",
            Region::Dk1,
            AuctionGroup::Ida1,
            Some(30.0),
            "ida1.csv",
        )];
        let ida3 = vec![matched(
            "2024-01-11 14:00:00",
            "2024-01-11 10:00:00",
            Region::Dk1,
            AuctionGroup::Ida3,
            Some(35.0),
            "ida3.csv",
        )];

        let merged = merge_matches(&[ida3, ida1]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.rows[0].auction_price_dk1, Some(30.0));
        assert_eq!(merged.rows[1].auction_price_dk1, Some(35.0));
        assert!(merged.rows.iter().all(|r| r.auction_price_dk2.is_none()));
    }

    #[test]
    fn test_prices_stay_with_their_auction_group() {
        let with_forecast = |row: MatchedRow, forecast: f64| MatchedRow {
            forecast_price_dk1: forecast,
            forecast_price_dk2: forecast,
            ..row
        };
        let at = "2024-01-11 14:00:00";
        let ida1 = "2024-01-10 15:00:00";
        let ida3 = "2024-01-11 10:00:00";
        let tables = vec![
            vec![with_forecast(matched(at, ida1, Region::Dk1, AuctionGroup::Ida1, Some(54.0), "ida1_dk1.csv"), 74.0)],
            vec![with_forecast(matched(at, ida3, Region::Dk1, AuctionGroup::Ida3, Some(114.0), "ida3_dk1.csv"), 94.0)],
            vec![with_forecast(matched(at, ida1, Region::Dk2, AuctionGroup::Ida1, Some(69.0), "ida1_dk2.csv"), 74.0)],
            vec![with_forecast(matched(at, ida3, Region::Dk2, AuctionGroup::Ida3, Some(129.0), "ida3_dk2.csv"), 94.0)],
        ];

        let merged = merge_matches(&tables);

        assert_eq!(merged.len(), 2);
        let first = &merged.rows[0];
        assert_eq!(first.auction_group, AuctionGroup::Ida1);
        assert_eq!(first.issuance_time, ts(ida1));
        assert_eq!((first.auction_price_dk1, first.auction_price_dk2), (Some(54.0), Some(69.0)));
        assert_eq!(first.price_diff(Region::Dk1), Some(20.0));

        let second = &merged.rows[1];
        assert_eq!(second.auction_group, AuctionGroup::Ida3);
        assert_eq!(second.issuance_time, ts(ida3));
        assert_eq!((second.auction_price_dk1, second.auction_price_dk2), (Some(114.0), Some(129.0)));
        assert_eq!(second.price_diff(Region::Dk2), Some(-35.0));

        // Input order does not matter
        let reversed: Vec<_> = tables.into_iter().rev().collect();
        assert_eq!(merge_matches(&reversed), merged);
    }

    #[test]
    fn test_rows_without_prices_dropped() {
        let table = vec![
            matched("2024-01-11 00:00:00", "2024-01-10 15:00:00", Region::Dk1, AuctionGroup::Ida1, Some(1.0), "a.csv"),
            matched("2024-01-11 01:00:00", "2024-01-10 15:00:00", Region::Dk1, AuctionGroup::Ida1, None, "a.csv"),
            matched("2024-01-11 02:00:00", "2024-01-10 15:00:00", Region::Dk1, AuctionGroup::Ida1, Some(3.0), "a.csv"),
        ];

        let merged = merge_matches(&[table]);

        assert_eq!(merged.len(), 2);
        assert!(merged.rows.iter().all(|r| !r.has_no_auction_price()));
        assert_eq!(merged.rows[1].horizon_time, ts("2024-01-11 02:00:00"));
    }

    #[test]
    fn test_output_sorted_and_order_independent() {
        let a = vec![
            matched("2024-01-11 03:00:00", "2024-01-10 15:00:00", Region::Dk1, AuctionGroup::Ida1, Some(3.0), "a.csv"),
            matched("2024-01-11 01:00:00", "2024-01-10 15:00:00", Region::Dk1, AuctionGroup::Ida1, Some(1.0), "a.csv"),
        ];
        let b = vec![
            matched("2024-01-11 01:00:00", "2024-01-10 15:00:00", Region::Dk2, AuctionGroup::Ida1, Some(11.0), "b.csv"),
            matched("2024-01-11 02:00:00", "2024-01-10 15:00:00", Region::Dk2, AuctionGroup::Ida1, None, "b.csv"),
        ];

        let forward = merge_matches(&[a.clone(), b.clone()]);
        let backward = merge_matches(&[b, a]);

        assert_eq!(forward, backward);
        assert!(forward
            .rows
            .windows(2)
            .all(|w| w[0].horizon_time <= w[1].horizon_time));
        assert_eq!(forward.len(), 2);
        assert_eq!(forward.rows[0].auction_price_dk2, Some(11.0));
    }

    #[test]
    fn test_merge_is_deterministic() {
        let tables = vec![vec![
            matched("2024-01-11 00:00:00", "2024-01-10 15:00:00", Region::Dk2, AuctionGroup::Ida1, Some(2.0), "x.csv"),
            matched("2024-01-11 00:00:00", "2024-01-10 22:00:00", Region::Dk2, AuctionGroup::Ida2, Some(4.0), "y.csv"),
        ]];
        assert_eq!(merge_matches(&tables), merge_matches(&tables));
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_matches(&[]).is_empty());
        assert!(merge_matches(&[Vec::new()]).is_empty());
    }
}
