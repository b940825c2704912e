//! SVG charts of the comparison results.

use chrono::{DateTime, Duration, Utc};
use ida_core::{Error, MergedTable, Region, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

/// Number of histogram bins.
pub const HISTOGRAM_BINS: usize = 30;

type DrawResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// One histogram bin: `[lower, upper)`, the last bin closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram over the finite values.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

fn region_color(region: Region) -> RGBColor {
    match region {
        Region::Dk1 => BLUE,
        Region::Dk2 => GREEN,
    }
}

/// Side-by-side histograms of the price differences per region.
pub fn plot_price_diff_dist(table: &MergedTable, path: &Path) -> Result<()> {
    draw_price_diff_dist(table, path).map_err(Error::plot)?;
    info!(file = %path.display(), "Wrote price difference distribution");
    Ok(())
}

fn draw_price_diff_dist(table: &MergedTable, path: &Path) -> DrawResult<()> {
    let root = SVGBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));

    for (panel, region) in panels.iter().zip(Region::ALL) {
        let diffs: Vec<f64> = table
            .rows
            .iter()
            .filter_map(|r| r.price_diff(region))
            .collect();
        draw_histogram(panel, region, &histogram(&diffs, HISTOGRAM_BINS))?;
    }

    root.present()?;
    Ok(())
}

fn draw_histogram(
    area: &DrawingArea<SVGBackend, Shift>,
    region: Region,
    bins: &[Bin],
) -> DrawResult<()> {
    let (x_min, x_max) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.lower, last.upper),
        _ => (0.0, 1.0),
    };
    let y_max = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64 * 1.05;

    let mut chart = ChartBuilder::on(area)
        .caption(
            format!("Price Difference Distribution for {region}"),
            ("sans-serif", 20),
        )
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc(format!("Price Difference ({region})"))
        .y_desc("Frequency")
        .draw()?;

    let color = region_color(region);
    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], color.filled())
    }))?;
    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], BLACK.stroke_width(1))
    }))?;

    Ok(())
}

/// Stacked panels with auction price, forecast price and price difference.
pub fn plot_prices_and_diffs(table: &MergedTable, path: &Path) -> Result<()> {
    draw_prices_and_diffs(table, path).map_err(Error::plot)?;
    info!(file = %path.display(), "Wrote price comparison chart");
    Ok(())
}

fn draw_prices_and_diffs(table: &MergedTable, path: &Path) -> DrawResult<()> {
    let root = SVGBackend::new(path, (1200, 1000)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 1));

    for (panel, region) in panels.iter().zip(Region::ALL) {
        draw_price_panel(panel, table, region)?;
    }

    root.present()?;
    Ok(())
}

fn draw_price_panel(
    area: &DrawingArea<SVGBackend, Shift>,
    table: &MergedTable,
    region: Region,
) -> DrawResult<()> {
    let auction: Vec<(DateTime<Utc>, f64)> = table
        .rows
        .iter()
        .filter_map(|r| Some((r.horizon_time.and_utc(), r.auction_price(region)?)))
        .collect();
    let forecast: Vec<(DateTime<Utc>, f64)> = table
        .rows
        .iter()
        .map(|r| (r.horizon_time.and_utc(), r.forecast_price(region)))
        .collect();
    let diffs: Vec<(DateTime<Utc>, f64)> = table
        .rows
        .iter()
        .filter_map(|r| Some((r.horizon_time.and_utc(), r.price_diff(region)?)))
        .collect();

    let (start, end) = match table.time_span() {
        Some((start, end)) if start < end => (start.and_utc(), end.and_utc()),
        Some((start, _)) => (start.and_utc(), start.and_utc() + Duration::hours(1)),
        None => {
            let epoch = DateTime::<Utc>::default();
            (epoch, epoch + Duration::hours(1))
        }
    };

    let values = auction.iter().chain(&forecast).chain(&diffs).map(|(_, v)| *v);
    let (y_min, y_max) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = ((y_max - y_min) * 0.05).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(
            format!("{region}: Auction Price, Forecasted Price, and Price Difference"),
            ("sans-serif", 20),
        )
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(start..end, (y_min - pad)..(y_max + pad))?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Price")
        .x_labels(12)
        .x_label_formatter(&|dt| dt.format("%m-%d %H:%M").to_string())
        .draw()?;

    let bar_width = Duration::minutes(40);
    chart
        .draw_series(diffs.iter().map(|&(t, d)| {
            Rectangle::new([(t, 0.0), (t + bar_width, d)], BLACK.mix(0.5).filled())
        }))?
        .label(format!("Price Difference {region}"))
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], BLACK.mix(0.5).filled()));

    chart
        .draw_series(LineSeries::new(auction.iter().copied(), &BLUE))?
        .label(format!("Auction Price {region}"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], BLUE));

    chart
        .draw_series(LineSeries::new(forecast.iter().copied(), &RED).point_size(2))?
        .label(format!("Forecasted Price {region}"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}
