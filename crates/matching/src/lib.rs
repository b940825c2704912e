//! Forecast/auction matching for the comparison pipeline.
//!
//! This crate handles:
//! - Selecting the forecasts relevant to each auction
//! - Joining forecasts to hourly auction prices
//! - Merging per-auction joins into one table
//! - Running the whole pipeline, optionally in parallel

pub mod matcher;
pub mod merger;
pub mod pipeline;

pub use matcher::Matcher;
pub use merger::merge_matches;
pub use pipeline::{ComparisonPipeline, ComparisonRun};
