//! Core types and configuration for the forecast/auction comparison.
//!
//! This crate provides shared types used across all other crates:
//! - Price regions and intraday auction groups
//! - Forecast, auction and matched row types
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
