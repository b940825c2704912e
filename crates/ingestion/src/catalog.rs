//! Auction catalog building.
//!
//! Discovers auction result files under a directory and classifies each one
//! by region, auction group and delivery date.

use crate::date_probe::date_from_str;
use chrono::NaiveDate;
use ida_core::{AuctionCatalogEntry, AuctionGroup, Error, Region, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Ordered set of auction result files.
#[derive(Debug, Clone, Default)]
pub struct AuctionCatalog {
    /// Entries in (delivery date, region, group, path) order.
    entries: Vec<AuctionCatalogEntry>,
    /// Files dropped because their name holds no date.
    skipped: Vec<PathBuf>,
}

impl AuctionCatalog {
    /// Build a catalog from pre-classified entries.
    pub fn from_entries(mut entries: Vec<AuctionCatalogEntry>) -> Self {
        entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Self {
            entries,
            skipped: Vec::new(),
        }
    }

    /// Recursively scan `dir` for files with one of `extensions`.
    pub fn scan(dir: &Path, extensions: &[String]) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::config(format!(
                "auction directory {} does not exist or is not a directory",
                dir.display()
            )));
        }

        let extensions: Vec<String> = extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();

        let mut files = Vec::new();
        collect_files(dir, &extensions, &mut files)?;
        files.sort();

        let mut entries = Vec::with_capacity(files.len());
        let mut skipped = Vec::new();
        for path in files {
            match classify(&path) {
                Some(entry) => entries.push(entry),
                None => {
                    warn!(file = %path.display(), "No date found in auction filename, skipping");
                    skipped.push(path);
                }
            }
        }

        let mut catalog = Self::from_entries(entries);
        catalog.skipped = skipped;

        info!(
            dir = %dir.display(),
            entries = catalog.entries.len(),
            skipped = catalog.skipped.len(),
            "Built auction catalog"
        );
        Ok(catalog)
    }

    /// Keep only entries delivered on one of `dates`. Returns the number removed.
    pub fn retain_delivery_dates(&mut self, dates: &BTreeSet<NaiveDate>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| {
            let keep = dates.contains(&entry.delivery_date);
            if !keep {
                info!(
                    file = %entry.file_path.display(),
                    delivery_date = %entry.delivery_date,
                    "Auction delivery date not covered by forecasts, skipping"
                );
            }
            keep
        });
        before - self.entries.len()
    }

    /// Catalog entries in processing order.
    pub fn entries(&self) -> &[AuctionCatalogEntry] {
        &self.entries
    }

    /// Files excluded for lack of a date.
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Classify one file by its name. `None` when the name holds no date.
pub fn classify(path: &Path) -> Option<AuctionCatalogEntry> {
    let name = path.file_name()?.to_string_lossy();
    let written_date = date_from_str(&name)?;
    Some(AuctionCatalogEntry::new(
        path,
        Region::from_file_name(&name),
        AuctionGroup::from_file_name(&name),
        written_date,
    ))
}

fn collect_files(dir: &Path, extensions: &[String], out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, extensions, out)?;
        } else if has_extension(&path, extensions) {
            out.push(path);
        }
    }
    Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
