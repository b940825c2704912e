//! Date detection in filenames.
//!
//! Probes a fixed, ordered list of date layouts. The first layout whose
//! pattern occurs in the input and whose first occurrence parses wins.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

/// `(chrono format, regex)` pairs in probing order.
const DATE_FORMATS: [(&str, &str); 10] = [
    ("%Y%m%d_%H%M%S", r"\d{4}\d{2}\d{2}_\d{2}\d{2}\d{2}"),
    ("%Y%m%dT%H%M%S", r"\d{4}\d{2}\d{2}T\d{2}\d{2}\d{2}"),
    ("%Y-%m-%dT%H:%M:%S", r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}"),
    ("%Y_%m_%d_%H_%M_%S", r"\d{4}_\d{2}_\d{2}_\d{2}_\d{2}_\d{2}"),
    ("%Y-%m-%d %H %M %S", r"\d{4}-\d{2}-\d{2} \d{2} \d{2} \d{2}"),
    ("%d%m%y_%H%M%S", r"\d{2}\d{2}\d{2}_\d{2}\d{2}\d{2}"),
    ("%H%M_%d%b%Y", r"\d{2}\d{2}_\d{2}[A-Za-z]{3}\d{4}"),
    ("%H%M%S_%d%b%Y", r"\d{2}\d{2}\d{2}_\d{2}[A-Za-z]{3}\d{4}"),
    ("%Y-%m-%d %H_%M_%S", r"\d{4}-\d{2}-\d{2} \d{2}_\d{2}_\d{2}"),
    ("%d.%m.%Y", r"\d{2}\.\d{2}\.\d{4}"),
];

static PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    DATE_FORMATS
        .iter()
        .map(|&(format, pattern)| {
            let re = Regex::new(pattern).expect("date patterns are valid regexes");
            (format, re)
        })
        .collect()
});

/// Parse a matched substring with a format that may or may not carry a time.
fn parse_with(matched: &str, format: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(matched, format)
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(matched, format))
        .ok()
}

/// Find the first date embedded in `input`.
pub fn date_from_str(input: &str) -> Option<NaiveDate> {
    PATTERNS.iter().find_map(|(format, re)| {
        let matched = re.find(input)?;
        parse_with(matched.as_str(), format)
    })
}
