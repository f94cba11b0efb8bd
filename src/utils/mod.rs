//! Utility functions and helpers.

pub mod args;
pub mod http;

use chrono::NaiveDate;
use url::Url;

use crate::models::DATE_FORMAT;

/// Parse a strict `YYYY-MM-DD` date.
///
/// Unlike `NaiveDate::parse_from_str`, single-digit months/days and
/// surrounding whitespace are rejected.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Check that a string is a real calendar date in `YYYY-MM-DD` form.
pub fn validate_date(value: &str) -> bool {
    parse_date(value).is_some()
}

/// Check that a URL belongs to the publisher's official HTTPS origin.
pub fn is_official_source(url: &str, official_origin: &str) -> bool {
    let (Ok(candidate), Ok(official)) = (Url::parse(url), Url::parse(official_origin)) else {
        return false;
    };
    candidate.scheme() == "https" && candidate.origin() == official.origin()
}
