//! Best-effort timestamp inference for cell values
//!
//! Tries a fixed list of strict formats first, then falls back to lenient
//! parsing (RFC 3339 / RFC 2822 / a few common layouts). Parsing never
//! errors; values that match nothing yield `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::table::Cell;

/// Strict datetime layouts, tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%SZ",
    "%m/%d/%Y %H:%M:%S",
];

/// Strict date-only layouts; matches resolve to midnight
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Fallback layouts for values the strict list misses
const LENIENT_DATETIME_FORMATS: &[&str] = &["%Y/%m/%d %H:%M:%S", "%m-%d-%Y %H:%M:%S"];
const LENIENT_DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%m-%d-%Y", "%m/%d/%y", "%B %d, %Y", "%d %B %Y"];

/// Parse a cell into a timestamp, if it looks like one
///
/// Null cells and empty strings never match.
pub fn parse_timestamp(cell: &Cell) -> Option<NaiveDateTime> {
    if cell.is_null() {
        return None;
    }
    parse_timestamp_str(&cell.as_text())
}

/// Parse a raw string into a timestamp, if it looks like one
pub fn parse_timestamp_str(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    parse_lenient(value)
}

/// Lenient fallback for values outside the strict format list
///
/// Offset-carrying inputs are normalized to UTC before the offset is dropped.
fn parse_lenient(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.naive_utc());
    }

    for fmt in LENIENT_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }

    for fmt in LENIENT_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    None
}
