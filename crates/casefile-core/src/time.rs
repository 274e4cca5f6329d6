//! Lenient timestamp parsing for message times and filter bounds
//!
//! Every parsed time is a naive UTC instant. Inputs carrying an offset and
//! epoch seconds are converted to UTC; text without an offset is taken to be
//! UTC already.

use crate::records::RawTime;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S %:z",
    "%Y-%m-%d %H:%M:%S%z",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Parses a timestamp in any of the formats seen in extraction dumps.
///
/// Accepts RFC 3339, common `Y-m-d H:M:S` variants with or without an
/// offset, bare dates (midnight), and epoch seconds. Returns `None` for
/// anything else.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(dt.naive_utc());
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    text.parse::<f64>().ok().and_then(from_epoch)
}

pub(crate) fn parse_raw_time(raw: &RawTime) -> Option<NaiveDateTime> {
    match raw {
        RawTime::Epoch(secs) => from_epoch(*secs),
        RawTime::Text(text) => parse_timestamp(text),
    }
}

fn from_epoch(secs: f64) -> Option<NaiveDateTime> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;
    DateTime::from_timestamp(whole as i64, nanos).map(|dt| dt.naive_utc())
}
