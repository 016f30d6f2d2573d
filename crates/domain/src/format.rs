//! Display formatting shared by every platform adapter.
//!
//! Upstream APIs disagree about units, precision, and missing data; these
//! helpers are the single place where raw values become display values.

use chrono::{DateTime, Datelike, Utc};

use crate::profile::StatValue;

/// Marker for stats the platform did not report.
pub const NOT_AVAILABLE: &str = "N/A";

/// Group a count with thousands separators: `1234567` -> `"1,234,567"`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Fixed-precision rendering: `fixed(2.3456, 2)` -> `"2.35"`.
pub fn fixed(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

/// Fixed-precision rendering with a trailing suffix (`"%"`, `" hrs"`, ...).
pub fn fixed_with_suffix(value: f64, precision: usize, suffix: &str) -> String {
    format!("{value:.precision$}{suffix}")
}

/// Thousands-grouped count, or `"N/A"` when the platform omitted it.
pub fn count_or_na(value: Option<u64>) -> StatValue {
    match value {
        Some(n) => StatValue::Text(group_thousands(n)),
        None => StatValue::Text(NOT_AVAILABLE.to_string()),
    }
}

/// Fixed-precision number (plus optional suffix), or `"N/A"` when missing.
pub fn decimal_or_na(value: Option<f64>, precision: usize, suffix: &str) -> StatValue {
    match value {
        Some(v) => StatValue::Text(fixed_with_suffix(v, precision, suffix)),
        None => StatValue::Text(NOT_AVAILABLE.to_string()),
    }
}

/// Pass text through, or `"N/A"` when missing/blank.
pub fn text_or_na(value: Option<&str>) -> StatValue {
    match value {
        Some(s) if !s.trim().is_empty() => StatValue::Text(s.to_string()),
        _ => StatValue::Text(NOT_AVAILABLE.to_string()),
    }
}

/// Ellipsis truncation on a character boundary.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}...")
}

/// Render a Unix timestamp as a UTC datetime, `"Unknown"` for zero/invalid.
pub fn unix_timestamp(secs: i64) -> String {
    if secs <= 0 {
        return "Unknown".to_string();
    }
    match DateTime::<Utc>::from_timestamp(secs, 0) {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "Unknown".to_string(),
    }
}

/// Render an RFC 3339 datetime string; falls back to the input verbatim.
pub fn iso_datetime(value: &str) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(ts) => ts
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string(),
        Err(_) => value.to_string(),
    }
}

/// Render only the date part of an RFC 3339 datetime string.
pub fn iso_date(value: &str) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(ts) => ts.with_timezone(&Utc).format("%Y-%m-%d").to_string(),
        Err(_) => value.to_string(),
    }
}

/// Coarse account age ("8 years" / "3 months") from a creation timestamp.
///
/// `now` is passed in so callers with a fixed clock stay deterministic.
pub fn age_from_timestamp(created_secs: i64, now: DateTime<Utc>) -> String {
    let Some(created) = DateTime::<Utc>::from_timestamp(created_secs, 0) else {
        return "Unknown".to_string();
    };
    let months = (now.year() - created.year()) * 12 + (now.month() as i32 - created.month() as i32);
    let months = months.max(0);
    if months < 12 {
        format!("{months} months")
    } else {
        format!("{} years", months / 12)
    }
}
