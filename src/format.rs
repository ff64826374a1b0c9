//! Display helpers shared by every view: timestamps and wallet addresses.
//!
//! Both helpers are total. Input that cannot be interpreted is returned
//! unchanged so a malformed backend value still shows up on screen.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Addresses longer than this many characters are shortened.
pub const ADDRESS_TRUNCATE_THRESHOLD: usize = 12;
const ADDRESS_PREFIX_CHARS: usize = 6;
const ADDRESS_SUFFIX_CHARS: usize = 4;

/// How much of a timestamp to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// `Jan 15, 2024`
    Short,
    /// `January 15, 2024, 10:30 AM`
    Long,
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 (`2024-01-15T10:30:00Z`, with offset or fraction),
/// a naive `YYYY-MM-DDTHH:MM:SS[.fff]` taken as UTC, and a bare
/// `YYYY-MM-DD` date taken as midnight UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

/// Render a backend timestamp for display, in UTC.
///
/// Empty input renders as empty; unparseable input is returned as-is.
pub fn format_date(value: &str, style: DateStyle) -> String {
    if value.is_empty() {
        return String::new();
    }
    match parse_timestamp(value) {
        Some(dt) => match style {
            DateStyle::Short => dt.format("%b %-d, %Y").to_string(),
            DateStyle::Long => dt.format("%B %-d, %Y, %-I:%M %p").to_string(),
        },
        None => {
            tracing::debug!(value, "Unparseable date left unformatted");
            value.to_string()
        }
    }
}

/// Shorten a wallet address to `0x1234...cdef`.
///
/// Counts characters, so multi-byte input never splits a code point.
pub fn truncate_address(address: &str) -> String {
    let len = address.chars().count();
    if len <= ADDRESS_TRUNCATE_THRESHOLD {
        return address.to_string();
    }
    let prefix: String = address.chars().take(ADDRESS_PREFIX_CHARS).collect();
    let suffix: String = address.chars().skip(len - ADDRESS_SUFFIX_CHARS).collect();
    format!("{prefix}...{suffix}")
}
