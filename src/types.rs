//! Common types used throughout the tap
//!
//! Shared type aliases, stream constants, and the calendar-date helpers
//! that every component uses to talk about replication days.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Stream Constants
// ============================================================================

/// Name of the single stream this tap produces
pub const STREAM_NAME: &str = "exchange_rate";

/// Key property declared in the stream's schema message
pub const KEY_PROPERTY: &str = "date";

/// Wire format of a replication day (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format of a record's `date` field
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// ============================================================================
// Dates
// ============================================================================

/// Parse a start date from config or state.
///
/// Accepts a plain `YYYY-MM-DD` date, an RFC 3339 datetime with offset, or a
/// naive datetime (taken as UTC). Zoned values are converted to UTC before
/// the time component is dropped.
pub fn parse_start_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.date());
        }
    }

    Err(Error::invalid_value(
        "start_date",
        format!("'{value}' is not a date or datetime"),
    ))
}

/// Format a replication day as `YYYY-MM-DD`
pub fn format_day(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

/// Midnight UTC timestamp for a replication day
pub fn day_timestamp(day: NaiveDate) -> String {
    day.and_hms_opt(0, 0, 0)
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

/// The day after `day`, saturating at the end of the calendar
pub fn next_day(day: NaiveDate) -> NaiveDate {
    day.succ_opt().unwrap_or(day)
}

// ============================================================================
// Clock
// ============================================================================

/// Source of the current UTC date.
///
/// The engine reads "today" only through this trait.
pub trait Clock: Send + Sync {
    /// Current calendar date in UTC
    fn today(&self) -> NaiveDate;
}

/// Wall clock in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// A clock pinned to one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
