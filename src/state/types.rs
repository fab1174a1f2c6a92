//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs.

use crate::types::{format_day, next_day};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Durable checkpoint of a run: the next day to replicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    /// Next day to fetch
    #[serde(with = "day_format")]
    pub start_date: NaiveDate,
}

impl SyncState {
    /// Create a state pointing at `start_date`
    pub fn new(start_date: NaiveDate) -> Self {
        Self { start_date }
    }

    /// Move the cursor one day forward
    pub fn advance(&mut self) {
        self.start_date = next_day(self.start_date);
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "start_date": format_day(self.start_date) })
    }
}

/// `YYYY-MM-DD` on the way out; anything `parse_start_date` accepts on the way in
mod day_format {
    use crate::types::{format_day, parse_start_date};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_day(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_start_date(&raw).map_err(serde::de::Error::custom)
    }
}
