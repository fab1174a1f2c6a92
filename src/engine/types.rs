//! Engine types
//!
//! Message types and statistics for the sync engine.

use crate::schema::RunningSchema;
use crate::state::SyncState;
use crate::types::{JsonValue, KEY_PROPERTY, STREAM_NAME};
use serde_json::json;

/// A message emitted during sync
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Stream schema
    Schema {
        /// Stream name
        stream: String,
        /// JSON-schema document
        schema: JsonValue,
        /// Fields that identify a record
        key_properties: Vec<String>,
    },
    /// A single record
    Record {
        /// Stream name
        stream: String,
        /// The record
        record: JsonValue,
    },
    /// Checkpoint
    State {
        /// The durable state
        value: SyncState,
    },
}

impl Message {
    /// Create a schema message for the `exchange_rate` stream
    pub fn schema(schema: &RunningSchema) -> Self {
        Self::Schema {
            stream: STREAM_NAME.to_string(),
            schema: schema.to_json(),
            key_properties: vec![KEY_PROPERTY.to_string()],
        }
    }

    /// Create a record message for the `exchange_rate` stream
    pub fn record(record: JsonValue) -> Self {
        Self::Record {
            stream: STREAM_NAME.to_string(),
            record,
        }
    }

    /// Create a state message
    pub fn state(value: SyncState) -> Self {
        Self::State { value }
    }

    /// Check if this is a schema message
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a state message
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }

    /// Wire form, one object per message
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Schema {
                stream,
                schema,
                key_properties,
            } => json!({
                "type": "SCHEMA",
                "stream": stream,
                "schema": schema,
                "key_properties": key_properties,
            }),
            Self::Record { stream, record } => json!({
                "type": "RECORD",
                "stream": stream,
                "record": record,
            }),
            Self::State { value } => json!({
                "type": "STATE",
                "value": value.to_json(),
            }),
        }
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Days fetched and advanced past
    pub days_processed: usize,
    /// Records emitted
    pub records_emitted: usize,
    /// Days whose payload was for another date
    pub days_skipped: usize,
    /// Schema messages emitted
    pub schema_emissions: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a finished day
    pub fn add_day(&mut self) {
        self.days_processed += 1;
    }

    /// Count an emitted record
    pub fn add_record(&mut self) {
        self.records_emitted += 1;
    }

    /// Count a skipped day
    pub fn add_skipped(&mut self) {
        self.days_skipped += 1;
    }

    /// Count a schema emission
    pub fn add_schema(&mut self) {
        self.schema_emissions += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
