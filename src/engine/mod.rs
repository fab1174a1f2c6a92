//! Execution engine module
//!
//! The day-by-day replication loop.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Drives the cursor from the start date up to today (UTC)
//! - `Message` - SCHEMA, RECORD and STATE output
//! - `SyncStats` - Counters for a run
//!
//! Each day is atomic: it is fetched, normalized, its currencies are added to
//! the running schema, the schema is emitted if it differs from the previous
//! day's snapshot, the record is emitted if the payload is for the requested
//! day, and only then does the cursor move. Any error ends the run; the state
//! is flushed with the cursor of the last completed day either way.

mod types;

pub use types::{Message, SyncStats};

use crate::error::Result;
use crate::http::RateSource;
use crate::output::MessageSink;
use crate::schema::RunningSchema;
use crate::state::SyncState;
use crate::types::{format_day, Clock, SystemClock};
use chrono::NaiveDate;
use std::time::Instant;
use tracing::{debug, error, info};

/// Sync engine for orchestrating the replication loop
pub struct SyncEngine {
    /// Where daily payloads come from
    source: Box<dyn RateSource>,
    /// Where "today" comes from
    clock: Box<dyn Clock>,
    /// Statistics of the last run
    stats: SyncStats,
}

impl SyncEngine {
    /// Create a new sync engine reading the wall clock
    pub fn new(source: impl RateSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            clock: Box::new(SystemClock),
            stats: SyncStats::default(),
        }
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Replicate every day from `start_date` through today.
    ///
    /// Returns the final state alongside the outcome. The state has already
    /// been written to `sink` exactly once, on success and on failure.
    pub async fn run(
        &mut self,
        start_date: NaiveDate,
        sink: &mut dyn MessageSink,
    ) -> (SyncState, Result<SyncStats>) {
        let start = Instant::now();
        self.stats = SyncStats::default();

        let mut state = SyncState::new(start_date);
        let result = self.replicate(&mut state, sink).await;

        self.stats.set_duration(start.elapsed().as_millis() as u64);
        let flushed = sink.emit(&Message::state(state));

        match (result, flushed) {
            (Ok(()), Ok(())) => {
                info!(
                    days = self.stats.days_processed,
                    records = self.stats.records_emitted,
                    skipped = self.stats.days_skipped,
                    duration_ms = self.stats.duration_ms,
                    "Tap exiting normally"
                );
                (state, Ok(self.stats.clone()))
            }
            (Err(e), flushed) => {
                error!(
                    cursor = %format_day(state.start_date),
                    "Sync failed: {e}"
                );
                if let Err(flush_err) = flushed {
                    error!("Failed to flush state: {flush_err}");
                }
                (state, Err(e))
            }
            (Ok(()), Err(flush_err)) => {
                error!("Failed to flush state: {flush_err}");
                (state, Err(flush_err))
            }
        }
    }

    /// The loop proper; `state` only ever holds the cursor of a completed day
    async fn replicate(&mut self, state: &mut SyncState, sink: &mut dyn MessageSink) -> Result<()> {
        let mut schema = RunningSchema::new();
        let mut snapshot: Option<RunningSchema> = None;

        while state.start_date <= self.clock.today() {
            self.sync_day(state.start_date, &mut schema, &snapshot, sink)
                .await?;

            state.advance();
            snapshot = Some(schema.clone());
            self.stats.add_day();
        }

        Ok(())
    }

    async fn sync_day(
        &mut self,
        day: NaiveDate,
        schema: &mut RunningSchema,
        snapshot: &Option<RunningSchema>,
        sink: &mut dyn MessageSink,
    ) -> Result<()> {
        let requested = format_day(day);
        info!("Replicating exchange rate data from {requested}");

        let payload = self.source.fetch(day).await?;
        debug!(?payload, "Received payload");

        let record = payload.normalize(day);

        let added = schema.observe_all(payload.currencies());
        if added > 0 {
            debug!("Schema gained {added} currency field(s)");
        }

        if snapshot.as_ref() != Some(&*schema) {
            sink.emit(&Message::schema(schema))?;
            self.stats.add_schema();
        }

        if payload.is_for(&requested) {
            sink.emit(&Message::record(record.into_value()))?;
            self.stats.add_record();
        } else {
            info!(
                "No rates for {requested} (API answered for {}), skipping",
                payload.date
            );
            self.stats.add_skipped();
        }

        Ok(())
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
