// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # tap-exchangerates
//!
//! An incremental extraction connector ("tap") for daily foreign-exchange
//! rates. It walks one UTC calendar day at a time from a saved cursor up to
//! today, and writes a schema-annotated record stream plus a resumable
//! checkpoint.
//!
//! ## Features
//!
//! - **Incremental Sync**: A single date cursor, resumed from saved state
//! - **Schema Evolution**: New currencies extend the stream schema
//! - **Retry with Backoff**: Constant delay plus jitter on 429 and 5xx
//! - **Gap Tolerance**: Days the API has no data for are skipped, not failed
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tap_exchangerates::config::TapConfig;
//! use tap_exchangerates::engine::SyncEngine;
//! use tap_exchangerates::http::{HttpClient, RetryPolicy};
//! use tap_exchangerates::output::{JsonLinesWriter, OutputFormat};
//!
//! #[tokio::main]
//! async fn main() -> tap_exchangerates::Result<()> {
//!     let config = TapConfig::new("my-key").with_start_date("2024-01-01");
//!     let client = HttpClient::with_config(config.http_config(RetryPolicy::default()))?;
//!
//!     let mut sink = JsonLinesWriter::stdout(OutputFormat::Json);
//!     let start = config.resolve_start_date(None, chrono::Utc::now().date_naive())?;
//!     let (state, result) = SyncEngine::new(client).run(start, &mut sink).await;
//!
//!     println!("next run starts at {}", state.start_date);
//!     result.map(|_| ())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Sync Engine                          │
//! │  cursor ≤ today → fetch → normalize → schema → emit → advance │
//! └──────────────────────────────────────────────────────────────┘
//!          │                    │                     │
//! ┌────────┴───────┬────────────┴──────────┬──────────┴─────────┐
//! │   HTTP         │   Payload / Schema    │   Output / State   │
//! ├────────────────┼───────────────────────┼────────────────────┤
//! │ GET /<day>     │ RatePayload           │ SCHEMA / RECORD    │
//! │ Retry + jitter │ NormalizedRecord      │ STATE              │
//! │ Classification │ RunningSchema         │ Cursor checkpoint  │
//! └────────────────┴───────────────────────┴────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types, constants and date helpers
pub mod types;

/// HTTP client with retry and backoff
pub mod http;

/// Rate payloads and normalized records
pub mod payload;

/// Stream schema
pub mod schema;

/// State management and checkpointing
pub mod state;

/// Message sinks
pub mod output;

/// Main execution engine
pub mod engine;

/// Tap configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::TapConfig;
pub use engine::{Message, SyncEngine, SyncStats};
pub use state::SyncState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
