//! State management module
//!
//! Handles the replication cursor's external form and resumability.
//! State is persisted between runs so a sync picks up where the last one
//! stopped.
//!
//! # Overview
//!
//! The state module provides:
//! - `SyncState` - The durable `{ "start_date": ... }` checkpoint
//! - `StateManager` - Loading state from a file or inline JSON, and
//!   writing the final checkpoint back to disk

mod manager;
mod types;

pub use manager::StateManager;
pub use types::SyncState;
