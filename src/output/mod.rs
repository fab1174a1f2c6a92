//! Output module
//!
//! Writes the tap's message stream.
//!
//! # Overview
//!
//! This module provides:
//! - `MessageSink` - Where the engine sends SCHEMA, RECORD and STATE messages
//! - `JsonLinesWriter` - One JSON message per line on any `io::Write`
//! - `MemorySink` - Collects messages in memory

mod writer;

pub use writer::{JsonLinesWriter, MemorySink, MessageSink, OutputFormat};
