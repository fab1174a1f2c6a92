//! CLI module
//!
//! Command-line interface for running the tap.
//!
//! # Commands
//!
//! - `read` - Replicate rates (the default when no command is given)
//! - `check` - Test credentials against the API
//! - `spec` - Print the config specification

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
