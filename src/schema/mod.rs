//! Stream schema module
//!
//! Describes the `exchange_rate` stream as a JSON-schema-like document that
//! grows as new currencies are observed.
//!
//! # Features
//!
//! - **Property Types**: Single or nullable JSON types with format hints
//! - **Append-Only Growth**: Currency fields are added, never removed
//! - **Value Equality**: Snapshots compare structurally to detect changes

mod running;
mod types;

pub use running::RunningSchema;
pub use types::{JsonType, JsonTypeOrArray, SchemaProperty};
