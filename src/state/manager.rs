//! State manager implementation
//!
//! Loads the input checkpoint and persists the final one with atomic writes.

use super::types::SyncState;
use crate::error::{Error, Result};
use crate::types::parse_start_date;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Shape of an input state document.
///
/// `start_date` may be absent, null, or empty; all mean "no cursor yet".
#[derive(Debug, Default, Deserialize)]
struct StoredState {
    #[serde(default)]
    start_date: Option<String>,
}

/// State manager for loading and persisting the replication checkpoint
#[derive(Debug, Clone)]
pub struct StateManager {
    /// Path to the state file (empty for in-memory)
    path: PathBuf,
    /// Cursor loaded at startup
    cursor: Option<NaiveDate>,
}

impl StateManager {
    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            cursor: None,
        }
    }

    /// Create a state manager from a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let cursor = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| Error::State {
                message: format!("Failed to read state file: {e}"),
            })?;
            if contents.trim().is_empty() {
                None
            } else {
                parse_cursor(&contents).map_err(|e| Error::State {
                    message: format!("Failed to parse state file: {e}"),
                })?
            }
        } else {
            None
        };

        Ok(Self { path, cursor })
    }

    /// Create a state manager from inline JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let cursor = parse_cursor(json).map_err(|e| Error::State {
            message: format!("Failed to parse state JSON: {e}"),
        })?;

        Ok(Self {
            path: PathBuf::new(),
            cursor,
        })
    }

    /// Cursor persisted by a previous run, if any
    pub fn cursor(&self) -> Option<NaiveDate> {
        self.cursor
    }

    /// Write a checkpoint to the state file
    pub async fn save(&self, state: &SyncState) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }
        self.save_to_file(&self.path, state).await
    }

    /// Write a checkpoint to a specific file path
    pub async fn save_to_file(&self, path: impl AsRef<Path>, state: &SyncState) -> Result<()> {
        let contents = serde_json::to_string_pretty(state).map_err(|e| Error::State {
            message: format!("Failed to serialize state: {e}"),
        })?;

        // Write to temp file first, then rename for atomicity
        let path = path.as_ref();
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::State {
                message: format!("Failed to write state file: {e}"),
            })?;

        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::State {
                message: format!("Failed to rename state file: {e}"),
            })?;

        Ok(())
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

fn parse_cursor(json: &str) -> Result<Option<NaiveDate>> {
    let stored: StoredState = serde_json::from_str(json)?;
    stored
        .start_date
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_start_date(&s))
        .transpose()
}
