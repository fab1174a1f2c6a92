//! Tap configuration
//!
//! The config document is a JSON object supplied by the caller:
//!
//! ```json
//! { "access_key": "...", "start_date": "2024-01-01", "base_url": "..." }
//! ```
//!
//! Only `access_key` is required.

use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RetryPolicy, DEFAULT_BASE_URL};
use crate::types::{parse_start_date, JsonValue};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of a tap run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapConfig {
    /// Credential sent in the `apikey` header
    pub access_key: String,

    /// First day to replicate when no state exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    /// Override of the API endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl TapConfig {
    /// Create a config with only the access key set
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            start_date: None,
            base_url: None,
        }
    }

    /// Set the start date
    #[must_use]
    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build from a decoded JSON document, validating required fields
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::config("config must be a JSON object"));
        }

        match value.get("access_key") {
            Some(JsonValue::String(key)) if !key.is_empty() => {}
            Some(JsonValue::String(_)) => {
                return Err(Error::invalid_value("access_key", "must not be empty"))
            }
            Some(JsonValue::Null) | None => return Err(Error::missing_field("access_key")),
            Some(_) => return Err(Error::invalid_value("access_key", "must be a string")),
        }

        let config: Self = serde_json::from_value(value.clone())
            .map_err(|e| Error::config(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse an inline JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        Self::from_value(&value)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&contents)
    }

    /// Check the optional fields parse
    pub fn validate(&self) -> Result<()> {
        self.configured_start_date()?;
        if let Some(url) = &self.base_url {
            url::Url::parse(url).map_err(|e| Error::invalid_value("base_url", e.to_string()))?;
        }
        Ok(())
    }

    /// The configured start date, if one is set and non-empty
    pub fn configured_start_date(&self) -> Result<Option<NaiveDate>> {
        self.start_date
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(parse_start_date)
            .transpose()
    }

    /// Pick the first day to replicate.
    ///
    /// Persisted state wins over the configured start date, which wins over
    /// `today`.
    pub fn resolve_start_date(
        &self,
        persisted: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<NaiveDate> {
        if let Some(cursor) = persisted {
            return Ok(cursor);
        }
        Ok(self.configured_start_date()?.unwrap_or(today))
    }

    /// HTTP client configuration for this tap
    pub fn http_config(&self, retry: RetryPolicy) -> HttpClientConfig {
        HttpClientConfig::builder()
            .base_url(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
            .access_key(self.access_key.clone())
            .retry(retry)
            .build()
    }

    /// Description of the accepted config, for the `spec` command
    pub fn spec() -> JsonValue {
        serde_json::json!({
            "type": "object",
            "required": ["access_key"],
            "properties": {
                "access_key": {
                    "type": "string",
                    "description": "API key sent in the apikey header",
                    "secret": true
                },
                "start_date": {
                    "type": "string",
                    "description": "First day to replicate (YYYY-MM-DD or RFC 3339); defaults to today (UTC)"
                },
                "base_url": {
                    "type": "string",
                    "description": "API endpoint",
                    "default": DEFAULT_BASE_URL
                }
            }
        })
    }
}
