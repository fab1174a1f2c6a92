//! Rate payloads and normalized records
//!
//! `RatePayload` is the typed form of one day's API response. Parsing it
//! is where malformed responses are detected; `normalize` flattens it into
//! the record shape the stream emits.

use crate::error::{Error, Result};
use crate::types::{day_timestamp, JsonObject, JsonValue};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One day's rates as returned by the API
#[derive(Debug, Clone, PartialEq)]
pub struct RatePayload {
    /// Currency every rate is quoted against
    pub base: String,
    /// Date the API says the rates belong to (`YYYY-MM-DD`)
    pub date: String,
    /// Currency code to rate; `None` when the API reports null
    pub rates: BTreeMap<String, Option<f64>>,
}

impl RatePayload {
    /// Parse a response body
    pub fn from_body(body: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(body)
            .map_err(|e| Error::malformed(format!("response is not JSON: {e}"), body))?;
        Self::from_value(&value)
    }

    /// Parse a decoded JSON response
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        let base = value
            .get("base")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::malformed("missing or non-string 'base'", value))?;

        let date = value
            .get("date")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::malformed("missing or non-string 'date'", value))?;

        let raw_rates = value
            .get("rates")
            .and_then(JsonValue::as_object)
            .ok_or_else(|| Error::malformed("missing or non-object 'rates'", value))?;

        let mut rates = BTreeMap::new();
        for (currency, rate) in raw_rates {
            let rate = match rate {
                JsonValue::Null => None,
                JsonValue::Number(n) => n.as_f64(),
                _ => {
                    return Err(Error::malformed(
                        format!("rate for '{currency}' is not a number"),
                        value,
                    ))
                }
            };
            rates.insert(currency.clone(), rate);
        }

        Ok(Self {
            base: base.to_string(),
            date: date.to_string(),
            rates,
        })
    }

    /// Whether the API answered for the requested day
    pub fn is_for(&self, day: &str) -> bool {
        self.date == day
    }

    /// Every currency code a record built from this payload carries
    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.rates
            .keys()
            .map(String::as_str)
            .chain(std::iter::once(self.base.as_str()))
    }

    /// Flatten into a record for `day`.
    ///
    /// The base currency's own rate is injected as `1.0` since the API omits it.
    pub fn normalize(&self, day: NaiveDate) -> NormalizedRecord {
        let mut fields = JsonObject::new();
        for (currency, rate) in &self.rates {
            fields.insert(currency.clone(), rate.map_or(JsonValue::Null, JsonValue::from));
        }
        fields.insert(self.base.clone(), JsonValue::from(1.0));
        fields.insert("base".to_string(), JsonValue::from(self.base.clone()));
        fields.insert("date".to_string(), JsonValue::from(day_timestamp(day)));

        NormalizedRecord { fields }
    }
}

/// A flattened record ready to emit
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    fields: JsonObject,
}

impl NormalizedRecord {
    /// Field lookup
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key)
    }

    /// Field names
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Consume into a JSON object
    pub fn into_value(self) -> JsonValue {
        JsonValue::Object(self.fields)
    }
}
