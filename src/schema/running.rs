//! Append-only stream schema

use super::types::{JsonType, SchemaProperty};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema of the `exchange_rate` stream.
///
/// Always carries `date` and `base`; every currency ever observed is added
/// as a nullable number and never removed. Two schemas are equal when their
/// property sets are equal, which is how the engine decides to re-emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningSchema {
    /// Schema type (always "object")
    #[serde(rename = "type")]
    json_type: JsonType,

    /// Object properties
    properties: BTreeMap<String, SchemaProperty>,
}

impl Default for RunningSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningSchema {
    /// Create a schema holding only the fixed fields
    pub fn new() -> Self {
        let mut properties = BTreeMap::new();
        properties.insert(
            "date".to_string(),
            SchemaProperty::new(JsonType::String).with_format("date-time"),
        );
        properties.insert("base".to_string(), SchemaProperty::new(JsonType::String));

        Self {
            json_type: JsonType::Object,
            properties,
        }
    }

    /// Add a currency field if it is not present yet.
    ///
    /// Returns `true` when the field was new.
    pub fn observe(&mut self, currency: &str) -> bool {
        if self.properties.contains_key(currency) {
            return false;
        }
        self.properties
            .insert(currency.to_string(), SchemaProperty::nullable(JsonType::Number));
        true
    }

    /// Observe every currency in `currencies`, returning how many were new
    pub fn observe_all<'a>(&mut self, currencies: impl IntoIterator<Item = &'a str>) -> usize {
        currencies
            .into_iter()
            .filter(|currency| self.observe(currency))
            .count()
    }

    /// Check whether a field is declared
    pub fn contains(&self, field: &str) -> bool {
        self.properties.contains_key(field)
    }

    /// Get a property
    pub fn get_property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.get(name)
    }

    /// Declared field names, sorted
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Always false; the fixed fields are present from construction
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_default()
    }
}
