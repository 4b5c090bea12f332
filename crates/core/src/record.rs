use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A record identifier. The CMS uses integer ids for most content and
/// opaque string ids for some newer collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

/// A flat content record: field name to value, as produced by the
/// response normalizer.
///
/// Callers never see which envelope shape the source used; by the time a
/// record exists, `attributes` nesting is gone and relation fields hold
/// records (or lists of records) rather than raw envelopes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRecord(Map<String, Value>);

impl ContentRecord {
    /// Wrap an already-flat field map.
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// The record id, if present.
    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        match self.0.get("id") {
            Some(Value::Number(n)) => n.as_i64().map(RecordId::Int),
            Some(Value::String(s)) => Some(RecordId::Str(s.clone())),
            _ => None,
        }
    }

    /// Raw field access.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// A string field, `None` when absent or not a string.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// An integer field, coercing floats and numeric strings the way the
    /// UI layer historically did.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn i64_field(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// A float field, with the same coercions as [`Self::i64_field`].
    #[must_use]
    pub fn f64_field(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// A boolean field, `None` when absent or not a bool.
    #[must_use]
    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// A to-one relation field as a record, `None` when absent or not an
    /// object.
    #[must_use]
    pub fn record_field(&self, key: &str) -> Option<ContentRecord> {
        self.0
            .get(key)
            .and_then(Value::as_object)
            .map(|m| ContentRecord(m.clone()))
    }

    /// A to-many relation field as records. Non-object entries are
    /// skipped.
    #[must_use]
    pub fn records_field(&self, key: &str) -> Option<Vec<ContentRecord>> {
        let items = self.0.get(key)?.as_array()?;
        Some(
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|m| ContentRecord(m.clone()))
                .collect(),
        )
    }

    /// Whether a field is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Remove a field, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Borrow the underlying field map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying field map.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ContentRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<ContentRecord> for Value {
    fn from(record: ContentRecord) -> Self {
        Value::Object(record.0)
    }
}
