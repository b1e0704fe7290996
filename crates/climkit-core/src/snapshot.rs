//! Immutable per-refresh device state snapshot

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;
use ulid::Ulid;

/// Error reading a typed attribute out of a snapshot
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot has no attribute '{key}'")]
    MissingAttribute { key: String },

    #[error("snapshot attribute '{key}' has unexpected shape: {value}")]
    InvalidAttribute { key: String, value: String },
}

/// The cached result of one successful vendor fetch
///
/// A snapshot is built exactly once per refresh cycle and never mutated
/// afterwards; the coordinator swaps a fresh `Arc<DeviceSnapshot>` in
/// atomically and entities only ever hold read references. Attribute names
/// are vendor-chosen (zoned vendors prefix them per zone, e.g.
/// `"zone_1/power"`).
#[derive(Debug, Clone)]
pub struct DeviceSnapshot {
    attributes: IndexMap<String, Value>,
    fetched_at: DateTime<Utc>,
    refresh_id: Ulid,
}

impl DeviceSnapshot {
    /// Create a snapshot from raw vendor attributes
    pub fn new(attributes: IndexMap<String, Value>) -> Self {
        Self {
            attributes,
            fetched_at: Utc::now(),
            refresh_id: Ulid::new(),
        }
    }

    /// When the underlying fetch completed
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Unique id of the refresh cycle that produced this snapshot
    pub fn refresh_id(&self) -> Ulid {
        self.refresh_id
    }

    /// Get a raw attribute value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Check whether an attribute is present
    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Get an attribute as a string slice
    pub fn str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// Get an attribute as a float (integers widen)
    pub fn f64(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).and_then(Value::as_f64)
    }

    /// Get an attribute as an integer
    pub fn i64(&self, key: &str) -> Option<i64> {
        self.attributes.get(key).and_then(Value::as_i64)
    }

    /// Get an attribute as a bool
    pub fn bool(&self, key: &str) -> Option<bool> {
        self.attributes.get(key).and_then(Value::as_bool)
    }

    /// Deserialize an attribute into any target type, `None` on mismatch
    pub fn attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Deserialize an attribute into a vendor-native value, failing loudly
    ///
    /// Unlike [`DeviceSnapshot::attribute`], a missing or mistyped attribute
    /// is an error the caller must handle, never a silent default. Adapters
    /// use this for attributes their rendering depends on.
    pub fn vendor_value<V: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<V, SnapshotError> {
        let value = self
            .attributes
            .get(key)
            .ok_or_else(|| SnapshotError::MissingAttribute {
                key: key.to_string(),
            })?;
        serde_json::from_value(value.clone()).map_err(|_| SnapshotError::InvalidAttribute {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Number of attributes in the snapshot
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check if the snapshot carries no attributes
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterate attributes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for DeviceSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
