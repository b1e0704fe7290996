//! Device ID type representing a vendor.object_id pair

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for invalid device IDs
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceIdError {
    #[error("device_id must contain exactly one '.' separator")]
    InvalidFormat,

    #[error("vendor cannot be empty")]
    EmptyVendor,

    #[error("object_id cannot be empty")]
    EmptyObjectId,

    #[error(
        "vendor contains invalid characters (must be lowercase alphanumeric with underscores, cannot start/end with underscore or contain double underscores)"
    )]
    InvalidVendorChars,

    #[error(
        "object_id contains invalid characters (must be lowercase alphanumeric with underscores, cannot start/end with underscore)"
    )]
    InvalidObjectIdChars,
}

/// Identifies one controllable device or zone (e.g., "breeze.living_room")
///
/// Device IDs consist of a vendor name and an object_id separated by a
/// period. Both parts must be lowercase alphanumeric with underscores only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId {
    vendor: String,
    object_id: String,
}

impl DeviceId {
    /// Create a new DeviceId from vendor and object_id parts
    pub fn new(
        vendor: impl Into<String>,
        object_id: impl Into<String>,
    ) -> Result<Self, DeviceIdError> {
        let vendor = vendor.into();
        let object_id = object_id.into();

        if vendor.is_empty() {
            return Err(DeviceIdError::EmptyVendor);
        }
        if object_id.is_empty() {
            return Err(DeviceIdError::EmptyObjectId);
        }
        if !Self::is_valid_vendor(&vendor) {
            return Err(DeviceIdError::InvalidVendorChars);
        }
        if !Self::is_valid_object_id(&object_id) {
            return Err(DeviceIdError::InvalidObjectIdChars);
        }

        Ok(Self { vendor, object_id })
    }

    /// Get the vendor part of the device ID
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Get the object_id part of the device ID
    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// Check if an object_id is valid (lowercase alphanumeric + underscore, cannot start/end with _)
    fn is_valid_object_id(s: &str) -> bool {
        if s.starts_with('_') || s.ends_with('_') {
            return false;
        }
        s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }

    /// Check if a vendor is valid (same as object_id, plus cannot contain __)
    fn is_valid_vendor(s: &str) -> bool {
        if s.contains("__") {
            return false;
        }
        Self::is_valid_object_id(s)
    }
}

impl FromStr for DeviceId {
    type Err = DeviceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 2 {
            return Err(DeviceIdError::InvalidFormat);
        }
        Self::new(parts[0], parts[1])
    }
}

impl TryFrom<String> for DeviceId {
    type Error = DeviceIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> String {
        id.to_string()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.vendor, self.object_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_device_id() {
        let id = DeviceId::new("breeze", "living_room").unwrap();
        assert_eq!(id.vendor(), "breeze");
        assert_eq!(id.object_id(), "living_room");
        assert_eq!(id.to_string(), "breeze.living_room");
    }

    #[test]
    fn test_parse_device_id() {
        let id: DeviceId = "zonal.zone_2".parse().unwrap();
        assert_eq!(id.vendor(), "zonal");
        assert_eq!(id.object_id(), "zone_2");
    }

    #[test]
    fn test_invalid_format() {
        assert_eq!(
            "no_separator".parse::<DeviceId>().unwrap_err(),
            DeviceIdError::InvalidFormat
        );
        assert_eq!(
            "too.many.parts".parse::<DeviceId>().unwrap_err(),
            DeviceIdError::InvalidFormat
        );
    }

    #[test]
    fn test_empty_parts() {
        assert_eq!(
            ".object".parse::<DeviceId>().unwrap_err(),
            DeviceIdError::EmptyVendor
        );
        assert_eq!(
            "vendor.".parse::<DeviceId>().unwrap_err(),
            DeviceIdError::EmptyObjectId
        );
    }

    #[test]
    fn test_invalid_chars() {
        assert_eq!(
            "UPPER.case".parse::<DeviceId>().unwrap_err(),
            DeviceIdError::InvalidVendorChars
        );
        assert_eq!(
            "breeze.UPPER".parse::<DeviceId>().unwrap_err(),
            DeviceIdError::InvalidObjectIdChars
        );
        assert_eq!(
            "with-dash.object".parse::<DeviceId>().unwrap_err(),
            DeviceIdError::InvalidVendorChars
        );
    }

    #[test]
    fn test_underscore_rules() {
        assert_eq!(
            "_breeze.room".parse::<DeviceId>().unwrap_err(),
            DeviceIdError::InvalidVendorChars
        );
        assert_eq!(
            "breeze._room".parse::<DeviceId>().unwrap_err(),
            DeviceIdError::InvalidObjectIdChars
        );
        assert_eq!(
            "my__vendor.room".parse::<DeviceId>().unwrap_err(),
            DeviceIdError::InvalidVendorChars
        );
        // Double underscore in object_id is allowed
        assert!("breeze.my__room".parse::<DeviceId>().is_ok());
        assert!("my_vendor.living_room".parse::<DeviceId>().is_ok());
    }

    #[test]
    fn test_serde_roundtrip() {
        let id = DeviceId::new("zonal", "zone_1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"zonal.zone_1\"");

        let parsed: DeviceId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
