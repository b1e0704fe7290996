//! Core types for climkit
//!
//! This crate provides the fundamental types shared by every climkit crate:
//! DeviceId, DeviceSnapshot, the domain-level climate vocabulary, per-device
//! capability sets, and the vendor client contracts.

mod capabilities;
mod client;
mod device_id;
mod modes;
mod snapshot;
mod units;

pub use capabilities::{ClimateFeatures, DeviceCapabilities};
pub use client::{StateSource, VendorClient, VendorError, VendorValue};
pub use device_id::{DeviceId, DeviceIdError};
pub use modes::{FanMode, HvacAction, HvacMode, PowerState, PresetMode, SwingMode};
pub use snapshot::{DeviceSnapshot, SnapshotError};
pub use units::{convert_temperature, TemperatureUnit};

/// Default lower display bound for target temperatures, in Celsius
pub const DEFAULT_MIN_TEMP: f64 = 7.0;

/// Default upper display bound for target temperatures, in Celsius
pub const DEFAULT_MAX_TEMP: f64 = 35.0;
