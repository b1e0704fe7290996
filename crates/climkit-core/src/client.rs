//! Vendor client contracts
//!
//! Every integration supplies a client that talks to its device or cloud
//! API. The coordinator only needs [`StateSource`]; entity adapters need the
//! full [`VendorClient`] command surface.

use std::fmt;
use std::hash::Hash;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::device_id::DeviceId;
use crate::snapshot::DeviceSnapshot;

/// Errors a vendor client can surface
///
/// Connectivity failures and command rejections are deliberately distinct
/// variants so callers can tell "the device is unreachable" apart from "the
/// device said no".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VendorError {
    /// Network-level failure reaching the device or API
    #[error("transport failure: {0}")]
    Transport(String),

    /// The vendor call did not complete in time
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Credentials were rejected; not recoverable by retrying
    #[error("authentication rejected: {0}")]
    AuthFailed(String),

    /// The vendor refused a command (e.g. value outside device bounds)
    #[error("command rejected by vendor: {reason}")]
    Rejected { reason: String },

    /// The vendor answered with something we could not decode
    #[error("malformed vendor payload: {0}")]
    Payload(String),
}

impl VendorError {
    /// Whether this failure is configuration-fatal rather than transient
    ///
    /// Fatal errors are not retried on the next tick; the coordinator
    /// latches into a failed state until the integration is reloaded.
    pub fn is_fatal(&self) -> bool {
        matches!(self, VendorError::AuthFailed(_))
    }
}

/// Marker for vendor-native value types used in translation tables
///
/// Implemented automatically for anything hashable, comparable, debuggable,
/// and deserializable from a snapshot attribute (strings, integer codes,
/// serde-derived vendor enums).
pub trait VendorValue:
    Clone + Eq + Hash + fmt::Debug + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> VendorValue for T where
    T: Clone + Eq + Hash + fmt::Debug + DeserializeOwned + Send + Sync + 'static
{
}

/// The fetch half of a vendor client
///
/// One implementation per polled connection. The fetch must build a complete
/// [`DeviceSnapshot`] for everything the connection covers (all zones of a
/// ducted unit, all pods of a cloud account); partial results are an error,
/// never a partial snapshot.
#[async_trait]
pub trait StateSource: Send + Sync {
    async fn fetch_state(&self) -> Result<DeviceSnapshot, VendorError>;
}

/// Full vendor command surface used by entity adapters
///
/// Mode-like commands take the vendor-native value; translation from the
/// domain vocabulary happens in the adapter before the client is called, so
/// client implementations stay dumb pipes to the wire.
#[async_trait]
pub trait VendorClient: StateSource {
    /// Vendor-native value type for mode-like attributes
    type Value: VendorValue;

    async fn set_power(&self, device: &DeviceId, on: bool) -> Result<(), VendorError>;

    async fn set_target_temperature(
        &self,
        device: &DeviceId,
        value: f64,
    ) -> Result<(), VendorError>;

    async fn set_hvac_mode(&self, device: &DeviceId, value: Self::Value)
        -> Result<(), VendorError>;

    async fn set_fan_mode(&self, device: &DeviceId, value: Self::Value)
        -> Result<(), VendorError>;

    async fn set_preset_mode(
        &self,
        device: &DeviceId,
        value: Self::Value,
    ) -> Result<(), VendorError>;

    async fn set_swing_mode(
        &self,
        device: &DeviceId,
        value: Self::Value,
    ) -> Result<(), VendorError>;
}
