//! Error types for rendering and commands

use climkit_core::{SnapshotError, VendorError};
use climkit_translate::TranslationError;
use thiserror::Error;

/// Error turning a snapshot into domain state
///
/// Always a defect (missing table entry, missing attribute, or adapter
/// misconfiguration); the adapter logs it with the device id and renders
/// the entity unavailable rather than guessing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("no translation table configured for {attribute}")]
    MissingTable { attribute: &'static str },

    #[error("adapter has neither a power key nor an hvac_mode key to render from")]
    NoModeSource,
}

/// Error from a user-issued command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("target temperature {value} outside allowed range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("{kind} '{value}' is not advertised by this device")]
    UnsupportedMode { kind: &'static str, value: String },

    #[error("device does not support {feature}")]
    UnsupportedFeature { feature: &'static str },

    #[error(transparent)]
    Translation(#[from] TranslationError),

    /// Connectivity failure talking to the vendor
    #[error("vendor unreachable: {0}")]
    VendorUnavailable(#[source] VendorError),

    /// The vendor refused the command, with its reason when it gave one
    #[error("vendor rejected command: {reason}")]
    VendorRejected { reason: String },
}

impl CommandError {
    /// Map a vendor client failure onto the command error taxonomy
    pub(crate) fn from_vendor(err: VendorError) -> Self {
        match err {
            VendorError::Rejected { reason } => CommandError::VendorRejected { reason },
            other => CommandError::VendorUnavailable(other),
        }
    }
}
