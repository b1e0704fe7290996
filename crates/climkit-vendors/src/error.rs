//! Integration setup errors

use climkit_config::ConfigError;
use climkit_core::{DeviceIdError, VendorError};
use climkit_translate::TableBuildError;
use thiserror::Error;

/// Errors raised while setting one integration up
///
/// A [`SetupError::FirstRefresh`] wrapping a transient vendor failure is
/// retryable; one wrapping an auth failure means the entry needs
/// reconfiguration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no integration for vendor '{0}'")]
    UnknownVendor(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid device id: {0}")]
    DeviceId(#[from] DeviceIdError),

    #[error("translation table: {0}")]
    Table(#[from] TableBuildError),

    #[error("failed to build http client: {0}")]
    Http(String),

    #[error("initial refresh failed: {0}")]
    FirstRefresh(#[from] VendorError),
}

impl SetupError {
    /// Whether retrying setup later can plausibly succeed unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, SetupError::FirstRefresh(err) if !err.is_fatal())
    }
}
