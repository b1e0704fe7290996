//! Vendor climate integrations for climkit
//!
//! Each integration module follows the same shape: typed options parsed from
//! the hub configuration, a reqwest client implementing the vendor
//! contracts, translation tables for the vendor's vocabulary, and a setup
//! function that wires client → coordinator → adapters and returns an
//! owning handle. Dropping the handle tears the integration down; there are
//! no global registries.

pub mod breeze;
pub mod zonal;

mod error;
mod http;
mod hub;

use std::sync::Arc;

use climkit_config::{HubConfig, IntegrationConfig};
use climkit_coordinator::PollingCoordinator;

pub use error::SetupError;
pub use hub::Hub;

/// A running integration of any supported vendor
pub enum Integration {
    Breeze(breeze::BreezeIntegration),
    Zonal(zonal::ZonalIntegration),
}

impl Integration {
    pub fn coordinator(&self) -> &Arc<PollingCoordinator> {
        match self {
            Integration::Breeze(integration) => integration.coordinator(),
            Integration::Zonal(integration) => integration.coordinator(),
        }
    }
}

/// Set up one configured integration by vendor key
pub async fn setup_integration(
    hub: &HubConfig,
    config: &IntegrationConfig,
) -> Result<Integration, SetupError> {
    let poll_interval = hub.poll_interval_for(config);
    match config.vendor.as_str() {
        breeze::VENDOR => {
            let options: breeze::BreezeConfig = config.parse_options()?;
            let integration = breeze::setup(&config.name, options, poll_interval).await?;
            Ok(Integration::Breeze(integration))
        }
        zonal::VENDOR => {
            let options: zonal::ZonalConfig = config.parse_options()?;
            let integration = zonal::setup(&config.name, options, poll_interval).await?;
            Ok(Integration::Zonal(integration))
        }
        other => Err(SetupError::UnknownVendor(other.to_string())),
    }
}
