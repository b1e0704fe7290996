//! zonal: local zoned ducted controllers
//!
//! One coordinator per controller; one entity for the unit plus one per
//! zone. The controller answers on the LAN in milliseconds, so commands are
//! confirmed by an immediate refresh rather than optimistic patches, and a
//! failed poll hides stale data: a zone that may have physically closed
//! must not keep advertising airflow. The controller powers the whole unit
//! down when the last zone closes; zone adapters therefore carry the unit
//! as their parent device so `turn_on` re-powers it explicitly.

mod client;
mod config;
mod setup;
mod tables;

pub use client::ZonalClient;
pub use config::{ZonalConfig, ZonalZoneConfig};
pub use setup::{setup, ZonalIntegration};

/// Vendor key in hub configuration
pub const VENDOR: &str = "zonal";
