//! breeze: cloud-connected mini-split controllers
//!
//! One coordinator per API account; one entity per pod. The cloud API is
//! slow to converge, so this integration applies optimistic updates after
//! commands and keeps last-known-good data (flagged assumed) when a refresh
//! fails, since a cloud blip should not blank every pod in the house. `OFF` is a
//! dedicated power flag in the API, never a mode value.

mod client;
mod config;
mod setup;
mod tables;

pub use client::BreezeClient;
pub use config::{BreezeConfig, BreezeDeviceConfig};
pub use setup::{setup, BreezeIntegration};

/// Vendor key in hub configuration
pub const VENDOR: &str = "breeze";
