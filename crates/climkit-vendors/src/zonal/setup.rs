//! zonal integration setup

use std::sync::Arc;
use std::time::Duration;

use climkit_coordinator::{PollHandle, PollingCoordinator};
use climkit_core::{ClimateFeatures, DeviceCapabilities, DeviceId, FanMode, HvacMode};
use climkit_entity::{
    ClimateEntityAdapter, CommandSync, FailurePolicy, IntegrationPolicy, SnapshotKeys,
};
use tracing::info;

use crate::error::SetupError;
use crate::http::build_client;

use super::client::ZonalClient;
use super::config::{ZonalConfig, ZonalZoneConfig};
use super::tables;
use super::VENDOR;

/// Policy for this integration: the controller is local and fast, so
/// commands are confirmed by a refresh, and a failed poll hides stale data
/// rather than advertising airflow a closed zone no longer has.
const POLICY: IntegrationPolicy = IntegrationPolicy {
    on_failure: FailurePolicy::HideStaleData,
    after_command: CommandSync::Refresh,
    off_via_power: true,
};

const UNIT_MODES: [HvacMode; 6] = [
    HvacMode::Off,
    HvacMode::Heat,
    HvacMode::Cool,
    HvacMode::FanOnly,
    HvacMode::Dry,
    HvacMode::Auto,
];

const DEFAULT_MIN_SETPOINT: f64 = 16.0;
const DEFAULT_MAX_SETPOINT: f64 = 30.0;

/// A running zonal controller integration
pub struct ZonalIntegration {
    coordinator: Arc<PollingCoordinator>,
    unit: ClimateEntityAdapter<ZonalClient>,
    zones: Vec<ClimateEntityAdapter<ZonalClient>>,
    _poll: PollHandle,
}

impl ZonalIntegration {
    pub fn coordinator(&self) -> &Arc<PollingCoordinator> {
        &self.coordinator
    }

    /// The whole-unit entity
    pub fn unit(&self) -> &ClimateEntityAdapter<ZonalClient> {
        &self.unit
    }

    pub fn zones(&self) -> &[ClimateEntityAdapter<ZonalClient>] {
        &self.zones
    }

    pub fn zone(&self, device: &DeviceId) -> Option<&ClimateEntityAdapter<ZonalClient>> {
        self.zones.iter().find(|z| z.device() == device)
    }
}

fn unit_capabilities() -> DeviceCapabilities {
    DeviceCapabilities::new(UNIT_MODES.to_vec())
        .with_features(
            ClimateFeatures::FAN_MODE | ClimateFeatures::TURN_ON | ClimateFeatures::TURN_OFF,
        )
        .with_fan_modes(vec![
            FanMode::Auto,
            FanMode::Low,
            FanMode::Medium,
            FanMode::High,
        ])
}

fn zone_capabilities(zone: &ZonalZoneConfig) -> DeviceCapabilities {
    DeviceCapabilities::new(UNIT_MODES.to_vec())
        .with_features(
            ClimateFeatures::TARGET_TEMPERATURE
                | ClimateFeatures::TURN_ON
                | ClimateFeatures::TURN_OFF,
        )
        .with_temperature_range(
            zone.min_temp.unwrap_or(DEFAULT_MIN_SETPOINT),
            zone.max_temp.unwrap_or(DEFAULT_MAX_SETPOINT),
        )
        .with_target_step(1.0)
}

fn unit_keys(unit_object_id: &str) -> SnapshotKeys {
    SnapshotKeys::new()
        .with_power(format!("{unit_object_id}/power"))
        .with_hvac_mode(format!("{unit_object_id}/mode"))
        .with_hvac_action(format!("{unit_object_id}/action"))
        .with_fan_mode(format!("{unit_object_id}/fan"))
}

fn zone_keys(object_id: &str, unit_object_id: &str) -> SnapshotKeys {
    // Zones follow the unit's mode; only power and setpoint are their own
    SnapshotKeys::new()
        .with_power(format!("{object_id}/power"))
        .with_hvac_mode(format!("{unit_object_id}/mode"))
        .with_target_temperature(format!("{object_id}/setpoint"))
        .with_current_temperature(format!("{object_id}/temperature"))
}

/// Set up one controller: client → coordinator → unit + zone adapters
pub async fn setup(
    name: &str,
    config: ZonalConfig,
    poll_interval: Duration,
) -> Result<ZonalIntegration, SetupError> {
    let unit_device = DeviceId::new(VENDOR, &config.unit_object_id)?;
    let mut zones = Vec::with_capacity(config.zones.len());
    for zone in &config.zones {
        let id = DeviceId::new(VENDOR, &zone.object_id)?;
        zones.push((id, zone.number, zone.object_id.clone()));
    }

    let client = Arc::new(ZonalClient::new(
        build_client()?,
        config.base_url(),
        unit_device.clone(),
        config.unit_object_id.clone(),
        zones,
    ));
    let coordinator = Arc::new(PollingCoordinator::new(
        format!("{VENDOR}:{name}"),
        client.clone(),
        poll_interval,
    ));
    coordinator.first_refresh().await?;

    let translator = Arc::new(tables::translator()?);

    let unit = ClimateEntityAdapter::builder(
        unit_device.clone(),
        client.clone(),
        coordinator.clone(),
    )
    .translator(translator.clone())
    .keys(unit_keys(&config.unit_object_id))
    .capabilities(unit_capabilities())
    .policy(POLICY)
    .build();

    let mut zone_adapters = Vec::with_capacity(config.zones.len());
    for zone in &config.zones {
        let id = DeviceId::new(VENDOR, &zone.object_id)?;
        zone_adapters.push(
            ClimateEntityAdapter::builder(id, client.clone(), coordinator.clone())
                .translator(translator.clone())
                .keys(zone_keys(&zone.object_id, &config.unit_object_id))
                .capabilities(zone_capabilities(zone))
                .policy(POLICY)
                .parent_unit(unit_device.clone())
                .build(),
        );
    }

    let poll = Arc::clone(&coordinator).spawn_polling();
    info!(
        integration = %coordinator.name(),
        zones = zone_adapters.len(),
        "zonal integration ready"
    );

    Ok(ZonalIntegration {
        coordinator,
        unit,
        zones: zone_adapters,
        _poll: poll,
    })
}
