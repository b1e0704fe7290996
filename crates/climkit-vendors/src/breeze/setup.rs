//! breeze integration setup

use std::sync::Arc;
use std::time::Duration;

use climkit_coordinator::{PollHandle, PollingCoordinator};
use climkit_core::{ClimateFeatures, DeviceCapabilities, DeviceId, FanMode, HvacMode, PresetMode, SwingMode};
use climkit_entity::{
    ClimateEntityAdapter, CommandSync, FailurePolicy, IntegrationPolicy, SnapshotKeys,
};
use tracing::info;

use crate::error::SetupError;
use crate::http::build_client;

use super::client::BreezeClient;
use super::config::{BreezeConfig, BreezeDeviceConfig};
use super::tables;
use super::VENDOR;

/// Policy for this integration: the cloud converges slowly, so commands
/// render optimistically and a failed poll keeps last-known-good data
/// flagged as assumed.
const POLICY: IntegrationPolicy = IntegrationPolicy {
    on_failure: FailurePolicy::KeepStaleData,
    after_command: CommandSync::Optimistic,
    off_via_power: true,
};

/// A running breeze account integration
///
/// Owns the client, coordinator, adapters, and polling task; dropping it
/// tears everything down.
pub struct BreezeIntegration {
    coordinator: Arc<PollingCoordinator>,
    adapters: Vec<ClimateEntityAdapter<BreezeClient>>,
    _poll: PollHandle,
}

impl BreezeIntegration {
    pub fn coordinator(&self) -> &Arc<PollingCoordinator> {
        &self.coordinator
    }

    pub fn adapters(&self) -> &[ClimateEntityAdapter<BreezeClient>] {
        &self.adapters
    }

    pub fn adapter(&self, device: &DeviceId) -> Option<&ClimateEntityAdapter<BreezeClient>> {
        self.adapters.iter().find(|a| a.device() == device)
    }
}

fn capabilities(config: &BreezeDeviceConfig) -> DeviceCapabilities {
    DeviceCapabilities::new(vec![
        HvacMode::Off,
        HvacMode::Heat,
        HvacMode::Cool,
        HvacMode::Dry,
        HvacMode::FanOnly,
        HvacMode::Auto,
    ])
    .with_features(
        ClimateFeatures::TARGET_TEMPERATURE
            | ClimateFeatures::FAN_MODE
            | ClimateFeatures::PRESET_MODE
            | ClimateFeatures::SWING_MODE
            | ClimateFeatures::TURN_ON
            | ClimateFeatures::TURN_OFF,
    )
    .with_fan_modes(vec![
        FanMode::Quiet,
        FanMode::Low,
        FanMode::Medium,
        FanMode::High,
        FanMode::Auto,
    ])
    .with_preset_modes(vec![
        PresetMode::None,
        PresetMode::Eco,
        PresetMode::Boost,
        PresetMode::Sleep,
    ])
    .with_swing_modes(vec![
        SwingMode::Off,
        SwingMode::Vertical,
        SwingMode::Horizontal,
        SwingMode::Both,
    ])
    .with_temperature_range(10.0, 32.5)
    .with_target_step(0.5)
    .with_unit(config.unit)
}

fn keys(object_id: &str) -> SnapshotKeys {
    SnapshotKeys::new()
        .with_power(format!("{object_id}/power"))
        .with_hvac_mode(format!("{object_id}/mode"))
        .with_fan_mode(format!("{object_id}/fan"))
        .with_preset_mode(format!("{object_id}/preset"))
        .with_swing_mode(format!("{object_id}/swing"))
        .with_target_temperature(format!("{object_id}/target"))
        .with_current_temperature(format!("{object_id}/room_temp"))
        .with_current_humidity(format!("{object_id}/humidity"))
}

/// Set up one breeze account: client → coordinator → one adapter per pod
///
/// Fails with a retryable error when the first refresh hits a transient
/// problem, and with a fatal one when the API key is rejected.
pub async fn setup(
    name: &str,
    config: BreezeConfig,
    poll_interval: Duration,
) -> Result<BreezeIntegration, SetupError> {
    let mut pods = Vec::with_capacity(config.devices.len());
    for device in &config.devices {
        let id = DeviceId::new(VENDOR, &device.object_id)?;
        pods.push((id, device.pod_id.clone(), device.object_id.clone()));
    }

    let client = Arc::new(BreezeClient::new(build_client()?, &config, pods));
    let coordinator = Arc::new(PollingCoordinator::new(
        format!("{VENDOR}:{name}"),
        client.clone(),
        poll_interval,
    ));
    coordinator.first_refresh().await?;

    let translator = Arc::new(tables::translator()?);
    let mut adapters = Vec::with_capacity(config.devices.len());
    for device in &config.devices {
        let id = DeviceId::new(VENDOR, &device.object_id)?;
        adapters.push(
            ClimateEntityAdapter::builder(id, client.clone(), coordinator.clone())
                .translator(translator.clone())
                .keys(keys(&device.object_id))
                .capabilities(capabilities(device))
                .policy(POLICY)
                .build(),
        );
    }

    let poll = Arc::clone(&coordinator).spawn_polling();
    info!(
        integration = %coordinator.name(),
        pods = adapters.len(),
        "breeze integration ready"
    );

    Ok(BreezeIntegration {
        coordinator,
        adapters,
        _poll: poll,
    })
}
