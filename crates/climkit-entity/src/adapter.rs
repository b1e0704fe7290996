//! The climate entity adapter

use std::sync::Arc;

use climkit_coordinator::{CoordinatorUpdate, ListenerHandle, PollingCoordinator};
use climkit_core::{
    ClimateFeatures, DeviceCapabilities, DeviceId, DeviceSnapshot, FanMode, HvacAction, HvacMode,
    PowerState, PresetMode, SwingMode, VendorClient,
};
use climkit_translate::{ClimateTranslator, TranslationTable};
use tokio::sync::watch;
use tracing::{debug, error};

use crate::error::{CommandError, RenderError};
use crate::policy::{CommandSync, FailurePolicy, IntegrationPolicy, SnapshotKeys};
use crate::state::{ClimateState, EntityRender};

/// One climate entity over a coordinator and a vendor client
///
/// The adapter holds a read reference to the coordinator's snapshot (the
/// coordinator outlives and is shared by all its entities) and re-renders on
/// every coordinator notification. Dropping the adapter deregisters its
/// listener.
pub struct ClimateEntityAdapter<C: VendorClient> {
    inner: Arc<AdapterInner<C>>,
    listener: ListenerHandle,
}

struct AdapterInner<C: VendorClient> {
    device: DeviceId,
    parent_unit: Option<DeviceId>,
    client: Arc<C>,
    coordinator: Arc<PollingCoordinator>,
    translator: Arc<ClimateTranslator<C::Value>>,
    keys: SnapshotKeys,
    capabilities: DeviceCapabilities,
    policy: IntegrationPolicy,
    render_tx: watch::Sender<EntityRender>,
}

impl<C: VendorClient> ClimateEntityAdapter<C> {
    /// Start building an adapter for one device
    pub fn builder(
        device: DeviceId,
        client: Arc<C>,
        coordinator: Arc<PollingCoordinator>,
    ) -> ClimateEntityAdapterBuilder<C> {
        ClimateEntityAdapterBuilder {
            device,
            parent_unit: None,
            client,
            coordinator,
            translator: None,
            keys: SnapshotKeys::default(),
            capabilities: None,
            policy: IntegrationPolicy::default(),
        }
    }

    pub fn device(&self) -> &DeviceId {
        &self.inner.device
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.inner.capabilities
    }

    /// Current rendered view of the entity
    pub fn render(&self) -> EntityRender {
        self.inner.render_tx.borrow().clone()
    }

    /// Watch the rendered view; the receiver sees one change per re-render
    pub fn subscribe(&self) -> watch::Receiver<EntityRender> {
        self.inner.render_tx.subscribe()
    }

    pub fn is_available(&self) -> bool {
        self.inner.render_tx.borrow().available
    }

    /// Whether the rendered state is last-known-good rather than confirmed
    pub fn assumed_state(&self) -> bool {
        self.inner.render_tx.borrow().assumed
    }

    pub fn hvac_mode(&self) -> Option<HvacMode> {
        self.inner
            .render_tx
            .borrow()
            .state
            .as_ref()
            .map(|s| s.hvac_mode)
    }

    pub fn hvac_action(&self) -> Option<HvacAction> {
        self.inner
            .render_tx
            .borrow()
            .state
            .as_ref()
            .and_then(|s| s.hvac_action)
    }

    pub fn current_temperature(&self) -> Option<f64> {
        self.inner
            .render_tx
            .borrow()
            .state
            .as_ref()
            .and_then(|s| s.current_temperature)
    }

    pub fn target_temperature(&self) -> Option<f64> {
        self.inner
            .render_tx
            .borrow()
            .state
            .as_ref()
            .and_then(|s| s.target_temperature)
    }

    pub fn fan_mode(&self) -> Option<FanMode> {
        self.inner
            .render_tx
            .borrow()
            .state
            .as_ref()
            .and_then(|s| s.fan_mode)
    }

    pub fn preset_mode(&self) -> Option<PresetMode> {
        self.inner
            .render_tx
            .borrow()
            .state
            .as_ref()
            .and_then(|s| s.preset_mode)
    }

    pub fn swing_mode(&self) -> Option<SwingMode> {
        self.inner
            .render_tx
            .borrow()
            .state
            .as_ref()
            .and_then(|s| s.swing_mode)
    }

    /// Set the target temperature
    ///
    /// Validates against the device's advertised range before any vendor
    /// I/O.
    pub async fn set_temperature(&self, value: f64) -> Result<(), CommandError> {
        let inner = &self.inner;
        if !inner
            .capabilities
            .features
            .contains(ClimateFeatures::TARGET_TEMPERATURE)
        {
            return Err(CommandError::UnsupportedFeature {
                feature: "target temperature",
            });
        }
        let (min, max) = (inner.capabilities.min_temp, inner.capabilities.max_temp);
        if value < min || value > max {
            return Err(CommandError::OutOfRange { value, min, max });
        }

        inner
            .client
            .set_target_temperature(&inner.device, value)
            .await
            .map_err(CommandError::from_vendor)?;
        debug!(device = %inner.device, value, "target temperature set");
        inner
            .after_command(|state| state.target_temperature = Some(value))
            .await
    }

    /// Set the HVAC mode
    ///
    /// `Off` is routed to the dedicated power-off command when the
    /// integration declared `off_via_power`; several vendors have no
    /// mode-set spelling for "off" at all.
    pub async fn set_hvac_mode(&self, mode: HvacMode) -> Result<(), CommandError> {
        let inner = &self.inner;
        if !inner.capabilities.supports_hvac_mode(mode) {
            return Err(CommandError::UnsupportedMode {
                kind: "hvac mode",
                value: mode.to_string(),
            });
        }

        if mode == HvacMode::Off && inner.policy.off_via_power {
            inner
                .client
                .set_power(&inner.device, false)
                .await
                .map_err(CommandError::from_vendor)?;
        } else {
            let table = inner.hvac_mode_table()?;
            let value = table.to_vendor(mode)?.clone();
            inner
                .client
                .set_hvac_mode(&inner.device, value)
                .await
                .map_err(CommandError::from_vendor)?;
        }
        debug!(device = %inner.device, %mode, "hvac mode set");
        inner
            .after_command(move |state| state.hvac_mode = mode)
            .await
    }

    /// Set the fan mode
    pub async fn set_fan_mode(&self, mode: FanMode) -> Result<(), CommandError> {
        let inner = &self.inner;
        if !inner.capabilities.features.contains(ClimateFeatures::FAN_MODE) {
            return Err(CommandError::UnsupportedFeature { feature: "fan mode" });
        }
        if !inner.capabilities.supports_fan_mode(mode) {
            return Err(CommandError::UnsupportedMode {
                kind: "fan mode",
                value: mode.to_string(),
            });
        }

        let table = inner
            .translator
            .fan_modes
            .as_ref()
            .ok_or(CommandError::UnsupportedFeature { feature: "fan mode" })?;
        let value = table.to_vendor(mode)?.clone();
        inner
            .client
            .set_fan_mode(&inner.device, value)
            .await
            .map_err(CommandError::from_vendor)?;
        debug!(device = %inner.device, %mode, "fan mode set");
        inner
            .after_command(move |state| state.fan_mode = Some(mode))
            .await
    }

    /// Set the preset mode
    pub async fn set_preset_mode(&self, mode: PresetMode) -> Result<(), CommandError> {
        let inner = &self.inner;
        if !inner
            .capabilities
            .features
            .contains(ClimateFeatures::PRESET_MODE)
        {
            return Err(CommandError::UnsupportedFeature {
                feature: "preset mode",
            });
        }
        if !inner.capabilities.supports_preset_mode(mode) {
            return Err(CommandError::UnsupportedMode {
                kind: "preset mode",
                value: mode.to_string(),
            });
        }

        let table = inner
            .translator
            .preset_modes
            .as_ref()
            .ok_or(CommandError::UnsupportedFeature {
                feature: "preset mode",
            })?;
        let value = table.to_vendor(mode)?.clone();
        inner
            .client
            .set_preset_mode(&inner.device, value)
            .await
            .map_err(CommandError::from_vendor)?;
        debug!(device = %inner.device, %mode, "preset mode set");
        inner
            .after_command(move |state| state.preset_mode = Some(mode))
            .await
    }

    /// Set the louver swing mode
    pub async fn set_swing_mode(&self, mode: SwingMode) -> Result<(), CommandError> {
        let inner = &self.inner;
        if !inner
            .capabilities
            .features
            .contains(ClimateFeatures::SWING_MODE)
        {
            return Err(CommandError::UnsupportedFeature {
                feature: "swing mode",
            });
        }
        if !inner.capabilities.supports_swing_mode(mode) {
            return Err(CommandError::UnsupportedMode {
                kind: "swing mode",
                value: mode.to_string(),
            });
        }

        let table = inner
            .translator
            .swing_modes
            .as_ref()
            .ok_or(CommandError::UnsupportedFeature {
                feature: "swing mode",
            })?;
        let value = table.to_vendor(mode)?.clone();
        inner
            .client
            .set_swing_mode(&inner.device, value)
            .await
            .map_err(CommandError::from_vendor)?;
        debug!(device = %inner.device, %mode, "swing mode set");
        inner
            .after_command(move |state| state.swing_mode = Some(mode))
            .await
    }

    /// Power the device on
    ///
    /// When a parent unit is configured, it is explicitly powered first:
    /// zoned vendors power the whole unit down when the last zone closes,
    /// and a zone-level power-on does not bring it back by itself.
    pub async fn turn_on(&self) -> Result<(), CommandError> {
        let inner = &self.inner;
        if !inner.capabilities.features.contains(ClimateFeatures::TURN_ON) {
            return Err(CommandError::UnsupportedFeature { feature: "turn on" });
        }

        if let Some(unit) = &inner.parent_unit {
            inner
                .client
                .set_power(unit, true)
                .await
                .map_err(CommandError::from_vendor)?;
        }
        inner
            .client
            .set_power(&inner.device, true)
            .await
            .map_err(CommandError::from_vendor)?;
        debug!(device = %inner.device, "powered on");
        // The resulting mode is the vendor's call; only a refresh can tell.
        inner.after_command(|_| {}).await
    }

    /// Power the device off
    pub async fn turn_off(&self) -> Result<(), CommandError> {
        let inner = &self.inner;
        if !inner
            .capabilities
            .features
            .contains(ClimateFeatures::TURN_OFF)
        {
            return Err(CommandError::UnsupportedFeature { feature: "turn off" });
        }

        inner
            .client
            .set_power(&inner.device, false)
            .await
            .map_err(CommandError::from_vendor)?;
        debug!(device = %inner.device, "powered off");
        inner
            .after_command(|state| state.hvac_mode = HvacMode::Off)
            .await
    }
}

impl<C: VendorClient> Drop for ClimateEntityAdapter<C> {
    fn drop(&mut self) {
        self.listener.unsubscribe();
    }
}

impl<C: VendorClient> AdapterInner<C> {
    fn hvac_mode_table(&self) -> Result<&TranslationTable<HvacMode, C::Value>, CommandError> {
        self.translator
            .hvac_modes
            .as_ref()
            .ok_or(CommandError::UnsupportedFeature { feature: "hvac mode" })
    }

    /// Re-render on a coordinator notification
    fn apply_update(&self, update: &CoordinatorUpdate) {
        let render = if update.success {
            match update.snapshot.as_deref() {
                Some(snapshot) => match self.render_snapshot(snapshot) {
                    Ok(state) => EntityRender::available(state),
                    Err(err) => {
                        error!(
                            device = %self.device,
                            error = %err,
                            "failed to render snapshot, marking unavailable"
                        );
                        EntityRender::unavailable()
                    }
                },
                None => EntityRender::unavailable(),
            }
        } else {
            match self.policy.on_failure {
                FailurePolicy::HideStaleData => EntityRender::unavailable(),
                FailurePolicy::KeepStaleData => {
                    let previous = self.render_tx.borrow().clone();
                    EntityRender {
                        available: previous.state.is_some(),
                        assumed: true,
                        state: previous.state,
                    }
                }
            }
        };
        self.publish(render);
    }

    fn publish(&self, render: EntityRender) {
        self.render_tx.send_if_modified(|current| {
            if *current == render {
                false
            } else {
                *current = render;
                true
            }
        });
    }

    /// Pure translation of a snapshot into domain state
    fn render_snapshot(&self, snapshot: &DeviceSnapshot) -> Result<ClimateState, RenderError> {
        let mut powered_off = false;
        if let Some(key) = &self.keys.power {
            let table = self
                .translator
                .power_states
                .as_ref()
                .ok_or(RenderError::MissingTable { attribute: "power" })?;
            let raw: C::Value = snapshot.vendor_value(key)?;
            powered_off = table.to_domain(&raw)? == PowerState::Off;
        }

        let hvac_mode = if powered_off {
            HvacMode::Off
        } else {
            let key = self
                .keys
                .hvac_mode
                .as_ref()
                .ok_or(RenderError::NoModeSource)?;
            let table = self
                .translator
                .hvac_modes
                .as_ref()
                .ok_or(RenderError::MissingTable {
                    attribute: "hvac_mode",
                })?;
            table.to_domain(&snapshot.vendor_value::<C::Value>(key)?)?
        };

        let hvac_action = self.translate_optional(
            snapshot,
            self.keys.hvac_action.as_deref(),
            self.translator.hvac_actions.as_ref(),
            "hvac_action",
        )?;
        let fan_mode = self.translate_optional(
            snapshot,
            self.keys.fan_mode.as_deref(),
            self.translator.fan_modes.as_ref(),
            "fan_mode",
        )?;
        let preset_mode = self.translate_optional(
            snapshot,
            self.keys.preset_mode.as_deref(),
            self.translator.preset_modes.as_ref(),
            "preset_mode",
        )?;
        let swing_mode = self.translate_optional(
            snapshot,
            self.keys.swing_mode.as_deref(),
            self.translator.swing_modes.as_ref(),
            "swing_mode",
        )?;

        Ok(ClimateState {
            hvac_mode,
            hvac_action,
            current_temperature: self.read_f64(snapshot, self.keys.current_temperature.as_deref()),
            target_temperature: self.read_f64(snapshot, self.keys.target_temperature.as_deref()),
            target_temperature_low: self
                .read_f64(snapshot, self.keys.target_temperature_low.as_deref()),
            target_temperature_high: self
                .read_f64(snapshot, self.keys.target_temperature_high.as_deref()),
            fan_mode,
            preset_mode,
            swing_mode,
            current_humidity: self.read_f64(snapshot, self.keys.current_humidity.as_deref()),
        })
    }

    /// Translate an optional attribute: absent key is `None`, an unknown
    /// value is an error, a configured key without a table is a defect
    fn translate_optional<D: Copy + Eq + std::hash::Hash + std::fmt::Debug>(
        &self,
        snapshot: &DeviceSnapshot,
        key: Option<&str>,
        table: Option<&TranslationTable<D, C::Value>>,
        attribute: &'static str,
    ) -> Result<Option<D>, RenderError> {
        let Some(key) = key else {
            return Ok(None);
        };
        if !snapshot.contains(key) {
            return Ok(None);
        }
        let table = table.ok_or(RenderError::MissingTable { attribute })?;
        let raw: C::Value = snapshot.vendor_value(key)?;
        Ok(Some(table.to_domain(&raw)?))
    }

    fn read_f64(&self, snapshot: &DeviceSnapshot, key: Option<&str>) -> Option<f64> {
        key.and_then(|k| snapshot.f64(k))
    }

    /// Reconcile rendered state after a successful vendor command
    async fn after_command(
        &self,
        apply: impl FnOnce(&mut ClimateState),
    ) -> Result<(), CommandError> {
        match self.policy.after_command {
            CommandSync::Optimistic => {
                self.render_tx.send_if_modified(|render| match render.state.as_mut() {
                    Some(state) => {
                        let before = state.clone();
                        apply(state);
                        *state != before
                    }
                    None => false,
                });
                Ok(())
            }
            CommandSync::Refresh => {
                // Re-requesting after the command also guarantees a refresh
                // that was in flight while we commanded cannot be the last
                // word on our state.
                self.coordinator
                    .request_refresh()
                    .await
                    .map_err(CommandError::from_vendor)
            }
        }
    }
}

/// Builder for [`ClimateEntityAdapter`]
pub struct ClimateEntityAdapterBuilder<C: VendorClient> {
    device: DeviceId,
    parent_unit: Option<DeviceId>,
    client: Arc<C>,
    coordinator: Arc<PollingCoordinator>,
    translator: Option<Arc<ClimateTranslator<C::Value>>>,
    keys: SnapshotKeys,
    capabilities: Option<DeviceCapabilities>,
    policy: IntegrationPolicy,
}

impl<C: VendorClient + 'static> ClimateEntityAdapterBuilder<C> {
    pub fn translator(mut self, translator: Arc<ClimateTranslator<C::Value>>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn keys(mut self, keys: SnapshotKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn capabilities(mut self, capabilities: DeviceCapabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    pub fn policy(mut self, policy: IntegrationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Declare the parent unit this zone belongs to
    pub fn parent_unit(mut self, unit: DeviceId) -> Self {
        self.parent_unit = Some(unit);
        self
    }

    /// Register with the coordinator and produce the adapter
    ///
    /// If the coordinator already holds a successful snapshot the adapter
    /// renders it immediately; otherwise it starts unavailable.
    pub fn build(self) -> ClimateEntityAdapter<C> {
        let (render_tx, _) = watch::channel(EntityRender::default());

        let inner = Arc::new(AdapterInner {
            device: self.device,
            parent_unit: self.parent_unit,
            client: self.client,
            coordinator: Arc::clone(&self.coordinator),
            translator: self.translator.unwrap_or_default(),
            keys: self.keys,
            capabilities: self
                .capabilities
                .unwrap_or_else(|| DeviceCapabilities::new(Vec::new())),
            policy: self.policy,
            render_tx,
        });

        // Seed from whatever the coordinator already knows.
        if let Some(snapshot) = inner.coordinator.snapshot() {
            if inner.coordinator.last_update_success() {
                match inner.render_snapshot(&snapshot) {
                    Ok(state) => inner.publish(EntityRender::available(state)),
                    Err(err) => {
                        error!(device = %inner.device, error = %err, "failed to render initial snapshot");
                    }
                }
            }
        }

        let weak = Arc::downgrade(&inner);
        let listener = self.coordinator.add_listener(Arc::new(move |update| {
            if let Some(inner) = weak.upgrade() {
                inner.apply_update(update);
            }
        }));

        ClimateEntityAdapter { inner, listener }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use climkit_core::{StateSource, VendorError};
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    type Script = Vec<Result<Vec<(String, Value)>, VendorError>>;

    #[derive(Debug, Clone, Default)]
    struct Calls {
        power: Vec<(DeviceId, bool)>,
        mode: Vec<(DeviceId, String)>,
        fan: Vec<(DeviceId, String)>,
        preset: Vec<(DeviceId, String)>,
        swing: Vec<(DeviceId, String)>,
        temperature: Vec<(DeviceId, f64)>,
        fetches: usize,
    }

    /// Vendor client double: replays a fetch script, records commands
    struct MockClient {
        script: Mutex<VecDeque<Result<Vec<(String, Value)>, VendorError>>>,
        calls: Mutex<Calls>,
        command_error: Option<VendorError>,
    }

    impl MockClient {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Calls::default()),
                command_error: None,
            })
        }

        fn with_failing_commands(script: Script, error: VendorError) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Calls::default()),
                command_error: Some(error),
            })
        }

        fn calls(&self) -> Calls {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StateSource for MockClient {
        async fn fetch_state(&self) -> Result<DeviceSnapshot, VendorError> {
            self.calls.lock().unwrap().fetches += 1;
            match self.script.lock().unwrap().pop_front() {
                Some(Ok(attrs)) => Ok(attrs.into_iter().collect()),
                Some(Err(err)) => Err(err),
                None => Ok(DeviceSnapshot::new(Default::default())),
            }
        }
    }

    #[async_trait]
    impl VendorClient for MockClient {
        type Value = String;

        async fn set_power(&self, device: &DeviceId, on: bool) -> Result<(), VendorError> {
            if let Some(err) = &self.command_error {
                return Err(err.clone());
            }
            self.calls.lock().unwrap().power.push((device.clone(), on));
            Ok(())
        }

        async fn set_target_temperature(
            &self,
            device: &DeviceId,
            value: f64,
        ) -> Result<(), VendorError> {
            if let Some(err) = &self.command_error {
                return Err(err.clone());
            }
            self.calls
                .lock()
                .unwrap()
                .temperature
                .push((device.clone(), value));
            Ok(())
        }

        async fn set_hvac_mode(&self, device: &DeviceId, value: String) -> Result<(), VendorError> {
            if let Some(err) = &self.command_error {
                return Err(err.clone());
            }
            self.calls.lock().unwrap().mode.push((device.clone(), value));
            Ok(())
        }

        async fn set_fan_mode(&self, device: &DeviceId, value: String) -> Result<(), VendorError> {
            if let Some(err) = &self.command_error {
                return Err(err.clone());
            }
            self.calls.lock().unwrap().fan.push((device.clone(), value));
            Ok(())
        }

        async fn set_preset_mode(
            &self,
            device: &DeviceId,
            value: String,
        ) -> Result<(), VendorError> {
            if let Some(err) = &self.command_error {
                return Err(err.clone());
            }
            self.calls
                .lock()
                .unwrap()
                .preset
                .push((device.clone(), value));
            Ok(())
        }

        async fn set_swing_mode(
            &self,
            device: &DeviceId,
            value: String,
        ) -> Result<(), VendorError> {
            if let Some(err) = &self.command_error {
                return Err(err.clone());
            }
            self.calls
                .lock()
                .unwrap()
                .swing
                .push((device.clone(), value));
            Ok(())
        }
    }

    fn device() -> DeviceId {
        "mock.unit".parse().unwrap()
    }

    fn translator() -> Arc<ClimateTranslator<String>> {
        Arc::new(
            ClimateTranslator::new()
                .with_power_states(
                    TranslationTable::builder("power")
                        .entry("on".to_string(), PowerState::On)
                        .entry("off".to_string(), PowerState::Off)
                        .build()
                        .unwrap(),
                )
                .with_hvac_modes(
                    TranslationTable::builder("hvac_mode")
                        .entry("Heat".to_string(), HvacMode::Heat)
                        .entry("Cool".to_string(), HvacMode::Cool)
                        .entry("Auto".to_string(), HvacMode::Auto)
                        .build()
                        .unwrap(),
                )
                .with_fan_modes(
                    TranslationTable::builder("fan_mode")
                        .entry("low".to_string(), FanMode::Low)
                        .entry("high".to_string(), FanMode::High)
                        .build()
                        .unwrap(),
                ),
        )
    }

    fn capabilities() -> DeviceCapabilities {
        DeviceCapabilities::new(vec![HvacMode::Off, HvacMode::Heat, HvacMode::Cool])
            .with_features(
                ClimateFeatures::TARGET_TEMPERATURE
                    | ClimateFeatures::FAN_MODE
                    | ClimateFeatures::TURN_ON
                    | ClimateFeatures::TURN_OFF,
            )
            .with_fan_modes(vec![FanMode::Low, FanMode::High])
    }

    fn keys() -> SnapshotKeys {
        SnapshotKeys::new()
            .with_power("power")
            .with_hvac_mode("mode")
            .with_target_temperature("setpoint")
            .with_fan_mode("fan")
    }

    fn coordinator(client: &Arc<MockClient>) -> Arc<PollingCoordinator> {
        Arc::new(PollingCoordinator::new(
            "mock",
            client.clone(),
            Duration::from_secs(30),
        ))
    }

    fn adapter(
        client: &Arc<MockClient>,
        coord: &Arc<PollingCoordinator>,
        policy: IntegrationPolicy,
    ) -> ClimateEntityAdapter<MockClient> {
        ClimateEntityAdapter::builder(device(), client.clone(), coord.clone())
            .translator(translator())
            .keys(keys())
            .capabilities(capabilities())
            .policy(policy)
            .build()
    }

    #[tokio::test]
    async fn test_power_then_mode_scenario() {
        // First snapshot reports only a powered-off device; the second
        // powers on in Heat. The adapter must follow, one notification per
        // refresh.
        let client = MockClient::new(vec![
            Ok(vec![("power".to_string(), json!("off"))]),
            Ok(vec![
                ("power".to_string(), json!("on")),
                ("mode".to_string(), json!("Heat")),
            ]),
        ]);
        let coord = coordinator(&client);
        let entity = adapter(&client, &coord, IntegrationPolicy::default());
        let mut rx = entity.subscribe();

        assert!(!entity.is_available());
        assert_eq!(entity.hvac_mode(), None);

        coord.async_refresh().await.unwrap();
        assert_eq!(entity.hvac_mode(), Some(HvacMode::Off));
        assert!(entity.is_available());
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert!(!rx.has_changed().unwrap());

        coord.request_refresh().await.unwrap();
        assert_eq!(entity.hvac_mode(), Some(HvacMode::Heat));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_off_special_case_uses_power_command() {
        let client = MockClient::new(vec![Ok(vec![
            ("power".to_string(), json!("on")),
            ("mode".to_string(), json!("Cool")),
        ])]);
        let coord = coordinator(&client);
        let entity = adapter(
            &client,
            &coord,
            IntegrationPolicy {
                off_via_power: true,
                after_command: CommandSync::Optimistic,
                ..IntegrationPolicy::default()
            },
        );
        coord.async_refresh().await.unwrap();

        entity.set_hvac_mode(HvacMode::Off).await.unwrap();

        let calls = client.calls();
        assert_eq!(calls.power, vec![(device(), false)]);
        assert!(calls.mode.is_empty(), "no mode-set call expected for OFF");
        assert_eq!(entity.hvac_mode(), Some(HvacMode::Off));
    }

    #[tokio::test]
    async fn test_set_hvac_mode_translates_and_dispatches() {
        let client = MockClient::new(vec![Ok(vec![
            ("power".to_string(), json!("on")),
            ("mode".to_string(), json!("Heat")),
        ])]);
        let coord = coordinator(&client);
        let entity = adapter(
            &client,
            &coord,
            IntegrationPolicy {
                after_command: CommandSync::Optimistic,
                ..IntegrationPolicy::default()
            },
        );
        coord.async_refresh().await.unwrap();

        entity.set_hvac_mode(HvacMode::Cool).await.unwrap();

        let calls = client.calls();
        assert_eq!(calls.mode, vec![(device(), "Cool".to_string())]);
        assert_eq!(entity.hvac_mode(), Some(HvacMode::Cool));
    }

    #[tokio::test]
    async fn test_unadvertised_mode_rejected_before_io() {
        let client = MockClient::new(vec![Ok(vec![
            ("power".to_string(), json!("on")),
            ("mode".to_string(), json!("Heat")),
        ])]);
        let coord = coordinator(&client);
        let entity = adapter(&client, &coord, IntegrationPolicy::default());
        coord.async_refresh().await.unwrap();

        let err = entity.set_hvac_mode(HvacMode::Dry).await.unwrap_err();
        assert!(matches!(err, CommandError::UnsupportedMode { .. }));

        let calls = client.calls();
        assert!(calls.mode.is_empty());
        assert!(calls.power.is_empty());
    }

    #[tokio::test]
    async fn test_set_temperature_out_of_range() {
        let client = MockClient::new(vec![Ok(vec![
            ("power".to_string(), json!("on")),
            ("mode".to_string(), json!("Heat")),
        ])]);
        let coord = coordinator(&client);
        let entity = adapter(&client, &coord, IntegrationPolicy::default());
        coord.async_refresh().await.unwrap();

        let err = entity.set_temperature(40.0).await.unwrap_err();
        assert!(matches!(
            err,
            CommandError::OutOfRange { value, .. } if value == 40.0
        ));
        assert!(client.calls().temperature.is_empty());
    }

    #[tokio::test]
    async fn test_optimistic_temperature_update() {
        let client = MockClient::new(vec![Ok(vec![
            ("power".to_string(), json!("on")),
            ("mode".to_string(), json!("Heat")),
            ("setpoint".to_string(), json!(20.0)),
        ])]);
        let coord = coordinator(&client);
        let entity = adapter(
            &client,
            &coord,
            IntegrationPolicy {
                after_command: CommandSync::Optimistic,
                ..IntegrationPolicy::default()
            },
        );
        coord.async_refresh().await.unwrap();
        assert_eq!(entity.target_temperature(), Some(20.0));

        entity.set_temperature(22.5).await.unwrap();

        // Rendered immediately, no second fetch
        assert_eq!(entity.target_temperature(), Some(22.5));
        let calls = client.calls();
        assert_eq!(calls.temperature, vec![(device(), 22.5)]);
        assert_eq!(calls.fetches, 1);
    }

    #[tokio::test]
    async fn test_refresh_after_command_policy() {
        let client = MockClient::new(vec![
            Ok(vec![
                ("power".to_string(), json!("on")),
                ("mode".to_string(), json!("Heat")),
                ("setpoint".to_string(), json!(20.0)),
            ]),
            Ok(vec![
                ("power".to_string(), json!("on")),
                ("mode".to_string(), json!("Heat")),
                ("setpoint".to_string(), json!(22.5)),
            ]),
        ]);
        let coord = coordinator(&client);
        let entity = adapter(
            &client,
            &coord,
            IntegrationPolicy {
                after_command: CommandSync::Refresh,
                ..IntegrationPolicy::default()
            },
        );
        coord.async_refresh().await.unwrap();

        entity.set_temperature(22.5).await.unwrap();

        // The confirming refresh ran and its snapshot is what renders
        assert_eq!(client.calls().fetches, 2);
        assert_eq!(entity.target_temperature(), Some(22.5));
    }

    #[tokio::test]
    async fn test_turn_on_powers_parent_unit_first() {
        let unit: DeviceId = "mock.main_unit".parse().unwrap();
        let client = MockClient::new(vec![Ok(vec![
            ("power".to_string(), json!("off")),
        ])]);
        let coord = coordinator(&client);
        let entity = ClimateEntityAdapter::builder(device(), client.clone(), coord.clone())
            .translator(translator())
            .keys(keys())
            .capabilities(capabilities())
            .policy(IntegrationPolicy {
                after_command: CommandSync::Optimistic,
                ..IntegrationPolicy::default()
            })
            .parent_unit(unit.clone())
            .build();
        coord.async_refresh().await.unwrap();

        entity.turn_on().await.unwrap();

        // Explicit unit power-on, then the zone
        assert_eq!(
            client.calls().power,
            vec![(unit, true), (device(), true)]
        );
    }

    #[tokio::test]
    async fn test_turn_off_renders_off_optimistically() {
        let client = MockClient::new(vec![Ok(vec![
            ("power".to_string(), json!("on")),
            ("mode".to_string(), json!("Cool")),
        ])]);
        let coord = coordinator(&client);
        let entity = adapter(
            &client,
            &coord,
            IntegrationPolicy {
                after_command: CommandSync::Optimistic,
                ..IntegrationPolicy::default()
            },
        );
        coord.async_refresh().await.unwrap();
        assert_eq!(entity.hvac_mode(), Some(HvacMode::Cool));

        entity.turn_off().await.unwrap();

        assert_eq!(client.calls().power, vec![(device(), false)]);
        assert_eq!(entity.hvac_mode(), Some(HvacMode::Off));
    }

    #[tokio::test]
    async fn test_hide_stale_policy_goes_unavailable() {
        let client = MockClient::new(vec![
            Ok(vec![
                ("power".to_string(), json!("on")),
                ("mode".to_string(), json!("Heat")),
            ]),
            Err(VendorError::Transport("unreachable".into())),
        ]);
        let coord = coordinator(&client);
        let entity = adapter(
            &client,
            &coord,
            IntegrationPolicy {
                on_failure: FailurePolicy::HideStaleData,
                ..IntegrationPolicy::default()
            },
        );

        coord.async_refresh().await.unwrap();
        assert!(entity.is_available());

        coord.async_refresh().await.unwrap();
        assert!(!entity.is_available());
        assert_eq!(entity.hvac_mode(), None);
    }

    #[tokio::test]
    async fn test_keep_stale_policy_flags_assumed() {
        let client = MockClient::new(vec![
            Ok(vec![
                ("power".to_string(), json!("on")),
                ("mode".to_string(), json!("Heat")),
            ]),
            Err(VendorError::Transport("unreachable".into())),
            Ok(vec![
                ("power".to_string(), json!("on")),
                ("mode".to_string(), json!("Heat")),
            ]),
        ]);
        let coord = coordinator(&client);
        let entity = adapter(
            &client,
            &coord,
            IntegrationPolicy {
                on_failure: FailurePolicy::KeepStaleData,
                ..IntegrationPolicy::default()
            },
        );

        coord.async_refresh().await.unwrap();
        assert!(!entity.assumed_state());

        // Failure: last-known-good stays up, flagged assumed
        coord.async_refresh().await.unwrap();
        assert!(entity.is_available());
        assert!(entity.assumed_state());
        assert_eq!(entity.hvac_mode(), Some(HvacMode::Heat));

        // Recovery clears the flag
        coord.async_refresh().await.unwrap();
        assert!(!entity.assumed_state());
    }

    #[tokio::test]
    async fn test_unknown_vendor_mode_renders_unavailable() {
        let client = MockClient::new(vec![Ok(vec![
            ("power".to_string(), json!("on")),
            ("mode".to_string(), json!("Blast")),
        ])]);
        let coord = coordinator(&client);
        let entity = adapter(&client, &coord, IntegrationPolicy::default());

        coord.async_refresh().await.unwrap();

        // Unknown value fails the render loudly instead of defaulting
        assert!(!entity.is_available());
        assert_eq!(entity.hvac_mode(), None);
    }

    #[tokio::test]
    async fn test_rejected_command_surfaces_reason() {
        let client = MockClient::with_failing_commands(
            vec![Ok(vec![
                ("power".to_string(), json!("on")),
                ("mode".to_string(), json!("Heat")),
            ])],
            VendorError::Rejected {
                reason: "compressor lockout".into(),
            },
        );
        let coord = coordinator(&client);
        let entity = adapter(&client, &coord, IntegrationPolicy::default());
        coord.async_refresh().await.unwrap();

        let err = entity.set_temperature(21.0).await.unwrap_err();
        assert!(matches!(
            err,
            CommandError::VendorRejected { ref reason } if reason == "compressor lockout"
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_on_command() {
        let client = MockClient::with_failing_commands(
            vec![Ok(vec![
                ("power".to_string(), json!("on")),
                ("mode".to_string(), json!("Heat")),
            ])],
            VendorError::Timeout("5s".into()),
        );
        let coord = coordinator(&client);
        let entity = adapter(&client, &coord, IntegrationPolicy::default());
        coord.async_refresh().await.unwrap();

        let err = entity.set_hvac_mode(HvacMode::Cool).await.unwrap_err();
        assert!(matches!(err, CommandError::VendorUnavailable(_)));
    }

    #[tokio::test]
    async fn test_fan_mode_round_trip() {
        let client = MockClient::new(vec![Ok(vec![
            ("power".to_string(), json!("on")),
            ("mode".to_string(), json!("Heat")),
            ("fan".to_string(), json!("low")),
        ])]);
        let coord = coordinator(&client);
        let entity = adapter(
            &client,
            &coord,
            IntegrationPolicy {
                after_command: CommandSync::Optimistic,
                ..IntegrationPolicy::default()
            },
        );
        coord.async_refresh().await.unwrap();
        assert_eq!(entity.fan_mode(), Some(FanMode::Low));

        entity.set_fan_mode(FanMode::High).await.unwrap();
        assert_eq!(client.calls().fan, vec![(device(), "high".to_string())]);
        assert_eq!(entity.fan_mode(), Some(FanMode::High));

        // Advertised list is the gate, not just the table
        let err = entity.set_fan_mode(FanMode::Auto).await.unwrap_err();
        assert!(matches!(err, CommandError::UnsupportedMode { .. }));
    }

    #[tokio::test]
    async fn test_adapter_seeds_from_existing_snapshot() {
        let client = MockClient::new(vec![Ok(vec![
            ("power".to_string(), json!("on")),
            ("mode".to_string(), json!("Heat")),
        ])]);
        let coord = coordinator(&client);
        coord.async_refresh().await.unwrap();

        // Built after the coordinator already has data
        let entity = adapter(&client, &coord, IntegrationPolicy::default());
        assert!(entity.is_available());
        assert_eq!(entity.hvac_mode(), Some(HvacMode::Heat));
    }

    #[tokio::test]
    async fn test_drop_deregisters_listener() {
        let client = MockClient::new(vec![]);
        let coord = coordinator(&client);
        let entity = adapter(&client, &coord, IntegrationPolicy::default());

        assert_eq!(coord.listener_count(), 1);
        drop(entity);
        assert_eq!(coord.listener_count(), 0);
    }
}
