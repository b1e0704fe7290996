//! Per-integration policies and snapshot attribute layout

/// What to render when a refresh fails
///
/// Both choices are legitimate; each integration must pick one explicitly
/// and document it. Hiding is right when stale climate data would mislead
/// (zoned systems that physically close); keeping is right for slow cloud
/// APIs where a blip should not blank the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Render unavailable and drop last-known-good data
    HideStaleData,
    /// Keep rendering the last snapshot, flagged as assumed
    KeepStaleData,
}

/// How to reconcile rendered state after a successful command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSync {
    /// Patch the rendered copy immediately; the next poll confirms
    Optimistic,
    /// Ask the coordinator for a refresh and wait for it
    Refresh,
}

/// The choices one integration makes for all of its entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrationPolicy {
    pub on_failure: FailurePolicy,
    pub after_command: CommandSync,
    /// Route `set_hvac_mode(Off)` to the dedicated power-off vendor command
    /// instead of a generic mode-set
    pub off_via_power: bool,
}

impl Default for IntegrationPolicy {
    fn default() -> Self {
        Self {
            on_failure: FailurePolicy::HideStaleData,
            after_command: CommandSync::Refresh,
            off_via_power: false,
        }
    }
}

/// Which snapshot attributes hold this device's state
///
/// Attribute names are vendor-chosen; zoned vendors prefix per zone (e.g.
/// `"zone_1/power"`). A key left `None` means the device does not report
/// that attribute. Rendering requires at least one of `power` / `hvac_mode`.
#[derive(Debug, Clone, Default)]
pub struct SnapshotKeys {
    pub power: Option<String>,
    pub hvac_mode: Option<String>,
    pub hvac_action: Option<String>,
    pub current_temperature: Option<String>,
    pub target_temperature: Option<String>,
    pub target_temperature_low: Option<String>,
    pub target_temperature_high: Option<String>,
    pub fan_mode: Option<String>,
    pub preset_mode: Option<String>,
    pub swing_mode: Option<String>,
    pub current_humidity: Option<String>,
}

impl SnapshotKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_power(mut self, key: impl Into<String>) -> Self {
        self.power = Some(key.into());
        self
    }

    pub fn with_hvac_mode(mut self, key: impl Into<String>) -> Self {
        self.hvac_mode = Some(key.into());
        self
    }

    pub fn with_hvac_action(mut self, key: impl Into<String>) -> Self {
        self.hvac_action = Some(key.into());
        self
    }

    pub fn with_current_temperature(mut self, key: impl Into<String>) -> Self {
        self.current_temperature = Some(key.into());
        self
    }

    pub fn with_target_temperature(mut self, key: impl Into<String>) -> Self {
        self.target_temperature = Some(key.into());
        self
    }

    pub fn with_target_temperature_range(
        mut self,
        low: impl Into<String>,
        high: impl Into<String>,
    ) -> Self {
        self.target_temperature_low = Some(low.into());
        self.target_temperature_high = Some(high.into());
        self
    }

    pub fn with_fan_mode(mut self, key: impl Into<String>) -> Self {
        self.fan_mode = Some(key.into());
        self
    }

    pub fn with_preset_mode(mut self, key: impl Into<String>) -> Self {
        self.preset_mode = Some(key.into());
        self
    }

    pub fn with_swing_mode(mut self, key: impl Into<String>) -> Self {
        self.swing_mode = Some(key.into());
        self
    }

    pub fn with_current_humidity(mut self, key: impl Into<String>) -> Self {
        self.current_humidity = Some(key.into());
        self
    }
}
