//! Rendered domain state of one climate entity

use climkit_core::{FanMode, HvacAction, HvacMode, PresetMode, SwingMode};

/// Domain-level view of a device, rendered from the latest snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateState {
    pub hvac_mode: HvacMode,
    pub hvac_action: Option<HvacAction>,
    pub current_temperature: Option<f64>,
    pub target_temperature: Option<f64>,
    pub target_temperature_low: Option<f64>,
    pub target_temperature_high: Option<f64>,
    pub fan_mode: Option<FanMode>,
    pub preset_mode: Option<PresetMode>,
    pub swing_mode: Option<SwingMode>,
    pub current_humidity: Option<f64>,
}

impl ClimateState {
    /// A state with the given mode and everything else unknown
    pub fn with_mode(hvac_mode: HvacMode) -> Self {
        Self {
            hvac_mode,
            hvac_action: None,
            current_temperature: None,
            target_temperature: None,
            target_temperature_low: None,
            target_temperature_high: None,
            fan_mode: None,
            preset_mode: None,
            swing_mode: None,
            current_humidity: None,
        }
    }
}

/// What the entity currently shows to callers and UI bindings
///
/// `state` is `None` while unavailable under a hide-stale policy or before
/// the first successful refresh. `assumed` is true when the last refresh
/// failed but the integration's policy keeps showing last-known-good data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityRender {
    pub available: bool,
    pub assumed: bool,
    pub state: Option<ClimateState>,
}

impl EntityRender {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn available(state: ClimateState) -> Self {
        Self {
            available: true,
            assumed: false,
            state: Some(state),
        }
    }
}
