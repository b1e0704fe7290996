//! Per-device capability declaration
//!
//! Capabilities are explicit data computed once at setup. Command validation
//! consults these sets with ordinary membership tests; nothing probes a
//! vendor client for what it happens to implement.

use std::ops::{BitOr, BitOrAssign};

use crate::modes::{FanMode, HvacMode, PresetMode, SwingMode};
use crate::units::TemperatureUnit;
use crate::{DEFAULT_MAX_TEMP, DEFAULT_MIN_TEMP};

/// Bit set of features a device supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClimateFeatures(u32);

impl ClimateFeatures {
    pub const NONE: Self = Self(0);
    pub const TARGET_TEMPERATURE: Self = Self(1);
    pub const TARGET_TEMPERATURE_RANGE: Self = Self(1 << 1);
    pub const TARGET_HUMIDITY: Self = Self(1 << 2);
    pub const FAN_MODE: Self = Self(1 << 3);
    pub const PRESET_MODE: Self = Self(1 << 4);
    pub const SWING_MODE: Self = Self(1 << 5);
    pub const TURN_ON: Self = Self(1 << 6);
    pub const TURN_OFF: Self = Self(1 << 7);

    /// Check whether every flag in `other` is set
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Add flags in place
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ClimateFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ClimateFeatures {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Everything one device instance advertises to callers
///
/// The advertised mode lists bound what commands the adapter accepts for
/// this device; they may be a strict subset of what the vendor's translation
/// tables cover.
#[derive(Debug, Clone)]
pub struct DeviceCapabilities {
    pub features: ClimateFeatures,
    pub hvac_modes: Vec<HvacMode>,
    pub fan_modes: Vec<FanMode>,
    pub preset_modes: Vec<PresetMode>,
    pub swing_modes: Vec<SwingMode>,
    pub min_temp: f64,
    pub max_temp: f64,
    pub target_step: Option<f64>,
    pub unit: TemperatureUnit,
}

impl DeviceCapabilities {
    /// Create capabilities with the given HVAC mode list and defaults for the rest
    pub fn new(hvac_modes: Vec<HvacMode>) -> Self {
        Self {
            features: ClimateFeatures::NONE,
            hvac_modes,
            fan_modes: Vec::new(),
            preset_modes: Vec::new(),
            swing_modes: Vec::new(),
            min_temp: DEFAULT_MIN_TEMP,
            max_temp: DEFAULT_MAX_TEMP,
            target_step: None,
            unit: TemperatureUnit::Celsius,
        }
    }

    pub fn with_features(mut self, features: ClimateFeatures) -> Self {
        self.features = features;
        self
    }

    pub fn with_fan_modes(mut self, fan_modes: Vec<FanMode>) -> Self {
        self.fan_modes = fan_modes;
        self
    }

    pub fn with_preset_modes(mut self, preset_modes: Vec<PresetMode>) -> Self {
        self.preset_modes = preset_modes;
        self
    }

    pub fn with_swing_modes(mut self, swing_modes: Vec<SwingMode>) -> Self {
        self.swing_modes = swing_modes;
        self
    }

    pub fn with_temperature_range(mut self, min: f64, max: f64) -> Self {
        self.min_temp = min;
        self.max_temp = max;
        self
    }

    pub fn with_target_step(mut self, step: f64) -> Self {
        self.target_step = Some(step);
        self
    }

    pub fn with_unit(mut self, unit: TemperatureUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn supports_hvac_mode(&self, mode: HvacMode) -> bool {
        self.hvac_modes.contains(&mode)
    }

    pub fn supports_fan_mode(&self, mode: FanMode) -> bool {
        self.fan_modes.contains(&mode)
    }

    pub fn supports_preset_mode(&self, mode: PresetMode) -> bool {
        self.preset_modes.contains(&mode)
    }

    pub fn supports_swing_mode(&self, mode: SwingMode) -> bool {
        self.swing_modes.contains(&mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_flags() {
        let features = ClimateFeatures::TARGET_TEMPERATURE
            | ClimateFeatures::FAN_MODE
            | ClimateFeatures::TURN_OFF;

        assert!(features.contains(ClimateFeatures::TARGET_TEMPERATURE));
        assert!(features.contains(ClimateFeatures::FAN_MODE));
        assert!(!features.contains(ClimateFeatures::PRESET_MODE));
        assert!(features.contains(ClimateFeatures::TARGET_TEMPERATURE | ClimateFeatures::FAN_MODE));
        assert!(!features
            .contains(ClimateFeatures::TARGET_TEMPERATURE | ClimateFeatures::PRESET_MODE));
    }

    #[test]
    fn test_empty_features() {
        let features = ClimateFeatures::NONE;
        assert!(features.is_empty());
        // Every set contains the empty set
        assert!(features.contains(ClimateFeatures::NONE));
    }

    #[test]
    fn test_insert() {
        let mut features = ClimateFeatures::NONE;
        features.insert(ClimateFeatures::SWING_MODE);
        features |= ClimateFeatures::TURN_ON;
        assert!(features.contains(ClimateFeatures::SWING_MODE | ClimateFeatures::TURN_ON));
    }

    #[test]
    fn test_capability_defaults() {
        let caps = DeviceCapabilities::new(vec![HvacMode::Off, HvacMode::Heat]);
        assert_eq!(caps.min_temp, DEFAULT_MIN_TEMP);
        assert_eq!(caps.max_temp, DEFAULT_MAX_TEMP);
        assert_eq!(caps.unit, TemperatureUnit::Celsius);
        assert!(caps.supports_hvac_mode(HvacMode::Heat));
        assert!(!caps.supports_hvac_mode(HvacMode::Cool));
        assert!(!caps.supports_fan_mode(FanMode::Auto));
    }

    #[test]
    fn test_builder_chain() {
        let caps = DeviceCapabilities::new(vec![HvacMode::Off, HvacMode::Cool])
            .with_features(ClimateFeatures::TARGET_TEMPERATURE | ClimateFeatures::FAN_MODE)
            .with_fan_modes(vec![FanMode::Low, FanMode::High])
            .with_temperature_range(16.0, 30.0)
            .with_target_step(0.5)
            .with_unit(TemperatureUnit::Fahrenheit);

        assert!(caps.supports_fan_mode(FanMode::High));
        assert_eq!(caps.min_temp, 16.0);
        assert_eq!(caps.target_step, Some(0.5));
        assert_eq!(caps.unit, TemperatureUnit::Fahrenheit);
    }
}
