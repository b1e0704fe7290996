//! Domain-level climate vocabulary
//!
//! These enums are the hub-side vocabulary every vendor integration maps its
//! native values onto. The variants match the climate domain of the
//! surrounding hub: adding a variant here is an API change for every
//! translation table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall operating mode of a climate device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    /// Device is off
    Off,
    /// Heating to the target temperature
    Heat,
    /// Cooling to the target temperature
    Cool,
    /// Heating or cooling to keep within a target range
    HeatCool,
    /// Removing humidity, temperature secondary
    Dry,
    /// Fan circulation only
    FanOnly,
    /// Device follows its own schedule/logic
    Auto,
}

impl HvacMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::Off => "off",
            HvacMode::Heat => "heat",
            HvacMode::Cool => "cool",
            HvacMode::HeatCool => "heat_cool",
            HvacMode::Dry => "dry",
            HvacMode::FanOnly => "fan_only",
            HvacMode::Auto => "auto",
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the device is currently doing, as opposed to what it is set to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacAction {
    Off,
    Preheating,
    Heating,
    Cooling,
    Drying,
    Fan,
    Idle,
    Defrosting,
}

impl HvacAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacAction::Off => "off",
            HvacAction::Preheating => "preheating",
            HvacAction::Heating => "heating",
            HvacAction::Cooling => "cooling",
            HvacAction::Drying => "drying",
            HvacAction::Fan => "fan",
            HvacAction::Idle => "idle",
            HvacAction::Defrosting => "defrosting",
        }
    }
}

impl fmt::Display for HvacAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fan speed / behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanMode {
    Auto,
    On,
    Off,
    Low,
    Medium,
    High,
    Middle,
    Focus,
    Diffuse,
    Quiet,
}

impl FanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FanMode::Auto => "auto",
            FanMode::On => "on",
            FanMode::Off => "off",
            FanMode::Low => "low",
            FanMode::Medium => "medium",
            FanMode::High => "high",
            FanMode::Middle => "middle",
            FanMode::Focus => "focus",
            FanMode::Diffuse => "diffuse",
            FanMode::Quiet => "quiet",
        }
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vendor-defined comfort program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetMode {
    /// No preset active
    None,
    Eco,
    Away,
    Boost,
    Comfort,
    Home,
    Sleep,
    Activity,
}

impl PresetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetMode::None => "none",
            PresetMode::Eco => "eco",
            PresetMode::Away => "away",
            PresetMode::Boost => "boost",
            PresetMode::Comfort => "comfort",
            PresetMode::Home => "home",
            PresetMode::Sleep => "sleep",
            PresetMode::Activity => "activity",
        }
    }
}

impl fmt::Display for PresetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Louver swing behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingMode {
    Off,
    On,
    Vertical,
    Horizontal,
    Both,
}

impl SwingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwingMode::Off => "off",
            SwingMode::On => "on",
            SwingMode::Vertical => "vertical",
            SwingMode::Horizontal => "horizontal",
            SwingMode::Both => "both",
        }
    }
}

impl fmt::Display for SwingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw power state of a device or zone
///
/// Separate from [`HvacMode::Off`]: several vendors report power and mode as
/// independent attributes, and a powered-off device renders as `Off`
/// regardless of its last configured mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    pub fn is_on(&self) -> bool {
        matches!(self, PowerState::On)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PowerState::On => "on",
            PowerState::Off => "off",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&HvacMode::HeatCool).unwrap(),
            "\"heat_cool\""
        );
        assert_eq!(
            serde_json::from_str::<HvacMode>("\"fan_only\"").unwrap(),
            HvacMode::FanOnly
        );
        assert_eq!(
            serde_json::to_string(&PresetMode::None).unwrap(),
            "\"none\""
        );
    }

    #[test]
    fn test_display_matches_serde() {
        for mode in [
            HvacMode::Off,
            HvacMode::Heat,
            HvacMode::Cool,
            HvacMode::HeatCool,
            HvacMode::Dry,
            HvacMode::FanOnly,
            HvacMode::Auto,
        ] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{mode}\""));
        }
    }

    #[test]
    fn test_power_state() {
        assert!(PowerState::On.is_on());
        assert!(!PowerState::Off.is_on());
    }
}
