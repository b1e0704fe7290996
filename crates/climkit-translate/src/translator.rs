//! Per-vendor bundle of translation tables

use climkit_core::{FanMode, HvacAction, HvacMode, PowerState, PresetMode, SwingMode, VendorValue};

use crate::table::TranslationTable;

/// All translation tables one vendor's device family needs
///
/// Assembled once at integration setup and shared (behind an `Arc`) by every
/// entity of that vendor. Tables are optional: a heat-only vendor with no
/// fan has no fan table, and an adapter asked to render or command an
/// attribute without a table fails loudly rather than guessing.
#[derive(Debug, Clone)]
pub struct ClimateTranslator<V> {
    pub power_states: Option<TranslationTable<PowerState, V>>,
    pub hvac_modes: Option<TranslationTable<HvacMode, V>>,
    pub hvac_actions: Option<TranslationTable<HvacAction, V>>,
    pub fan_modes: Option<TranslationTable<FanMode, V>>,
    pub preset_modes: Option<TranslationTable<PresetMode, V>>,
    pub swing_modes: Option<TranslationTable<SwingMode, V>>,
}

impl<V> Default for ClimateTranslator<V> {
    fn default() -> Self {
        Self {
            power_states: None,
            hvac_modes: None,
            hvac_actions: None,
            fan_modes: None,
            preset_modes: None,
            swing_modes: None,
        }
    }
}

impl<V: VendorValue> ClimateTranslator<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_power_states(mut self, table: TranslationTable<PowerState, V>) -> Self {
        self.power_states = Some(table);
        self
    }

    pub fn with_hvac_modes(mut self, table: TranslationTable<HvacMode, V>) -> Self {
        self.hvac_modes = Some(table);
        self
    }

    pub fn with_hvac_actions(mut self, table: TranslationTable<HvacAction, V>) -> Self {
        self.hvac_actions = Some(table);
        self
    }

    pub fn with_fan_modes(mut self, table: TranslationTable<FanMode, V>) -> Self {
        self.fan_modes = Some(table);
        self
    }

    pub fn with_preset_modes(mut self, table: TranslationTable<PresetMode, V>) -> Self {
        self.preset_modes = Some(table);
        self
    }

    pub fn with_swing_modes(mut self, table: TranslationTable<SwingMode, V>) -> Self {
        self.swing_modes = Some(table);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assembly() {
        let translator: ClimateTranslator<String> = ClimateTranslator::new()
            .with_power_states(
                TranslationTable::builder("power")
                    .entry("on".to_string(), PowerState::On)
                    .entry("off".to_string(), PowerState::Off)
                    .build()
                    .unwrap(),
            )
            .with_hvac_modes(
                TranslationTable::builder("hvac_mode")
                    .entry("hot".to_string(), HvacMode::Heat)
                    .build()
                    .unwrap(),
            );

        assert!(translator.power_states.is_some());
        assert!(translator.hvac_modes.is_some());
        assert!(translator.fan_modes.is_none());

        let modes = translator.hvac_modes.unwrap();
        assert_eq!(
            modes.to_domain(&"hot".to_string()).unwrap(),
            HvacMode::Heat
        );
    }
}
