//! breeze vocabulary
//!
//! The cloud API reports three spellings of automatic operation: plain
//! `"auto"` plus `"autoHeat"`/`"autoCool"` for which stage the algorithm is
//! in. All three fold onto `Auto` (commands always send `"auto"`), so the
//! mode table is intentionally non-invertible. Likewise `"strong"` folds
//! onto `High`.

use climkit_core::{FanMode, HvacMode, PowerState, PresetMode, SwingMode};
use climkit_translate::{ClimateTranslator, TableBuildError, TranslationTable};

pub fn power_states() -> Result<TranslationTable<PowerState, String>, TableBuildError> {
    TranslationTable::builder("breeze/power")
        .entry("on".to_string(), PowerState::On)
        .entry("off".to_string(), PowerState::Off)
        .build()
}

pub fn hvac_modes() -> Result<TranslationTable<HvacMode, String>, TableBuildError> {
    TranslationTable::builder("breeze/hvac_mode")
        .entry("hot".to_string(), HvacMode::Heat)
        .entry("cool".to_string(), HvacMode::Cool)
        .entry("dry".to_string(), HvacMode::Dry)
        .entry("fan".to_string(), HvacMode::FanOnly)
        .entry("auto".to_string(), HvacMode::Auto)
        .alias("autoHeat".to_string(), HvacMode::Auto)
        .alias("autoCool".to_string(), HvacMode::Auto)
        .build()
}

pub fn fan_modes() -> Result<TranslationTable<FanMode, String>, TableBuildError> {
    TranslationTable::builder("breeze/fan_mode")
        .entry("quiet".to_string(), FanMode::Quiet)
        .entry("low".to_string(), FanMode::Low)
        .entry("medium".to_string(), FanMode::Medium)
        .entry("high".to_string(), FanMode::High)
        .entry("auto".to_string(), FanMode::Auto)
        .alias("strong".to_string(), FanMode::High)
        .build()
}

pub fn preset_modes() -> Result<TranslationTable<PresetMode, String>, TableBuildError> {
    TranslationTable::builder("breeze/preset_mode")
        .entry("none".to_string(), PresetMode::None)
        .entry("eco".to_string(), PresetMode::Eco)
        .entry("boost".to_string(), PresetMode::Boost)
        .entry("sleep".to_string(), PresetMode::Sleep)
        .build()
}

pub fn swing_modes() -> Result<TranslationTable<SwingMode, String>, TableBuildError> {
    TranslationTable::builder("breeze/swing_mode")
        .entry("stopped".to_string(), SwingMode::Off)
        .entry("rangeFull".to_string(), SwingMode::Vertical)
        .entry("horizontal".to_string(), SwingMode::Horizontal)
        .entry("both".to_string(), SwingMode::Both)
        .build()
}

pub fn translator() -> Result<ClimateTranslator<String>, TableBuildError> {
    Ok(ClimateTranslator::new()
        .with_power_states(power_states()?)
        .with_hvac_modes(hvac_modes()?)
        .with_fan_modes(fan_modes()?)
        .with_preset_modes(preset_modes()?)
        .with_swing_modes(swing_modes()?))
}
