//! zonal vocabulary
//!
//! The controller speaks integer codes. Fan code 4 is the installer-menu
//! "powerful" speed; it folds onto `High` (commands send 3), so the fan
//! table is non-invertible.

use climkit_core::{FanMode, HvacAction, HvacMode, PowerState};
use climkit_translate::{ClimateTranslator, TableBuildError, TranslationTable};

pub fn power_states() -> Result<TranslationTable<PowerState, u8>, TableBuildError> {
    TranslationTable::builder("zonal/power")
        .entry(0, PowerState::Off)
        .entry(1, PowerState::On)
        .build()
}

pub fn hvac_modes() -> Result<TranslationTable<HvacMode, u8>, TableBuildError> {
    TranslationTable::builder("zonal/hvac_mode")
        .entry(1, HvacMode::Heat)
        .entry(2, HvacMode::Cool)
        .entry(3, HvacMode::FanOnly)
        .entry(4, HvacMode::Dry)
        .entry(5, HvacMode::Auto)
        .build()
}

pub fn hvac_actions() -> Result<TranslationTable<HvacAction, u8>, TableBuildError> {
    TranslationTable::builder("zonal/hvac_action")
        .entry(0, HvacAction::Idle)
        .entry(1, HvacAction::Heating)
        .entry(2, HvacAction::Cooling)
        .entry(3, HvacAction::Fan)
        .build()
}

pub fn fan_modes() -> Result<TranslationTable<FanMode, u8>, TableBuildError> {
    TranslationTable::builder("zonal/fan_mode")
        .entry(0, FanMode::Auto)
        .entry(1, FanMode::Low)
        .entry(2, FanMode::Medium)
        .entry(3, FanMode::High)
        .alias(4, FanMode::High)
        .build()
}

pub fn translator() -> Result<ClimateTranslator<u8>, TableBuildError> {
    Ok(ClimateTranslator::new()
        .with_power_states(power_states()?)
        .with_hvac_modes(hvac_modes()?)
        .with_hvac_actions(hvac_actions()?)
        .with_fan_modes(fan_modes()?))
}
