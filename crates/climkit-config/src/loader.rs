//! Configuration file loading

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::HubConfig;

/// Load and validate a hub configuration file
pub fn load_file(path: impl AsRef<Path>) -> ConfigResult<HubConfig> {
    let path = path.as_ref();
    debug!("loading hub configuration from {:?}", path);

    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let config: HubConfig =
        serde_yaml::from_str(&content).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })?;

    config.validate()?;
    Ok(config)
}

/// Parse and validate hub configuration from a YAML string
pub fn from_str(content: &str) -> ConfigResult<HubConfig> {
    let config: HubConfig = serde_yaml::from_str(content)?;
    config.validate()?;
    Ok(config)
}
