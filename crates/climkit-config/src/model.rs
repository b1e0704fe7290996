//! Typed hub configuration

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

/// Hub-level default polling interval in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

/// Top-level hub configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Default polling interval in seconds, overridable per integration
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    #[serde(default)]
    pub integrations: Vec<IntegrationConfig>,
}

/// One configured integration instance
///
/// `options` is an opaque map the named vendor parses itself via
/// [`IntegrationConfig::parse_options`]; this crate does not know any
/// vendor's option shapes.
#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationConfig {
    /// Vendor key (e.g. "breeze", "zonal")
    pub vendor: String,

    /// Instance name, unique across the hub
    pub name: String,

    /// Per-integration polling interval override in seconds
    #[serde(default)]
    pub poll_interval: Option<u64>,

    /// Vendor-specific options
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
}

impl HubConfig {
    /// Check cross-field constraints a serde parse cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        if self.poll_interval == 0 {
            return Err(ConfigError::InvalidPollInterval("<hub>".to_string()));
        }

        let mut names = HashSet::new();
        for integration in &self.integrations {
            if !names.insert(integration.name.as_str()) {
                return Err(ConfigError::DuplicateIntegration(integration.name.clone()));
            }
            if integration.poll_interval == Some(0) {
                return Err(ConfigError::InvalidPollInterval(integration.name.clone()));
            }
        }
        Ok(())
    }

    /// Effective polling interval for one integration
    pub fn poll_interval_for(&self, integration: &IntegrationConfig) -> Duration {
        Duration::from_secs(integration.poll_interval.unwrap_or(self.poll_interval))
    }
}

impl IntegrationConfig {
    /// Parse the opaque options map into a vendor's typed config
    pub fn parse_options<T: serde::de::DeserializeOwned>(&self) -> ConfigResult<T> {
        let value = serde_json::Value::Object(
            self.options
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );
        serde_json::from_value(value).map_err(|source| ConfigError::InvalidOptions {
            name: self.name.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn integration(name: &str, poll: Option<u64>) -> IntegrationConfig {
        IntegrationConfig {
            vendor: "breeze".to_string(),
            name: name.to_string(),
            poll_interval: poll,
            options: HashMap::new(),
        }
    }

    #[test]
    fn test_validate_ok() {
        let config = HubConfig {
            poll_interval: 30,
            integrations: vec![integration("a", None), integration("b", Some(15))],
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let config = HubConfig {
            poll_interval: 30,
            integrations: vec![integration("same", None), integration("same", None)],
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateIntegration(name)) if name == "same"
        ));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = HubConfig {
            poll_interval: 30,
            integrations: vec![integration("a", Some(0))],
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPollInterval(_))
        ));
    }

    #[test]
    fn test_interval_fallback() {
        let config = HubConfig {
            poll_interval: 30,
            integrations: vec![integration("a", None), integration("b", Some(15))],
        };
        assert_eq!(
            config.poll_interval_for(&config.integrations[0]),
            Duration::from_secs(30)
        );
        assert_eq!(
            config.poll_interval_for(&config.integrations[1]),
            Duration::from_secs(15)
        );
    }

    #[test]
    fn test_parse_options_typed() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Opts {
            api_key: String,
            #[serde(default)]
            region: Option<String>,
        }

        let mut integration = integration("a", None);
        integration
            .options
            .insert("api_key".to_string(), json!("secret"));

        let opts: Opts = integration.parse_options().unwrap();
        assert_eq!(opts.api_key, "secret");
        assert_eq!(opts.region, None);
    }

    #[test]
    fn test_parse_options_missing_field() {
        #[derive(Debug, serde::Deserialize)]
        struct Opts {
            #[allow(dead_code)]
            api_key: String,
        }

        let integration = integration("a", None);
        let result: ConfigResult<Opts> = integration.parse_options();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidOptions { name, .. }) if name == "a"
        ));
    }
}
