//! breeze integration options

use climkit_core::TemperatureUnit;
use serde::Deserialize;

fn default_base_url() -> String {
    "https://api.breezehvac.io".to_string()
}

/// Options for one breeze account
#[derive(Debug, Clone, Deserialize)]
pub struct BreezeConfig {
    /// Account API key
    pub api_key: String,

    /// API endpoint, overridable for testing and regional clouds
    #[serde(default = "default_base_url")]
    pub base_url: String,

    pub devices: Vec<BreezeDeviceConfig>,
}

/// One pod on the account
#[derive(Debug, Clone, Deserialize)]
pub struct BreezeDeviceConfig {
    /// Pod identifier on the vendor side
    pub pod_id: String,

    /// Local object id; the entity becomes `breeze.<object_id>`
    pub object_id: String,

    /// Unit the pod reports and accepts temperatures in
    #[serde(default)]
    pub unit: TemperatureUnit,
}
