//! zonal integration options

use serde::Deserialize;

fn default_port() -> u16 {
    7600
}

fn default_unit_object_id() -> String {
    "unit".to_string()
}

/// Options for one zonal controller
#[derive(Debug, Clone, Deserialize)]
pub struct ZonalConfig {
    /// Controller address on the LAN
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Object id for the unit entity; the entity becomes `zonal.<id>`
    #[serde(default = "default_unit_object_id")]
    pub unit_object_id: String,

    pub zones: Vec<ZonalZoneConfig>,
}

/// One zone on the controller
#[derive(Debug, Clone, Deserialize)]
pub struct ZonalZoneConfig {
    /// Zone number on the controller (1-based)
    pub number: u8,

    /// Local object id; the entity becomes `zonal.<object_id>`
    pub object_id: String,

    /// Setpoint range override; the controller default is 16–30 °C
    #[serde(default)]
    pub min_temp: Option<f64>,
    #[serde(default)]
    pub max_temp: Option<f64>,
}

impl ZonalConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
