//! zonal controller client

use async_trait::async_trait;
use climkit_core::{DeviceId, DeviceSnapshot, StateSource, VendorClient, VendorError};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::http::{check_status, map_transport};

struct ZoneBinding {
    device: DeviceId,
    number: u8,
    object_id: String,
}

/// Client for one zonal controller
///
/// Mode and fan are unit-wide on this hardware: zone-level mode commands
/// are routed to the unit endpoint. Zone setpoints are per zone.
pub struct ZonalClient {
    http: reqwest::Client,
    base_url: String,
    unit_device: DeviceId,
    unit_object_id: String,
    zones: Vec<ZoneBinding>,
}

/// Wire shape of `GET /api/state`
#[derive(Debug, Deserialize)]
struct StateResponse {
    unit: UnitState,
    zones: Vec<ZoneState>,
}

#[derive(Debug, Deserialize)]
struct UnitState {
    power: u8,
    mode: u8,
    fan: u8,
    #[serde(default)]
    action: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct ZoneState {
    number: u8,
    power: u8,
    #[serde(default)]
    setpoint: Option<f64>,
    #[serde(default)]
    temperature: Option<f64>,
}

impl ZonalClient {
    pub(super) fn new(
        http: reqwest::Client,
        base_url: String,
        unit_device: DeviceId,
        unit_object_id: String,
        zones: Vec<(DeviceId, u8, String)>,
    ) -> Self {
        Self {
            http,
            base_url,
            unit_device,
            unit_object_id,
            zones: zones
                .into_iter()
                .map(|(device, number, object_id)| ZoneBinding {
                    device,
                    number,
                    object_id,
                })
                .collect(),
        }
    }

    fn zone(&self, device: &DeviceId) -> Result<&ZoneBinding, VendorError> {
        self.zones
            .iter()
            .find(|zone| zone.device == *device)
            .ok_or_else(|| VendorError::Rejected {
                reason: format!("unknown device {device}"),
            })
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<(), VendorError> {
        debug!(path, %body, "sending controller command");
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .map_err(map_transport)?;
        check_status(response).await?;
        Ok(())
    }

    /// Build the snapshot from one controller response; pure and testable
    ///
    /// A zone renders as powered only while its damper is open AND the unit
    /// itself is running: a closed damper and a powered-down unit are both
    /// "off" for the zone entity.
    fn snapshot_from(&self, payload: StateResponse) -> Result<DeviceSnapshot, VendorError> {
        let mut attributes = IndexMap::new();
        let unit = &payload.unit;

        attributes.insert(format!("{}/power", self.unit_object_id), json!(unit.power));
        attributes.insert(format!("{}/mode", self.unit_object_id), json!(unit.mode));
        attributes.insert(format!("{}/fan", self.unit_object_id), json!(unit.fan));
        if let Some(action) = unit.action {
            attributes.insert(format!("{}/action", self.unit_object_id), json!(action));
        }

        for zone in &self.zones {
            let state = payload
                .zones
                .iter()
                .find(|z| z.number == zone.number)
                .ok_or_else(|| {
                    VendorError::Payload(format!("zone {} missing from response", zone.number))
                })?;

            let effective_power = u8::from(unit.power == 1 && state.power == 1);
            attributes.insert(format!("{}/power", zone.object_id), json!(effective_power));
            if let Some(setpoint) = state.setpoint {
                attributes.insert(format!("{}/setpoint", zone.object_id), json!(setpoint));
            }
            if let Some(temperature) = state.temperature {
                attributes.insert(
                    format!("{}/temperature", zone.object_id),
                    json!(temperature),
                );
            }
        }
        Ok(DeviceSnapshot::new(attributes))
    }
}

#[async_trait]
impl StateSource for ZonalClient {
    async fn fetch_state(&self) -> Result<DeviceSnapshot, VendorError> {
        let response = self
            .http
            .get(format!("{}/api/state", self.base_url))
            .send()
            .await
            .map_err(map_transport)?;
        let response = check_status(response).await?;
        let payload: StateResponse = response.json().await.map_err(map_transport)?;
        self.snapshot_from(payload)
    }
}

#[async_trait]
impl VendorClient for ZonalClient {
    type Value = u8;

    async fn set_power(&self, device: &DeviceId, on: bool) -> Result<(), VendorError> {
        let power = u8::from(on);
        if *device == self.unit_device {
            self.post("/api/unit/power", json!({ "power": power })).await
        } else {
            let zone = self.zone(device)?;
            self.post(
                &format!("/api/zones/{}/power", zone.number),
                json!({ "power": power }),
            )
            .await
        }
    }

    async fn set_target_temperature(
        &self,
        device: &DeviceId,
        value: f64,
    ) -> Result<(), VendorError> {
        if *device == self.unit_device {
            return Err(VendorError::Rejected {
                reason: "the unit has no setpoint; set a zone".to_string(),
            });
        }
        let zone = self.zone(device)?;
        self.post(
            &format!("/api/zones/{}/setpoint", zone.number),
            json!({ "setpoint": value }),
        )
        .await
    }

    async fn set_hvac_mode(&self, _device: &DeviceId, value: u8) -> Result<(), VendorError> {
        // Mode is unit-wide regardless of which entity asked
        self.post("/api/unit/mode", json!({ "mode": value })).await
    }

    async fn set_fan_mode(&self, _device: &DeviceId, value: u8) -> Result<(), VendorError> {
        self.post("/api/unit/fan", json!({ "fan": value })).await
    }

    async fn set_preset_mode(&self, _device: &DeviceId, _value: u8) -> Result<(), VendorError> {
        Err(VendorError::Rejected {
            reason: "controller has no presets".to_string(),
        })
    }

    async fn set_swing_mode(&self, _device: &DeviceId, _value: u8) -> Result<(), VendorError> {
        Err(VendorError::Rejected {
            reason: "controller has no swing control".to_string(),
        })
    }
}
