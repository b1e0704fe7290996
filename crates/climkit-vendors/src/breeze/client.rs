//! breeze cloud API client

use async_trait::async_trait;
use climkit_core::{DeviceId, DeviceSnapshot, StateSource, VendorClient, VendorError};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::http::{check_status, map_transport};

use super::config::BreezeConfig;

/// Snapshot attribute names for one pod, keyed by its object id
fn attr(object_id: &str, name: &str) -> String {
    format!("{object_id}/{name}")
}

struct PodBinding {
    device: DeviceId,
    pod_id: String,
    object_id: String,
}

/// Client for one breeze account
///
/// `fetch_state` reads every configured pod in a single API call and builds
/// one snapshot with per-pod attribute prefixes. Commands address a single
/// pod.
pub struct BreezeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    pods: Vec<PodBinding>,
}

/// Wire shape of `GET /v2/devices`
#[derive(Debug, Deserialize)]
struct DevicesResponse {
    devices: Vec<DeviceEntry>,
}

#[derive(Debug, Deserialize)]
struct DeviceEntry {
    id: String,
    state: PodState,
}

#[derive(Debug, Deserialize)]
struct PodState {
    on: bool,
    mode: String,
    #[serde(default)]
    fan: Option<String>,
    #[serde(default)]
    preset: Option<String>,
    #[serde(default)]
    swing: Option<String>,
    #[serde(default)]
    target: Option<f64>,
    #[serde(default)]
    room_temp: Option<f64>,
    #[serde(default)]
    humidity: Option<f64>,
}

impl BreezeClient {
    pub(super) fn new(
        http: reqwest::Client,
        config: &BreezeConfig,
        pods: Vec<(DeviceId, String, String)>,
    ) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            pods: pods
                .into_iter()
                .map(|(device, pod_id, object_id)| PodBinding {
                    device,
                    pod_id,
                    object_id,
                })
                .collect(),
        }
    }

    fn pod_id(&self, device: &DeviceId) -> Result<&str, VendorError> {
        self.pods
            .iter()
            .find(|pod| pod.device == *device)
            .map(|pod| pod.pod_id.as_str())
            .ok_or_else(|| VendorError::Rejected {
                reason: format!("unknown device {device}"),
            })
    }

    async fn post_state(
        &self,
        device: &DeviceId,
        body: serde_json::Value,
    ) -> Result<(), VendorError> {
        let pod_id = self.pod_id(device)?;
        debug!(%device, pod_id, %body, "sending pod command");
        let response = self
            .http
            .post(format!("{}/v2/devices/{}/state", self.base_url, pod_id))
            .query(&[("api_key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(map_transport)?;
        check_status(response).await?;
        Ok(())
    }

    /// Build the snapshot from one API response; pure, so it is testable
    /// without a server
    fn snapshot_from(&self, payload: DevicesResponse) -> Result<DeviceSnapshot, VendorError> {
        let mut attributes = IndexMap::new();
        for pod in &self.pods {
            let entry = payload
                .devices
                .iter()
                .find(|device| device.id == pod.pod_id)
                .ok_or_else(|| {
                    VendorError::Payload(format!("pod {} missing from response", pod.pod_id))
                })?;

            let state = &entry.state;
            attributes.insert(
                attr(&pod.object_id, "power"),
                json!(if state.on { "on" } else { "off" }),
            );
            attributes.insert(attr(&pod.object_id, "mode"), json!(state.mode));
            if let Some(fan) = &state.fan {
                attributes.insert(attr(&pod.object_id, "fan"), json!(fan));
            }
            if let Some(preset) = &state.preset {
                attributes.insert(attr(&pod.object_id, "preset"), json!(preset));
            }
            if let Some(swing) = &state.swing {
                attributes.insert(attr(&pod.object_id, "swing"), json!(swing));
            }
            if let Some(target) = state.target {
                attributes.insert(attr(&pod.object_id, "target"), json!(target));
            }
            if let Some(room_temp) = state.room_temp {
                attributes.insert(attr(&pod.object_id, "room_temp"), json!(room_temp));
            }
            if let Some(humidity) = state.humidity {
                attributes.insert(attr(&pod.object_id, "humidity"), json!(humidity));
            }
        }
        Ok(DeviceSnapshot::new(attributes))
    }
}

#[async_trait]
impl StateSource for BreezeClient {
    async fn fetch_state(&self) -> Result<DeviceSnapshot, VendorError> {
        let response = self
            .http
            .get(format!("{}/v2/devices", self.base_url))
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(map_transport)?;
        let response = check_status(response).await?;
        let payload: DevicesResponse = response.json().await.map_err(map_transport)?;
        self.snapshot_from(payload)
    }
}

#[async_trait]
impl VendorClient for BreezeClient {
    type Value = String;

    async fn set_power(&self, device: &DeviceId, on: bool) -> Result<(), VendorError> {
        self.post_state(device, json!({ "on": on })).await
    }

    async fn set_target_temperature(
        &self,
        device: &DeviceId,
        value: f64,
    ) -> Result<(), VendorError> {
        self.post_state(device, json!({ "target": value })).await
    }

    async fn set_hvac_mode(&self, device: &DeviceId, value: String) -> Result<(), VendorError> {
        self.post_state(device, json!({ "mode": value })).await
    }

    async fn set_fan_mode(&self, device: &DeviceId, value: String) -> Result<(), VendorError> {
        self.post_state(device, json!({ "fan": value })).await
    }

    async fn set_preset_mode(&self, device: &DeviceId, value: String) -> Result<(), VendorError> {
        self.post_state(device, json!({ "preset": value })).await
    }

    async fn set_swing_mode(&self, device: &DeviceId, value: String) -> Result<(), VendorError> {
        self.post_state(device, json!({ "swing": value })).await
    }
}
