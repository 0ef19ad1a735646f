//! Thermostat control through the Seam smart-home API
//!
//! [`ThermostatActuator`] is the raw device API. [`ThermostatController`]
//! sits on top of it and turns a [`ThermostatCommand`] into an
//! [`ActuatorResult`]: it finds the configured device by nickname, checks
//! that the device can do what is asked, and only then sends the command.
//! Device problems come back as `ActuatorResult::Error`, never as `Err`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::{
    config::ThermostatConfig,
    error::{AppError, AppResult},
    models::thermostat::{
        ActionAttempt, ActuatorResult, Device, DeviceCapabilities, DispatchErrorCode,
        DispatchFailure, HvacMode, ThermostatCommand,
    },
};

const SERVICE: &str = "thermostat";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThermostatActuator: Send + Sync {
    async fn list_devices(&self) -> AppResult<Vec<Device>>;
    async fn get_device(&self, device_id: &str) -> AppResult<Device>;
    async fn cool(&self, device_id: &str, set_point_f: f64) -> AppResult<ActionAttempt>;
    async fn heat(&self, device_id: &str, set_point_f: f64) -> AppResult<ActionAttempt>;
    async fn off(&self, device_id: &str) -> AppResult<ActionAttempt>;
}

/// Device descriptor as Seam returns it
#[derive(Debug, Deserialize)]
struct SeamDevice {
    device_id: String,
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    can_hvac_cool: bool,
    #[serde(default)]
    can_hvac_heat: bool,
    #[serde(default)]
    can_turn_off_hvac: bool,
}

impl From<SeamDevice> for Device {
    fn from(d: SeamDevice) -> Self {
        Device {
            device_id: d.device_id,
            nickname: d.nickname,
            capabilities: DeviceCapabilities {
                can_cool: d.can_hvac_cool,
                can_heat: d.can_hvac_heat,
                can_off: d.can_turn_off_hvac,
            },
        }
    }
}

#[derive(Deserialize)]
struct DeviceList {
    devices: Vec<SeamDevice>,
}

#[derive(Deserialize)]
struct DeviceEnvelope {
    device: SeamDevice,
}

#[derive(Deserialize)]
struct ActionEnvelope {
    action_attempt: ActionAttempt,
}

pub struct SeamClient {
    client: Client,
    config: ThermostatConfig,
}

impl SeamClient {
    pub fn new(client: Client, config: ThermostatConfig) -> Self {
        Self { client, config }
    }

    async fn call<T: DeserializeOwned>(&self, path: &str, body: Value) -> AppResult<T> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        tracing::debug!("Seam request {}", path);

        self.client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::upstream(SERVICE, e))?
            .json()
            .await
            .map_err(|e| AppError::parse(SERVICE, e))
    }

    async fn action(&self, path: &str, body: Value) -> AppResult<ActionAttempt> {
        let envelope: ActionEnvelope = self.call(path, body).await?;
        Ok(envelope.action_attempt)
    }
}

#[async_trait]
impl ThermostatActuator for SeamClient {
    async fn list_devices(&self) -> AppResult<Vec<Device>> {
        let list: DeviceList = self.call("/devices/list", json!({})).await?;
        Ok(list.devices.into_iter().map(Device::from).collect())
    }

    async fn get_device(&self, device_id: &str) -> AppResult<Device> {
        let envelope: DeviceEnvelope = self
            .call("/devices/get", json!({ "device_id": device_id }))
            .await?;
        Ok(envelope.device.into())
    }

    async fn cool(&self, device_id: &str, set_point_f: f64) -> AppResult<ActionAttempt> {
        self.action(
            "/thermostats/cool",
            json!({
                "device_id": device_id,
                "cooling_set_point_fahrenheit": set_point_f,
            }),
        )
        .await
    }

    async fn heat(&self, device_id: &str, set_point_f: f64) -> AppResult<ActionAttempt> {
        self.action(
            "/thermostats/heat",
            json!({
                "device_id": device_id,
                "heating_set_point_fahrenheit": set_point_f,
            }),
        )
        .await
    }

    async fn off(&self, device_id: &str) -> AppResult<ActionAttempt> {
        self.action("/thermostats/off", json!({ "device_id": device_id }))
            .await
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Thermostat '{0}' not found")]
    DeviceNotFound(String),

    #[error("Unsupported mode '{0}' or missing capability")]
    UnsupportedCapability(HvacMode),

    #[error("Mode '{0}' requires a set point")]
    MissingSetPoint(HvacMode),

    #[error("Thermostat API unavailable: {0}")]
    Actuator(#[from] AppError),
}

impl From<DispatchError> for DispatchFailure {
    fn from(e: DispatchError) -> Self {
        let code = match e {
            DispatchError::DeviceNotFound(_) => DispatchErrorCode::DeviceNotFound,
            DispatchError::UnsupportedCapability(_) | DispatchError::MissingSetPoint(_) => {
                DispatchErrorCode::UnsupportedCapability
            }
            DispatchError::Actuator(_) => DispatchErrorCode::ActuatorUnavailable,
        };
        DispatchFailure {
            code,
            error: e.to_string(),
        }
    }
}

/// Sends commands to the one thermostat named in configuration
#[derive(Clone)]
pub struct ThermostatController {
    actuator: Arc<dyn ThermostatActuator>,
    nickname: String,
}

impl ThermostatController {
    pub fn new(actuator: Arc<dyn ThermostatActuator>, nickname: impl Into<String>) -> Self {
        Self {
            actuator,
            nickname: nickname.into(),
        }
    }

    pub async fn dispatch(&self, command: &ThermostatCommand) -> ActuatorResult {
        match self.try_dispatch(command).await {
            Ok(attempt) => {
                tracing::info!(
                    mode = %command.mode,
                    set_point_f = ?command.set_point_f,
                    action_attempt_id = %attempt.action_attempt_id,
                    "Thermostat command accepted"
                );
                ActuatorResult::Success(attempt)
            }
            Err(e) => {
                tracing::warn!(mode = %command.mode, "Thermostat command not sent: {}", e);
                ActuatorResult::Error(e.into())
            }
        }
    }

    async fn try_dispatch(&self, command: &ThermostatCommand) -> Result<ActionAttempt, DispatchError> {
        let devices = self.actuator.list_devices().await?;
        let found = devices
            .into_iter()
            .find(|d| d.nickname.as_deref() == Some(self.nickname.as_str()))
            .ok_or_else(|| DispatchError::DeviceNotFound(self.nickname.clone()))?;

        let device = self.actuator.get_device(&found.device_id).await?;
        if !device.capabilities.supports(command.mode) {
            return Err(DispatchError::UnsupportedCapability(command.mode));
        }

        let set_point = || {
            command
                .set_point_f
                .ok_or(DispatchError::MissingSetPoint(command.mode))
        };

        let attempt = match command.mode {
            HvacMode::Cool => self.actuator.cool(&device.device_id, set_point()?).await?,
            HvacMode::Heat => self.actuator.heat(&device.device_id, set_point()?).await?,
            HvacMode::Off => self.actuator.off(&device.device_id).await?,
        };
        Ok(attempt)
    }
}
