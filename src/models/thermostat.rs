//! Thermostat commands, device descriptors and normalized actuator results

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// HVAC operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HvacMode {
    Cool,
    Heat,
    Off,
}

impl HvacMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::Cool => "cool",
            HvacMode::Heat => "heat",
            HvacMode::Off => "off",
        }
    }
}

impl std::fmt::Display for HvacMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single set-point instruction for the thermostat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ThermostatCommand {
    pub mode: HvacMode,
    /// Target temperature; absent for `off`
    pub set_point_f: Option<f64>,
}

impl ThermostatCommand {
    pub fn cool(set_point_f: f64) -> Self {
        Self {
            mode: HvacMode::Cool,
            set_point_f: Some(set_point_f),
        }
    }

    pub fn heat(set_point_f: f64) -> Self {
        Self {
            mode: HvacMode::Heat,
            set_point_f: Some(set_point_f),
        }
    }

    pub fn off() -> Self {
        Self {
            mode: HvacMode::Off,
            set_point_f: None,
        }
    }
}

/// HVAC operations a device advertises
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeviceCapabilities {
    pub can_cool: bool,
    pub can_heat: bool,
    pub can_off: bool,
}

impl DeviceCapabilities {
    pub fn supports(&self, mode: HvacMode) -> bool {
        match mode {
            HvacMode::Cool => self.can_cool,
            HvacMode::Heat => self.can_heat,
            HvacMode::Off => self.can_off,
        }
    }
}

/// A device known to the actuator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Device {
    pub device_id: String,
    pub nickname: Option<String>,
    pub capabilities: DeviceCapabilities,
}

/// Accepted thermostat action, as reported by the actuator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActionAttempt {
    pub action_attempt_id: String,
    pub action_type: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DispatchErrorCode {
    DeviceNotFound,
    UnsupportedCapability,
    ActuatorUnavailable,
}

/// Why a command never reached (or was refused by) the thermostat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DispatchFailure {
    pub code: DispatchErrorCode,
    pub error: String,
}

/// Outcome of one thermostat dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActuatorResult {
    Success(ActionAttempt),
    Error(DispatchFailure),
}

impl ActuatorResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ActuatorResult::Success(_))
    }

    /// Short summary for the audit log notes column
    pub fn summary(&self) -> String {
        match self {
            ActuatorResult::Success(attempt) => {
                format!("ok: {} {}", attempt.action_type, attempt.status)
            }
            ActuatorResult::Error(failure) => format!("error: {}", failure.error),
        }
    }
}
