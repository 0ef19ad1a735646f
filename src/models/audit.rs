//! Audit log entries

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use super::thermostat::{HvacMode, ThermostatCommand};

/// Which branch of the decision table fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EventType {
    #[serde(rename = "checkin")]
    CheckIn,
    #[serde(rename = "checkout")]
    CheckOut,
    #[serde(rename = "none")]
    NoEvent,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::CheckIn => "checkin",
            EventType::CheckOut => "checkout",
            EventType::NoEvent => "none",
        }
    }
}

/// One row of the audit sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Local wall-clock time of the invocation
    pub timestamp: NaiveDateTime,
    pub event_type: EventType,
    pub outdoor_temp_f: f64,
    pub mode: Option<HvacMode>,
    pub set_point_f: Option<f64>,
    pub notes: String,
}

impl AuditLogEntry {
    pub fn new(
        timestamp: NaiveDateTime,
        event_type: EventType,
        outdoor_temp_f: f64,
        command: Option<&ThermostatCommand>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            event_type,
            outdoor_temp_f,
            mode: command.map(|c| c.mode),
            set_point_f: command.and_then(|c| c.set_point_f),
            notes: notes.into(),
        }
    }

    /// Cell values in sheet column order:
    /// timestamp, event type, outdoor temp, mode, set point, notes
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            json!(self.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()),
            json!(self.event_type.as_str()),
            json!(self.outdoor_temp_f),
            json!(self.mode.map(|m| m.as_str()).unwrap_or("")),
            self.set_point_f.map(|t| json!(t)).unwrap_or_else(|| json!("")),
            json!(self.notes),
        ]
    }
}
