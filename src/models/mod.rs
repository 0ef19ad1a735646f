//! Data models for the turnover thermostat service

pub mod audit;
pub mod booking;
pub mod thermostat;
pub mod turnover;

// Re-export commonly used types
pub use audit::{AuditLogEntry, EventType};
pub use booking::{BookingRecord, BookingRow};
pub use thermostat::{
    ActionAttempt, ActuatorResult, Device, DeviceCapabilities, DispatchErrorCode,
    DispatchFailure, HvacMode, ThermostatCommand,
};
pub use turnover::{DayClassification, TurnoverDetail, TurnoverResponse, TurnoverStatus};
