//! Turnover decision engine
//!
//! Once per webhook call: read the bookings, classify today, look up the
//! outdoor temperature, pick at most one thermostat command, send it, and
//! append exactly one audit row.
//!
//! Decision table, first match wins:
//!
//! | day            | outdoor temp  | command   |
//! |----------------|---------------|-----------|
//! | check-in       | >= 75°F       | cool 73°F |
//! | check-in       | <= 65°F       | heat 70°F |
//! | check-in       | in between    | none      |
//! | check-out only | >= 75°F       | cool 77°F |
//! | check-out only | <= 65°F       | heat 65°F |
//! | check-out only | in between    | off       |
//! | otherwise      |               | none      |
//!
//! A same-day turnover counts as a check-in day; its check-out is ignored.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{
        audit::{AuditLogEntry, EventType},
        booking::{accepted_records, BookingRecord},
        thermostat::ThermostatCommand,
        turnover::{
            DayClassification, TurnoverDetail, TurnoverResponse, TurnoverStatus,
            NO_TEMP_THRESHOLD_MET_FOR_CHECKIN,
        },
    },
};

use super::{
    audit_log::AuditLog, bookings::BookingStore, clock::Clock,
    thermostat::ThermostatController, weather::WeatherSource,
};

pub const COOL_THRESHOLD_F: f64 = 75.0;
pub const HEAT_THRESHOLD_F: f64 = 65.0;

pub const CHECKIN_COOL_SET_POINT_F: f64 = 73.0;
pub const CHECKIN_HEAT_SET_POINT_F: f64 = 70.0;
pub const CHECKOUT_COOL_SET_POINT_F: f64 = 77.0;
pub const CHECKOUT_HEAT_SET_POINT_F: f64 = 65.0;

const NO_ACTION_NOTE: &str = "no_action";

/// Classify `today` against the accepted bookings. Records with any other
/// status are ignored.
pub fn classify_day(today: NaiveDate, records: &[BookingRecord]) -> DayClassification {
    let accepted = || records.iter().filter(|r| r.is_accepted());
    let checkin_today = accepted().any(|r| r.check_in == today);
    let checkout_today = accepted().any(|r| r.check_out == today);
    DayClassification::from_flags(checkin_today, checkout_today)
}

/// What the engine decided to do today
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Adjust {
        event: EventType,
        command: ThermostatCommand,
    },
    /// Check-in day with a mild outdoor temperature
    CheckInComfortable,
    NoAction,
}

impl Decision {
    pub fn event_type(&self) -> EventType {
        match self {
            Decision::Adjust { event, .. } => *event,
            Decision::CheckInComfortable => EventType::CheckIn,
            Decision::NoAction => EventType::NoEvent,
        }
    }

    pub fn status(&self) -> TurnoverStatus {
        match self.event_type() {
            EventType::CheckIn => TurnoverStatus::CheckinAdjusted,
            EventType::CheckOut => TurnoverStatus::CheckoutAdjusted,
            EventType::NoEvent => TurnoverStatus::NoAction,
        }
    }

    pub fn command(&self) -> Option<&ThermostatCommand> {
        match self {
            Decision::Adjust { command, .. } => Some(command),
            _ => None,
        }
    }
}

pub fn decide(day: DayClassification, outdoor_temp_f: f64) -> Decision {
    if day.checkin_today() {
        let command = if outdoor_temp_f >= COOL_THRESHOLD_F {
            ThermostatCommand::cool(CHECKIN_COOL_SET_POINT_F)
        } else if outdoor_temp_f <= HEAT_THRESHOLD_F {
            ThermostatCommand::heat(CHECKIN_HEAT_SET_POINT_F)
        } else {
            return Decision::CheckInComfortable;
        };
        return Decision::Adjust {
            event: EventType::CheckIn,
            command,
        };
    }

    if day.checkout_today() && !day.is_same_day_turnover() {
        let command = if outdoor_temp_f >= COOL_THRESHOLD_F {
            ThermostatCommand::cool(CHECKOUT_COOL_SET_POINT_F)
        } else if outdoor_temp_f <= HEAT_THRESHOLD_F {
            ThermostatCommand::heat(CHECKOUT_HEAT_SET_POINT_F)
        } else {
            ThermostatCommand::off()
        };
        return Decision::Adjust {
            event: EventType::CheckOut,
            command,
        };
    }

    Decision::NoAction
}

/// Runs one webhook invocation against the injected collaborators
#[derive(Clone)]
pub struct TurnoverService {
    bookings: Arc<dyn BookingStore>,
    weather: Arc<dyn WeatherSource>,
    thermostat: ThermostatController,
    audit: Arc<dyn AuditLog>,
    clock: Arc<dyn Clock>,
}

impl TurnoverService {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        weather: Arc<dyn WeatherSource>,
        thermostat: ThermostatController,
        audit: Arc<dyn AuditLog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            weather,
            thermostat,
            audit,
            clock,
        }
    }

    pub async fn run(&self) -> AppResult<TurnoverResponse> {
        let now = self.clock.now();
        let today = now.date();

        let rows = self.bookings.fetch_rows().await?;
        let records =
            accepted_records(&rows).map_err(|e| AppError::parse("booking store", e))?;
        let day = classify_day(today, &records);

        let outdoor_temp_f = self.weather.current_temp_f().await?;
        let decision = decide(day, outdoor_temp_f);

        tracing::info!(
            %today,
            accepted = records.len(),
            day = ?day,
            outdoor_temp_f,
            decision = ?decision,
            "Turnover decision"
        );

        let (detail, notes) = match &decision {
            Decision::Adjust { command, .. } => {
                let result = self.thermostat.dispatch(command).await;
                let notes = result.summary();
                (Some(TurnoverDetail::Actuator(result)), notes)
            }
            Decision::CheckInComfortable => (
                Some(TurnoverDetail::Skipped {
                    status: NO_TEMP_THRESHOLD_MET_FOR_CHECKIN.to_string(),
                }),
                NO_TEMP_THRESHOLD_MET_FOR_CHECKIN.to_string(),
            ),
            Decision::NoAction => (None, NO_ACTION_NOTE.to_string()),
        };

        let entry = AuditLogEntry::new(
            now,
            decision.event_type(),
            outdoor_temp_f,
            decision.command(),
            notes,
        );
        self.audit.append(&entry).await?;

        Ok(TurnoverResponse {
            status: decision.status(),
            detail,
        })
    }
}
