//! Day classification and webhook outcome types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::thermostat::ActuatorResult;

/// Detail status reported on a check-in day when the outdoor temperature sits
/// inside the comfort band
pub const NO_TEMP_THRESHOLD_MET_FOR_CHECKIN: &str = "no_temp_threshold_met_for_checkin";

/// What kind of day today is for the property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayClassification {
    CheckInOnly,
    CheckOutOnly,
    /// One guest leaves and another arrives today
    SameDayTurnover,
    NoEvent,
}

impl DayClassification {
    pub fn from_flags(checkin_today: bool, checkout_today: bool) -> Self {
        match (checkin_today, checkout_today) {
            (true, true) => DayClassification::SameDayTurnover,
            (true, false) => DayClassification::CheckInOnly,
            (false, true) => DayClassification::CheckOutOnly,
            (false, false) => DayClassification::NoEvent,
        }
    }

    pub fn checkin_today(&self) -> bool {
        matches!(
            self,
            DayClassification::CheckInOnly | DayClassification::SameDayTurnover
        )
    }

    pub fn checkout_today(&self) -> bool {
        matches!(
            self,
            DayClassification::CheckOutOnly | DayClassification::SameDayTurnover
        )
    }

    pub fn is_same_day_turnover(&self) -> bool {
        *self == DayClassification::SameDayTurnover
    }
}

/// Overall webhook status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TurnoverStatus {
    CheckinAdjusted,
    CheckoutAdjusted,
    NoAction,
}

impl TurnoverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnoverStatus::CheckinAdjusted => "checkin_adjusted",
            TurnoverStatus::CheckoutAdjusted => "checkout_adjusted",
            TurnoverStatus::NoAction => "no_action",
        }
    }
}

/// Detail payload: the actuator's result, or why no command was sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnoverDetail {
    Actuator(ActuatorResult),
    Skipped { status: String },
}

/// Webhook response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TurnoverResponse {
    pub status: TurnoverStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub detail: Option<TurnoverDetail>,
}
