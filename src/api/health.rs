//! Liveness endpoint for the scheduler and load balancer

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Nickname of the thermostat this instance controls
    pub thermostat: String,
}

/// Report that the service is up and which thermostat it drives.
///
/// Never touches the booking sheet, weather or Seam, and needs no token.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        thermostat: state.config.thermostat.device_nickname.clone(),
    })
}
