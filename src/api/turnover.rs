//! Turnover webhook endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, models::turnover::TurnoverResponse, AppState};

use super::WebhookCaller;

/// Adjust the thermostat for today's check-ins and check-outs
#[utoipa::path(
    post,
    path = "/adjust-temp",
    tag = "turnover",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Decision taken and logged", body = TurnoverResponse),
        (status = 401, description = "Missing or invalid webhook token", body = crate::error::ErrorResponse),
        (status = 502, description = "Booking, weather or audit log service failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn adjust_temp(
    State(state): State<AppState>,
    _caller: WebhookCaller,
) -> AppResult<Json<TurnoverResponse>> {
    let response = state.services.turnover.run().await?;
    tracing::info!("Webhook finished with status {}", response.status.as_str());
    Ok(Json(response))
}
