//! HTTP handlers for the webhook and health endpoints

pub mod health;
pub mod openapi;
pub mod turnover;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{error::AppError, AppState};

/// Extractor proving the caller presented the configured webhook token.
///
/// Rejection happens before the handler body runs, so an unauthenticated
/// call never reaches the booking store, weather source or audit log.
pub struct WebhookCaller;

#[async_trait]
impl FromRequestParts<AppState> for WebhookCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AppError::Authentication("Missing or malformed authorization header".to_string())
                })?;

        if bearer.token() != state.config.auth.webhook_token {
            tracing::warn!("Rejected webhook call with an invalid token");
            return Err(AppError::Authentication("Invalid webhook token".to_string()));
        }

        Ok(WebhookCaller)
    }
}
