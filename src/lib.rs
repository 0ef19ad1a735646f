//! Turnover Thermostat
//!
//! A webhook service for a short-term rental: when the scheduler calls it,
//! it reads the booking sheet, works out whether guests arrive or leave
//! today, checks the outdoor temperature and sets the thermostat
//! accordingly, recording every call in an audit sheet.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        .route("/health", get(api::health::health_check))
        .route("/adjust-temp", post(api::turnover::adjust_temp))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(api::openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
