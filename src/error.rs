//! Error types for the turnover thermostat service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    UpstreamFailure = 3,
    BadUpstreamData = 4,
    BadConfiguration = 5,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("{service} request failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    #[error("Could not parse {service} data: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn upstream(service: &'static str, err: impl std::fmt::Display) -> Self {
        AppError::Upstream {
            service,
            message: err.to_string(),
        }
    }

    pub fn parse(service: &'static str, err: impl std::fmt::Display) -> Self {
        AppError::Parse {
            service,
            message: err.to_string(),
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Upstream { .. } => {
                tracing::error!("Upstream error: {}", self);
                (StatusCode::BAD_GATEWAY, ErrorCode::UpstreamFailure, self.to_string())
            }
            AppError::Parse { .. } => {
                tracing::error!("Upstream data error: {}", self);
                (StatusCode::BAD_GATEWAY, ErrorCode::BadUpstreamData, self.to_string())
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::BadConfiguration,
                    "Server misconfigured".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
