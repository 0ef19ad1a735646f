//! Business logic services and the adapters they drive

pub mod audit_log;
pub mod bookings;
pub mod clock;
pub mod google;
pub mod thermostat;
pub mod turnover;
pub mod weather;

use std::{sync::Arc, time::Duration};

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
};

use self::{
    audit_log::SheetsAuditLog,
    bookings::SheetsBookingStore,
    clock::SystemClock,
    google::{
        GoogleSheetsClient, ServiceAccountKey, ServiceAccountTokenSource, StaticToken, TokenSource,
    },
    thermostat::{SeamClient, ThermostatController},
    turnover::TurnoverService,
    weather::OpenWeatherMapClient,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub turnover: TurnoverService,
}

impl Services {
    pub fn new(turnover: TurnoverService) -> Self {
        Self { turnover }
    }

    /// Wire the production adapters described by `config`
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let client = http_client(config.http.timeout_secs)?;

        let tokens: Arc<dyn TokenSource> = match &config.google.access_token {
            Some(token) => Arc::new(StaticToken(token.clone())),
            None => {
                let key = ServiceAccountKey::from_file(&config.google.credentials_path)?;
                Arc::new(ServiceAccountTokenSource::new(
                    client.clone(),
                    key,
                    config.google.token_uri.clone(),
                )?)
            }
        };
        let sheets =
            GoogleSheetsClient::new(client.clone(), config.google.sheets_base_url.clone(), tokens);

        let thermostat = ThermostatController::new(
            Arc::new(SeamClient::new(client.clone(), config.thermostat.clone())),
            config.thermostat.device_nickname.clone(),
        );

        let turnover = TurnoverService::new(
            Arc::new(SheetsBookingStore::new(sheets.clone(), config.bookings.clone())),
            Arc::new(OpenWeatherMapClient::new(client, config.weather.clone())),
            thermostat,
            Arc::new(SheetsAuditLog::new(sheets, config.audit_log.clone())),
            Arc::new(SystemClock),
        );

        Ok(Self::new(turnover))
    }
}

/// Shared outbound HTTP client
pub fn http_client(timeout_secs: u64) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))
}
