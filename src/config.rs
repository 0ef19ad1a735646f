//! Configuration management for the turnover thermostat service

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// Shared secret the scheduler sends as `Authorization: Bearer <token>`
    pub webhook_token: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

/// A range inside a Google spreadsheet
#[derive(Debug, Deserialize, Clone)]
pub struct SheetConfig {
    pub spreadsheet_id: String,
    /// A1 notation, e.g. `Bookings!A:Z`
    pub range: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GoogleConfig {
    /// Path to the service-account JSON key
    pub credentials_path: String,
    /// Overrides the token endpoint from the key file when set
    pub token_uri: Option<String>,
    /// Pre-issued access token; skips the service-account exchange when set
    pub access_token: Option<String>,
    pub sheets_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: String,
    pub base_url: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ThermostatConfig {
    pub api_key: String,
    pub base_url: String,
    /// Exact nickname of the controlled thermostat
    pub device_nickname: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "SheetConfig::default_bookings")]
    pub bookings: SheetConfig,
    #[serde(default = "SheetConfig::default_audit_log")]
    pub audit_log: SheetConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub thermostat: ThermostatConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::builder(Self::environment())
            .set_override_option("auth.webhook_token", env::var("WEBHOOK_TOKEN").ok())?
            .set_override_option("thermostat.api_key", env::var("SEAM_API_KEY").ok())?
            .set_override_option("weather.api_key", env::var("WEATHER_API_KEY").ok())?
            .set_override_option(
                "google.credentials_path",
                env::var("GOOGLE_APPLICATION_CREDENTIALS").ok(),
            )?
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// `TURNOVER_WEATHER__POSTAL_CODE` -> `weather.postal_code`.
    ///
    /// Values stay strings: postal codes and tokens such as `02134` must keep
    /// their leading zeros, and numeric fields still deserialize from text.
    fn environment() -> Environment {
        Environment::with_prefix("TURNOVER")
            .prefix_separator("_")
            .separator("__")
    }

    fn builder(environment: Environment) -> ConfigBuilder<DefaultState> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(environment)
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.webhook_token.trim().is_empty() {
            return Err(ConfigError::Message(
                "auth.webhook_token must be set (WEBHOOK_TOKEN)".to_string(),
            ));
        }
        if self.thermostat.device_nickname.is_empty() {
            return Err(ConfigError::Message(
                "thermostat.device_nickname must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
            bookings: SheetConfig::default_bookings(),
            audit_log: SheetConfig::default_audit_log(),
            google: GoogleConfig::default(),
            weather: WeatherConfig::default(),
            thermostat: ThermostatConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl SheetConfig {
    fn default_bookings() -> Self {
        Self {
            spreadsheet_id: String::new(),
            range: "Sheet1".to_string(),
        }
    }

    fn default_audit_log() -> Self {
        Self {
            spreadsheet_id: String::new(),
            range: "Log!A:F".to_string(),
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            credentials_path: "credentials.json".to_string(),
            token_uri: None,
            access_token: None,
            sheets_base_url: "https://sheets.googleapis.com".to_string(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openweathermap.org".to_string(),
            postal_code: "28348".to_string(),
            country: "us".to_string(),
        }
    }
}

impl Default for ThermostatConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://connect.getseam.com".to_string(),
            device_nickname: "SensiHanover".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 15 }
    }
}
