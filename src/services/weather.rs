//! Outdoor temperature lookup (OpenWeatherMap current weather)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::WeatherConfig,
    error::{AppError, AppResult},
};

const SERVICE: &str = "weather";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current outdoor temperature in °F
    async fn current_temp_f(&self) -> AppResult<f64>;
}

#[derive(Deserialize)]
struct CurrentWeather {
    main: MainReadings,
}

#[derive(Deserialize)]
struct MainReadings {
    temp: f64,
}

pub struct OpenWeatherMapClient {
    client: Client,
    config: WeatherConfig,
}

impl OpenWeatherMapClient {
    pub fn new(client: Client, config: WeatherConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherMapClient {
    async fn current_temp_f(&self) -> AppResult<f64> {
        let url = format!("{}/data/2.5/weather", self.config.base_url.trim_end_matches('/'));
        let zip = format!("{},{}", self.config.postal_code, self.config.country);

        let weather: CurrentWeather = self
            .client
            .get(url)
            .query(&[
                ("zip", zip.as_str()),
                ("units", "imperial"),
                ("appid", self.config.api_key.as_str()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            // the request url carries the api key
            .map_err(|e| AppError::upstream(SERVICE, e.without_url()))?
            .json()
            .await
            .map_err(|e| AppError::parse(SERVICE, e.without_url()))?;

        tracing::debug!("Outdoor temperature at {}: {}°F", zip, weather.main.temp);
        Ok(weather.main.temp)
    }
}
