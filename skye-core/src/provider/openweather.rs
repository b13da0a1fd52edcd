use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::{error::WeatherError, model::Coordinate};

use super::WeatherProvider;

pub const DEFAULT_DATA_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_GEO_URL: &str = "https://api.openweathermap.org/geo/1.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    data_url: String,
    geo_url: String,
    http: Client,
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClientBuilder {
    api_key: String,
    data_url: String,
    geo_url: String,
    timeout: Duration,
}

impl OpenWeatherClientBuilder {
    pub fn data_url(mut self, url: &str) -> Self {
        self.data_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn geo_url(mut self, url: &str) -> Self {
        self.geo_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn build(self) -> Result<OpenWeatherClient, WeatherError> {
        let http = Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("skye/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(OpenWeatherClient {
            api_key: self.api_key,
            data_url: self.data_url,
            geo_url: self.geo_url,
            http,
        })
    }
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Result<Self, WeatherError> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: impl Into<String>) -> OpenWeatherClientBuilder {
        OpenWeatherClientBuilder {
            api_key: api_key.into(),
            data_url: DEFAULT_DATA_URL.to_string(),
            geo_url: DEFAULT_GEO_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    async fn fetch_data(
        &self,
        endpoint: &str,
        coordinate: Coordinate,
    ) -> Result<Value, WeatherError> {
        let url = format!("{}/{endpoint}", self.data_url);
        let params = [
            ("lat", coordinate.latitude.to_string()),
            ("lon", coordinate.longitude.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
        ];
        self.get_json(&url, endpoint, &params).await
    }

    async fn get_json(
        &self,
        url: &str,
        what: &str,
        params: &[(&str, String)],
    ) -> Result<Value, WeatherError> {
        tracing::debug!(endpoint = what, "OpenWeather request");

        let res = self.http.get(url).query(params).send().await.map_err(|e| {
            WeatherError::from(e)
                .with_context(&format!("Failed to send request to OpenWeather ({what})"))
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            WeatherError::from(e)
                .with_context(&format!("Failed to read OpenWeather {what} response body"))
        })?;

        if !status.is_success() {
            return Err(WeatherError::Network(format!(
                "OpenWeather {what} request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::InvalidResponse(format!("Failed to parse OpenWeather {what} JSON: {e}"))
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current_conditions(&self, coordinate: Coordinate) -> Result<Value, WeatherError> {
        self.fetch_data("weather", coordinate).await
    }

    async fn forecast(&self, coordinate: Coordinate) -> Result<Value, WeatherError> {
        self.fetch_data("forecast", coordinate).await
    }

    async fn air_quality(&self, coordinate: Coordinate) -> Result<Value, WeatherError> {
        self.fetch_data("air_pollution", coordinate).await
    }

    async fn geocode_direct(&self, query: &str, limit: usize) -> Result<Value, WeatherError> {
        let url = format!("{}/direct", self.geo_url);
        let params = [
            ("q", query.to_string()),
            ("limit", limit.to_string()),
            ("appid", self.api_key.clone()),
        ];
        self.get_json(&url, "direct geocoding", &params).await
    }

    async fn geocode_reverse(
        &self,
        coordinate: Coordinate,
        limit: usize,
    ) -> Result<Value, WeatherError> {
        let url = format!("{}/reverse", self.geo_url);
        let params = [
            ("lat", coordinate.latitude.to_string()),
            ("lon", coordinate.longitude.to_string()),
            ("limit", limit.to_string()),
            ("appid", self.api_key.clone()),
        ];
        self.get_json(&url, "reverse geocoding", &params).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
