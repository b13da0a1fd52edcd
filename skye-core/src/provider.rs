use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::{
    Config, error::WeatherError, model::Coordinate, provider::openweather::OpenWeatherClient,
};

pub mod openweather;

/// Raw access to the upstream weather and geocoding endpoints.
///
/// Implementations return the decoded JSON body as-is; shaping it is the job
/// of [`crate::normalize`] and [`crate::geocode`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_conditions(&self, coordinate: Coordinate) -> Result<Value, WeatherError>;

    /// 5-day forecast in 3-hour steps.
    async fn forecast(&self, coordinate: Coordinate) -> Result<Value, WeatherError>;

    async fn air_quality(&self, coordinate: Coordinate) -> Result<Value, WeatherError>;

    async fn geocode_direct(&self, query: &str, limit: usize) -> Result<Value, WeatherError>;

    async fn geocode_reverse(&self, coordinate: Coordinate, limit: usize)
    -> Result<Value, WeatherError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;

    let client = OpenWeatherClient::builder(api_key)
        .data_url(&config.endpoints.data_url)
        .geo_url(&config.endpoints.geo_url)
        .timeout_secs(config.request_timeout_secs())
        .build()?;

    Ok(Box::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("skye configure"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(provider_from_config(&cfg).is_ok());
    }
}
