//! The consumer-facing weather service.
//!
//! [`WeatherService::fetch_weather_data`] is the aggregator: it pulls the
//! three upstream feeds, normalizes each, derives the hourly and daily slices
//! and assembles one [`WeatherSnapshot`], which is then written to the cache.

use std::sync::Arc;

use serde_json::Value;

use crate::{
    cache::WeatherCache,
    clock::Clock,
    error::WeatherError,
    estimate::{FreeTierEstimates, SupplementalSource},
    geocode,
    mapping::{format_day, format_time, format_updated, map_air_quality, map_icon},
    model::{
        CitySearchResult, Coordinate, CurrentConditions, DailySlice, DEFAULT_PROXIMITY_M,
        HourlySlice, LocationInfo, WeatherSnapshot,
    },
    normalize::{
        AirQualityReading, CurrentReading, ForecastFeed, normalize_air_quality, normalize_current,
        normalize_forecast,
    },
    provider::WeatherProvider,
};

/// Progress callback: fraction in `[0, 1]` and a status line.
pub type ProgressFn<'a> = dyn Fn(f64, &str) + Send + Sync + 'a;

pub const HOURLY_SLICES: usize = 8;
pub const DAILY_SLICES: usize = 5;
/// Forecast entries are three hours apart, so eight of them span a day.
pub const ENTRIES_PER_DAY: usize = 8;

#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    cache: WeatherCache,
    clock: Arc<dyn Clock>,
    supplemental: Arc<dyn SupplementalSource>,
}

impl WeatherService {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        cache: WeatherCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            cache,
            clock,
            supplemental: Arc::new(FreeTierEstimates),
        }
    }

    /// Replace the precipitation/UV source.
    pub fn with_supplemental(mut self, source: Arc<dyn SupplementalSource>) -> Self {
        self.supplemental = source;
        self
    }

    pub async fn fetch_weather_data(
        &self,
        coordinate: Coordinate,
        on_progress: Option<&ProgressFn<'_>>,
    ) -> Result<WeatherSnapshot, WeatherError> {
        coordinate.validate()?;

        let report = |fraction: f64, message: &str| {
            if let Some(cb) = on_progress {
                cb(fraction, message);
            }
        };

        report(0.1, "Initializing weather request...");

        report(0.3, "Fetching current conditions...");
        let current_raw = self.provider.current_conditions(coordinate).await?;
        if !current_raw.is_object() {
            return Err(WeatherError::InvalidResponse(
                "Invalid weather response format".to_string(),
            ));
        }

        report(0.5, "Loading hourly forecast...");
        let forecast_raw = self.provider.forecast(coordinate).await?;

        report(0.7, "Getting air quality data...");
        let air_raw = self.provider.air_quality(coordinate).await?;

        report(0.9, "Processing weather data...");
        let snapshot = self.assemble(coordinate, &current_raw, &forecast_raw, &air_raw);

        report(1.0, "Weather data loaded successfully!");
        tracing::info!(
            city = %snapshot.location.city,
            hourly = snapshot.hourly.len(),
            daily = snapshot.daily.len(),
            "Weather data fetched"
        );

        self.cache.write(&snapshot);
        Ok(snapshot)
    }

    fn assemble(
        &self,
        coordinate: Coordinate,
        current_raw: &Value,
        forecast_raw: &Value,
        air_raw: &Value,
    ) -> WeatherSnapshot {
        let now = self.clock.now();
        let current = normalize_current(current_raw, now);
        let forecast = normalize_forecast(forecast_raw, now);
        let air = normalize_air_quality(air_raw);

        WeatherSnapshot {
            current: self.current_conditions(&current, air),
            hourly: hourly_slices(&forecast),
            daily: daily_slices(&forecast),
            location: LocationInfo {
                coordinate,
                city: current.city.clone(),
                country: current.country.clone(),
            },
            last_updated: format_updated(now, current.timezone_offset),
        }
    }

    fn current_conditions(
        &self,
        current: &CurrentReading,
        air: AirQualityReading,
    ) -> CurrentConditions {
        let air_info = map_air_quality(air.aqi);
        let offset = current.timezone_offset;

        CurrentConditions {
            temp: current.temp.round() as i64,
            feels_like: current.feels_like.round() as i64,
            humidity: current.humidity.round() as i64,
            wind_speed: current.wind_speed.round() as i64,
            visibility: (current.visibility / 1000.0).round() as i64,
            description: current.description.clone(),
            icon: map_icon(&current.icon_code).to_string(),
            precipitation: self.supplemental.precipitation(current),
            uv_index: self.supplemental.uv_index(current),
            sunrise: format_time(current.sunrise, offset),
            sunset: format_time(current.sunset, offset),
            aqi: air.aqi,
            aqi_status: air_info.status.to_string(),
            aqi_color: air_info.color.to_string(),
        }
    }

    pub fn get_cached_weather_data(&self) -> Option<WeatherSnapshot> {
        self.cache.read()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Fresh cached snapshot for (roughly) this coordinate, otherwise a live fetch.
    pub async fn load_weather(
        &self,
        coordinate: Coordinate,
        on_progress: Option<&ProgressFn<'_>>,
    ) -> Result<WeatherSnapshot, WeatherError> {
        coordinate.validate()?;

        if let Some(cached) = self.cache.read() {
            if cached.location.coordinate.is_near(&coordinate, DEFAULT_PROXIMITY_M) {
                tracing::debug!("Serving weather from cache");
                if let Some(cb) = on_progress {
                    cb(1.0, "Loaded cached weather data");
                }
                return Ok(cached);
            }
        }

        self.fetch_weather_data(coordinate, on_progress).await
    }

    pub async fn search_cities(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CitySearchResult>, WeatherError> {
        geocode::search_cities(self.provider.as_ref(), query, limit).await
    }

    pub async fn reverse_geocode(&self, coordinate: Coordinate) -> LocationInfo {
        geocode::reverse_geocode(self.provider.as_ref(), coordinate).await
    }
}

pub fn hourly_slices(forecast: &ForecastFeed) -> Vec<HourlySlice> {
    forecast
        .entries
        .iter()
        .take(HOURLY_SLICES)
        .map(|entry| HourlySlice {
            hour: format_time(entry.dt, forecast.timezone_offset),
            temp: entry.temp.round() as i64,
            icon: map_icon(&entry.icon_code).to_string(),
        })
        .collect()
}

/// One reading per day: every eighth entry from the first.
pub fn daily_slices(forecast: &ForecastFeed) -> Vec<DailySlice> {
    forecast
        .entries
        .iter()
        .step_by(ENTRIES_PER_DAY)
        .take(DAILY_SLICES)
        .map(|entry| DailySlice {
            day: format_day(entry.dt, forecast.timezone_offset),
            temp: entry.temp.round() as i64,
            icon: map_icon(&entry.icon_code).to_string(),
        })
        .collect()
}
