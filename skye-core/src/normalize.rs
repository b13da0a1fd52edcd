//! Total conversions from raw OpenWeather payloads to typed records.
//!
//! The upstream contract is not guaranteed, so every field is read
//! independently and replaced by a default when it is missing or has the
//! wrong type. None of these functions can fail.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    model::UNKNOWN_CITY,
    validation::{safe_array, safe_non_empty_string, safe_number, safe_string},
};

pub const DEFAULT_ICON_CODE: &str = "01d";
pub const DEFAULT_DESCRIPTION: &str = "Unknown";
/// Metres.
pub const DEFAULT_VISIBILITY: f64 = 10_000.0;
/// OpenWeather's "good" air-quality index.
pub const DEFAULT_AQI: i64 = 1;

/// Current conditions as read from `/weather`.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentReading {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    /// Metres.
    pub visibility: f64,
    pub description: String,
    pub icon_code: String,
    pub sunrise: i64,
    pub sunset: i64,
    pub country: String,
    pub city: String,
    /// Cloud cover percentage.
    pub cloud_cover: f64,
    /// Seconds east of UTC.
    pub timezone_offset: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub dt: i64,
    pub temp: f64,
    pub icon_code: String,
}

/// The 3-hour step feed from `/forecast`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastFeed {
    pub entries: Vec<ForecastEntry>,
    pub timezone_offset: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AirQualityReading {
    pub aqi: i64,
}

fn timestamp_or(value: Option<&Value>, fallback: i64) -> i64 {
    value
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(fallback)
}

fn offset_or_zero(value: Option<&Value>) -> i32 {
    value
        .and_then(Value::as_i64)
        .and_then(|v| i32::try_from(v).ok())
        .unwrap_or(0)
}

pub fn normalize_current(raw: &Value, now: DateTime<Utc>) -> CurrentReading {
    if !raw.is_object() {
        tracing::warn!("current conditions payload is not an object, using defaults");
    }

    let now_ts = now.timestamp();
    let weather = safe_array(raw.get("weather")).first();

    CurrentReading {
        temp: safe_number(raw.pointer("/main/temp"), 0.0),
        feels_like: safe_number(raw.pointer("/main/feels_like"), 0.0),
        humidity: safe_number(raw.pointer("/main/humidity"), 0.0),
        wind_speed: safe_number(raw.pointer("/wind/speed"), 0.0),
        visibility: safe_number(raw.get("visibility"), DEFAULT_VISIBILITY),
        description: safe_string(weather.and_then(|w| w.get("description")), DEFAULT_DESCRIPTION),
        icon_code: safe_string(weather.and_then(|w| w.get("icon")), DEFAULT_ICON_CODE),
        sunrise: timestamp_or(raw.pointer("/sys/sunrise"), now_ts),
        sunset: timestamp_or(raw.pointer("/sys/sunset"), now_ts),
        country: safe_non_empty_string(raw.pointer("/sys/country"), "Unknown"),
        city: safe_non_empty_string(raw.get("name"), UNKNOWN_CITY),
        cloud_cover: safe_number(raw.pointer("/clouds/all"), 0.0),
        timezone_offset: offset_or_zero(raw.get("timezone")),
    }
}

pub fn normalize_forecast(raw: &Value, now: DateTime<Utc>) -> ForecastFeed {
    let Some(list) = raw.get("list").and_then(Value::as_array) else {
        tracing::warn!("forecast payload has no list, using an empty feed");
        return ForecastFeed {
            entries: Vec::new(),
            timezone_offset: offset_or_zero(raw.pointer("/city/timezone")),
        };
    };

    let now_ts = now.timestamp();
    let entries = list
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let fallback_dt = now_ts + index as i64 * 3600;
            if !item.is_object() {
                tracing::warn!(index, "invalid forecast item, using defaults");
            }
            let icon = safe_array(item.get("weather"))
                .first()
                .and_then(|w| w.get("icon"));
            ForecastEntry {
                dt: timestamp_or(item.get("dt"), fallback_dt),
                temp: safe_number(item.pointer("/main/temp"), 0.0),
                icon_code: safe_string(icon, DEFAULT_ICON_CODE),
            }
        })
        .collect();

    ForecastFeed {
        entries,
        timezone_offset: offset_or_zero(raw.pointer("/city/timezone")),
    }
}

/// Only the first reading in `list` is meaningful for a single coordinate.
pub fn normalize_air_quality(raw: &Value) -> AirQualityReading {
    let first = safe_array(raw.get("list")).first();
    if first.is_none() {
        tracing::warn!("air quality payload has no readings, assuming index {DEFAULT_AQI}");
    }

    let aqi = first
        .and_then(|item| item.pointer("/main/aqi"))
        .and_then(Value::as_f64)
        .map(|v| v.round() as i64)
        .unwrap_or(DEFAULT_AQI);

    AirQualityReading { aqi }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn current_reads_full_payload() {
        let raw = json!({
            "name": "San Francisco",
            "timezone": -28800,
            "visibility": 9000,
            "main": {"temp": 14.6, "feels_like": 13.2, "humidity": 82},
            "wind": {"speed": 5.1},
            "weather": [{"description": "light rain", "icon": "10d"}],
            "sys": {"sunrise": 1_699_973_000, "sunset": 1_700_010_000, "country": "US"},
            "clouds": {"all": 75}
        });

        let reading = normalize_current(&raw, now());
        assert_eq!(reading.city, "San Francisco");
        assert_eq!(reading.country, "US");
        assert_eq!(reading.temp, 14.6);
        assert_eq!(reading.humidity, 82.0);
        assert_eq!(reading.visibility, 9000.0);
        assert_eq!(reading.icon_code, "10d");
        assert_eq!(reading.description, "light rain");
        assert_eq!(reading.sunrise, 1_699_973_000);
        assert_eq!(reading.cloud_cover, 75.0);
        assert_eq!(reading.timezone_offset, -28800);
    }

    #[test]
    fn current_defaults_every_missing_field() {
        let reading = normalize_current(&json!({}), now());
        assert_eq!(reading.temp, 0.0);
        assert_eq!(reading.feels_like, 0.0);
        assert_eq!(reading.wind_speed, 0.0);
        assert_eq!(reading.visibility, DEFAULT_VISIBILITY);
        assert_eq!(reading.description, DEFAULT_DESCRIPTION);
        assert_eq!(reading.icon_code, DEFAULT_ICON_CODE);
        assert_eq!(reading.sunrise, now().timestamp());
        assert_eq!(reading.sunset, now().timestamp());
        assert_eq!(reading.country, "Unknown");
        assert_eq!(reading.city, "Unknown City");
        assert_eq!(reading.timezone_offset, 0);
    }

    #[test]
    fn current_ignores_mistyped_fields() {
        let raw = json!({
            "name": 42,
            "main": {"temp": "hot", "humidity": null},
            "weather": "sunny",
            "sys": "nope",
            "clouds": []
        });
        let reading = normalize_current(&raw, now());
        assert_eq!(reading.city, "Unknown City");
        assert_eq!(reading.temp, 0.0);
        assert_eq!(reading.humidity, 0.0);
        assert_eq!(reading.icon_code, DEFAULT_ICON_CODE);
        assert_eq!(reading.cloud_cover, 0.0);
    }

    #[test]
    fn current_treats_blank_names_as_missing() {
        let raw = json!({"name": "", "sys": {"country": "  "}});
        let reading = normalize_current(&raw, now());
        assert_eq!(reading.city, UNKNOWN_CITY);
        assert_eq!(reading.country, "Unknown");
    }

    #[test]
    fn current_tolerates_non_object_payload() {
        for raw in [json!(null), json!([]), json!("text"), json!(3)] {
            let reading = normalize_current(&raw, now());
            assert_eq!(reading.city, "Unknown City");
        }
    }

    #[test]
    fn forecast_defaults_bad_items() {
        let raw = json!({
            "city": {"timezone": 3600},
            "list": [
                {"dt": 1_700_010_800, "main": {"temp": 10.4}, "weather": [{"icon": "04n"}]},
                "garbage",
                {"main": {}, "weather": []}
            ]
        });

        let feed = normalize_forecast(&raw, now());
        assert_eq!(feed.timezone_offset, 3600);
        assert_eq!(feed.entries.len(), 3);
        assert_eq!(feed.entries[0].dt, 1_700_010_800);
        assert_eq!(feed.entries[0].icon_code, "04n");
        assert_eq!(feed.entries[1].dt, now().timestamp() + 3600);
        assert_eq!(feed.entries[1].temp, 0.0);
        assert_eq!(feed.entries[2].dt, now().timestamp() + 7200);
        assert_eq!(feed.entries[2].icon_code, DEFAULT_ICON_CODE);
    }

    #[test]
    fn forecast_without_list_is_empty() {
        assert!(normalize_forecast(&json!({}), now()).entries.is_empty());
        assert!(normalize_forecast(&json!({"list": {}}), now()).entries.is_empty());
        assert!(normalize_forecast(&json!(null), now()).entries.is_empty());
    }

    #[test]
    fn air_quality_reads_first_item() {
        let raw = json!({"list": [{"main": {"aqi": 3}}, {"main": {"aqi": 5}}]});
        assert_eq!(normalize_air_quality(&raw).aqi, 3);
    }

    #[test]
    fn air_quality_defaults() {
        assert_eq!(normalize_air_quality(&json!({"list": []})).aqi, DEFAULT_AQI);
        assert_eq!(normalize_air_quality(&json!({"list": ["x"]})).aqi, DEFAULT_AQI);
        assert_eq!(normalize_air_quality(&json!(null)).aqi, DEFAULT_AQI);
    }
}
