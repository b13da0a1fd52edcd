//! Provider codes to display tokens, and display formatting of timestamps.

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Display category used when a provider icon code is not recognised.
pub const DEFAULT_ICON: &str = "cloud";

/// Map an OpenWeather icon code (e.g. `"10n"`) to a display category.
pub fn map_icon(code: &str) -> &'static str {
    match code {
        "01d" => "sunny",
        "01n" => "moon",
        "02d" => "partly-sunny",
        "02n" => "cloudy-night",
        "03d" | "03n" => "cloud",
        "04d" | "04n" => "cloud-outline",
        "09d" | "09n" | "10d" | "10n" => "rainy",
        "11d" | "11n" => "thunderstorm",
        "13d" | "13n" => "snow",
        "50d" | "50n" => "water",
        _ => DEFAULT_ICON,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AirQualityInfo {
    pub status: &'static str,
    pub color: &'static str,
}

pub fn map_air_quality(aqi: i64) -> AirQualityInfo {
    let (status, color) = match aqi {
        i64::MIN..=50 => ("Good", "#7ed957"),
        51..=100 => ("Moderate", "#f7c873"),
        101..=150 => ("Unhealthy for Sensitive Groups", "#ff9f43"),
        151..=200 => ("Unhealthy", "#ff6b6b"),
        201..=300 => ("Very Unhealthy", "#a55eea"),
        _ => ("Hazardous", "#6c5ce7"),
    };
    AirQualityInfo { status, color }
}

fn offset_or_utc(offset_secs: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_secs).unwrap_or_else(|| Utc.fix())
}

fn to_local(timestamp: i64, offset_secs: i32) -> DateTime<FixedOffset> {
    let utc = DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap_or_default();
    utc.with_timezone(&offset_or_utc(offset_secs))
}

/// `"7:05 AM"` in the location's UTC offset.
pub fn format_time(timestamp: i64, offset_secs: i32) -> String {
    to_local(timestamp, offset_secs).format("%-I:%M %p").to_string()
}

/// Short weekday, e.g. `"Mon"`.
pub fn format_day(timestamp: i64, offset_secs: i32) -> String {
    to_local(timestamp, offset_secs).format("%a").to_string()
}

/// `"7:05:09 PM"`, used for the snapshot's last-updated stamp.
pub fn format_updated(at: DateTime<Utc>, offset_secs: i32) -> String {
    at.with_timezone(&offset_or_utc(offset_secs))
        .format("%-I:%M:%S %p")
        .to_string()
}
