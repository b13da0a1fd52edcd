use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;
use crate::validation::validate_coordinates;

pub const UNKNOWN_CITY: &str = "Unknown City";
pub const UNKNOWN_COUNTRY: &str = "Unknown Country";

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default tolerance used when comparing two positions.
pub const DEFAULT_PROXIMITY_M: f64 = 100.0;

/// A point on the globe.
///
/// Fields are public so callers can hold positions from any source; use
/// [`Coordinate::new`] or [`Coordinate::validate`] before trusting one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    pub fn validate(&self) -> Result<(), WeatherError> {
        let result = validate_coordinates(self.latitude, self.longitude);
        if result.is_valid {
            Ok(())
        } else {
            Err(WeatherError::Validation(result.errors.join("; ")))
        }
    }

    pub fn is_valid(&self) -> bool {
        validate_coordinates(self.latitude, self.longitude).is_valid
    }

    /// Round both axes to 6 decimal places (about one metre).
    pub fn sanitized(&self) -> Self {
        let round = |v: f64| (v * 1_000_000.0).round() / 1_000_000.0;
        Self {
            latitude: round(self.latitude),
            longitude: round(self.longitude),
        }
    }

    /// Great-circle distance in metres (haversine).
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// True when both positions are valid and within `tolerance_m` of each other.
    pub fn is_near(&self, other: &Coordinate, tolerance_m: f64) -> bool {
        self.is_valid() && other.is_valid() && self.distance_to(other) <= tolerance_m
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub city: String,
    pub country: String,
}

impl LocationInfo {
    pub fn unknown(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            city: UNKNOWN_CITY.to_string(),
            country: UNKNOWN_COUNTRY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp: i64,
    pub feels_like: i64,
    pub humidity: i64,
    pub wind_speed: i64,
    /// Kilometres.
    pub visibility: i64,
    pub description: String,
    /// Display category, see [`crate::mapping::map_icon`].
    pub icon: String,
    /// Percent. Estimated, see [`crate::estimate::SupplementalSource`].
    pub precipitation: i64,
    pub uv_index: f64,
    pub sunrise: String,
    pub sunset: String,
    pub aqi: i64,
    pub aqi_status: String,
    pub aqi_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySlice {
    pub hour: String,
    pub temp: i64,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySlice {
    pub day: String,
    pub temp: i64,
    pub icon: String,
}

/// The unified record for one location at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub hourly: Vec<HourlySlice>,
    pub daily: Vec<DailySlice>,
    pub location: LocationInfo,
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
}

/// What actually lands in the key-value store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(rename = "weatherData")]
    pub snapshot: WeatherSnapshot,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySearchResult {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(flatten)]
    pub coordinate: Coordinate,
}

impl CitySearchResult {
    pub fn display_name(&self) -> String {
        match &self.state {
            Some(state) => format!("{}, {}, {}", self.name, state, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}

impl std::fmt::Display for CitySearchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_out_of_range() {
        assert!(Coordinate::new(37.7749, -122.4194).is_ok());
        assert!(matches!(Coordinate::new(91.0, 0.0), Err(WeatherError::Validation(_))));
        assert!(matches!(Coordinate::new(0.0, -180.5), Err(WeatherError::Validation(_))));
        assert!(matches!(Coordinate::new(f64::NAN, 0.0), Err(WeatherError::Validation(_))));
    }

    #[test]
    fn sanitized_rounds_to_six_decimals() {
        let c = Coordinate {
            latitude: 12.123_456_789,
            longitude: -1.000_000_4,
        };
        let s = c.sanitized();
        assert_eq!(s.latitude, 12.123_457);
        assert_eq!(s.longitude, -1.0);
    }

    #[test]
    fn distance_between_sf_and_la_is_about_560km() {
        let sf = Coordinate {
            latitude: 37.7749,
            longitude: -122.4194,
        };
        let la = Coordinate {
            latitude: 34.0522,
            longitude: -118.2437,
        };
        let d = sf.distance_to(&la);
        assert!((d - 559_000.0).abs() < 5_000.0, "got {d}");
    }

    #[test]
    fn is_near_uses_tolerance_and_validity() {
        let a = Coordinate {
            latitude: 37.7749,
            longitude: -122.4194,
        };
        let b = Coordinate {
            latitude: 37.7753,
            longitude: -122.4194,
        };
        assert!(a.is_near(&b, DEFAULT_PROXIMITY_M));
        assert!(!a.is_near(&b, 10.0));

        let bad = Coordinate {
            latitude: 100.0,
            longitude: 0.0,
        };
        assert!(!bad.is_near(&bad, DEFAULT_PROXIMITY_M));
    }

    #[test]
    fn city_display_includes_state_when_present() {
        let city = CitySearchResult {
            name: "Portland".into(),
            country: "US".into(),
            state: Some("Oregon".into()),
            coordinate: Coordinate {
                latitude: 45.52,
                longitude: -122.68,
            },
        };
        assert_eq!(city.display_name(), "Portland, Oregon, US");
    }

    #[test]
    fn snapshot_serializes_last_updated_camel_case() {
        let snapshot = WeatherSnapshot {
            current: CurrentConditions {
                temp: 0,
                feels_like: 0,
                humidity: 0,
                wind_speed: 0,
                visibility: 10,
                description: "Unknown".into(),
                icon: "sunny".into(),
                precipitation: 0,
                uv_index: 4.5,
                sunrise: "6:00 AM".into(),
                sunset: "6:00 PM".into(),
                aqi: 1,
                aqi_status: "Good".into(),
                aqi_color: "#7ed957".into(),
            },
            hourly: vec![],
            daily: vec![],
            location: LocationInfo::unknown(Coordinate {
                latitude: 0.0,
                longitude: 0.0,
            }),
            last_updated: "12:00:00 PM".into(),
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["lastUpdated"], "12:00:00 PM");
        assert_eq!(json["location"]["city"], UNKNOWN_CITY);
        assert_eq!(json["location"]["latitude"], 0.0);
    }
}
