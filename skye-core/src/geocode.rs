//! City search and reverse geocoding over the provider's geocoding endpoints.

use serde_json::Value;

use crate::{
    error::WeatherError,
    model::{CitySearchResult, Coordinate, LocationInfo, UNKNOWN_CITY, UNKNOWN_COUNTRY},
    provider::WeatherProvider,
    validation::{safe_array, validate_coordinates},
};

pub const DEFAULT_SEARCH_LIMIT: usize = 10;
pub const MAX_SEARCH_LIMIT: usize = 50;

fn item_coordinate(item: &Value) -> Option<Coordinate> {
    let latitude = item.get("lat")?.as_f64()?;
    let longitude = item.get("lon")?.as_f64()?;
    validate_coordinates(latitude, longitude)
        .is_valid
        .then_some(Coordinate {
            latitude,
            longitude,
        })
}

fn non_empty_str<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Keep only entries with a usable name, country and position.
pub fn parse_city_results(data: &Value) -> Vec<CitySearchResult> {
    safe_array(Some(data))
        .iter()
        .filter_map(|item| {
            Some(CitySearchResult {
                name: non_empty_str(item, "name")?.to_string(),
                country: non_empty_str(item, "country")?.to_string(),
                state: non_empty_str(item, "state").map(str::to_string),
                coordinate: item_coordinate(item)?,
            })
        })
        .collect()
}

/// First entry with a valid position, or the unknown defaults.
pub fn parse_reverse_result(data: &Value, coordinate: Coordinate) -> LocationInfo {
    let Some(item) = safe_array(Some(data))
        .iter()
        .find(|item| item_coordinate(item).is_some())
    else {
        return LocationInfo::unknown(coordinate);
    };

    let city = non_empty_str(item, "name")
        .or_else(|| {
            item.pointer("/local_names/en")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or(UNKNOWN_CITY);
    let country = non_empty_str(item, "country").unwrap_or(UNKNOWN_COUNTRY);

    LocationInfo {
        coordinate,
        city: city.to_string(),
        country: country.to_string(),
    }
}

/// Clamp a requested result count into `1..=MAX_SEARCH_LIMIT`; zero means the default.
pub fn effective_limit(limit: usize) -> usize {
    match limit {
        0 => DEFAULT_SEARCH_LIMIT,
        n => n.min(MAX_SEARCH_LIMIT),
    }
}

pub async fn search_cities(
    provider: &dyn WeatherProvider,
    query: &str,
    limit: usize,
) -> Result<Vec<CitySearchResult>, WeatherError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let limit = effective_limit(limit);
    let data = provider.geocode_direct(query, limit).await.map_err(|e| {
        tracing::error!("Error searching cities: {e}");
        WeatherError::Network("Failed to search cities. Please try again.".to_string())
    })?;

    let results = parse_city_results(&data);
    tracing::debug!(query, count = results.len(), "City search complete");
    Ok(results)
}

/// Best-effort place name for `coordinate`. Never fails.
pub async fn reverse_geocode(
    provider: &dyn WeatherProvider,
    coordinate: Coordinate,
) -> LocationInfo {
    if !coordinate.is_valid() {
        tracing::warn!(%coordinate, "Invalid coordinates provided for geocoding");
        return LocationInfo::unknown(coordinate);
    }

    match provider.geocode_reverse(coordinate, 1).await {
        Ok(data) => parse_reverse_result(&data, coordinate),
        Err(e) => {
            tracing::warn!("Error getting location name: {e}");
            LocationInfo::unknown(coordinate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn city_results_are_filtered() {
        let data = json!([
            {"name": "Paris", "country": "FR", "state": "Ile-de-France", "lat": 48.85, "lon": 2.35},
            {"name": "Paris", "country": "US", "lat": 33.66, "lon": -95.55},
            {"name": "", "country": "FR", "lat": 1.0, "lon": 1.0},
            {"name": "Nowhere", "country": "XX", "lat": 120.0, "lon": 1.0},
            {"name": "NoCountry", "lat": 1.0, "lon": 1.0},
            {"name": "Text", "country": "YY", "lat": "1", "lon": 1.0},
            "garbage"
        ]);

        let results = parse_city_results(&data);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].state.as_deref(), Some("Ile-de-France"));
        assert_eq!(results[1].state, None);
        assert_eq!(results[1].coordinate.longitude, -95.55);
    }

    #[test]
    fn city_results_from_non_array_is_empty() {
        assert!(parse_city_results(&json!({"cod": 401})).is_empty());
    }

    #[test]
    fn reverse_prefers_name_then_local_english() {
        let at = Coordinate {
            latitude: 51.5,
            longitude: -0.12,
        };
        let info = parse_reverse_result(
            &json!([{"name": "London", "country": "GB", "lat": 51.5, "lon": -0.12}]),
            at,
        );
        assert_eq!(info.city, "London");
        assert_eq!(info.country, "GB");

        let info = parse_reverse_result(
            &json!([{"local_names": {"en": "Londres"}, "lat": 51.5, "lon": -0.12}]),
            at,
        );
        assert_eq!(info.city, "Londres");
        assert_eq!(info.country, UNKNOWN_COUNTRY);
    }

    #[test]
    fn reverse_without_valid_items_is_unknown() {
        let at = Coordinate {
            latitude: 0.0,
            longitude: 0.0,
        };
        assert_eq!(parse_reverse_result(&json!([]), at), LocationInfo::unknown(at));
        assert_eq!(
            parse_reverse_result(&json!([{"name": "X", "lat": 999, "lon": 0}]), at),
            LocationInfo::unknown(at)
        );
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(effective_limit(0), DEFAULT_SEARCH_LIMIT);
        assert_eq!(effective_limit(5), 5);
        assert_eq!(effective_limit(50), 50);
        assert_eq!(effective_limit(999), MAX_SEARCH_LIMIT);
    }
}
