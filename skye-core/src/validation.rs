//! Shape and range checks for untrusted input.
//!
//! Validators report problems through [`ValidationResult`] and never fail;
//! the `safe_*` accessors pull a typed value out of a JSON tree or fall back.

use serde_json::{Map, Value};

const MIN_TEMPERATURE: f64 = -100.0;
const MAX_TEMPERATURE: f64 = 150.0;

const SNAPSHOT_FIELDS: &[&str] = &["current", "hourly", "daily", "location", "lastUpdated"];
const CURRENT_FIELDS: &[&str] = &[
    "temp",
    "feels_like",
    "humidity",
    "wind_speed",
    "description",
    "icon",
    "precipitation",
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> ValidationResult {
    let mut errors = Vec::new();

    if !latitude.is_finite() {
        errors.push("Latitude must be a valid number".to_string());
    } else if !(-90.0..=90.0).contains(&latitude) {
        errors.push("Latitude must be between -90 and 90 degrees".to_string());
    }

    if !longitude.is_finite() {
        errors.push("Longitude must be a valid number".to_string());
    } else if !(-180.0..=180.0).contains(&longitude) {
        errors.push("Longitude must be between -180 and 180 degrees".to_string());
    }

    ValidationResult::from_errors(errors)
}

pub fn validate_temperature(value: &Value) -> ValidationResult {
    let errors = match value.as_f64() {
        None => vec!["Temperature must be a valid number".to_string()],
        Some(t) if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&t) => {
            vec!["Temperature must be between -100 and 150 degrees".to_string()]
        }
        Some(_) => Vec::new(),
    };
    ValidationResult::from_errors(errors)
}

pub fn validate_string(
    value: Option<&Value>,
    field_name: &str,
    required: bool,
) -> ValidationResult {
    let mut errors = Vec::new();
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => {}
        Some(Value::String(_)) | None | Some(Value::Null) if required => {
            errors.push(format!("{field_name} is required and must be a non-empty string"));
        }
        Some(Value::String(_)) | None | Some(Value::Null) => {}
        Some(_) => errors.push(format!("{field_name} must be a string")),
    }
    ValidationResult::from_errors(errors)
}

pub fn validate_array(value: Option<&Value>, field_name: &str, required: bool) -> ValidationResult {
    let mut errors = Vec::new();
    match value {
        Some(Value::Array(items)) if !items.is_empty() => {}
        Some(Value::Array(_)) | None | Some(Value::Null) if required => {
            errors.push(format!("{field_name} is required and must be a non-empty array"));
        }
        Some(Value::Array(_)) | None | Some(Value::Null) => {}
        Some(_) => errors.push(format!("{field_name} must be an array")),
    }
    ValidationResult::from_errors(errors)
}

pub fn validate_object(
    value: Option<&Value>,
    field_name: &str,
    required: bool,
) -> ValidationResult {
    let mut errors = Vec::new();
    match value {
        Some(Value::Object(_)) => {}
        None | Some(Value::Null) if required => {
            errors.push(format!("{field_name} is required and must be a valid object"));
        }
        None | Some(Value::Null) => {}
        Some(_) => errors.push(format!("{field_name} must be an object")),
    }
    ValidationResult::from_errors(errors)
}

/// Check that `response` is an object carrying every key in `required_fields`.
pub fn validate_api_response(response: &Value, required_fields: &[&str]) -> ValidationResult {
    let Some(obj) = response.as_object() else {
        return ValidationResult::from_errors(vec!["API response must be a valid object".into()]);
    };

    let errors = required_fields
        .iter()
        .filter(|field| !obj.contains_key(**field))
        .map(|field| format!("API response missing required field: {field}"))
        .collect();

    ValidationResult::from_errors(errors)
}

/// Structural check for a stored weather snapshot.
pub fn validate_weather_data(data: &Value) -> ValidationResult {
    let object_check = validate_object(Some(data), "weather data", true);
    if !object_check.is_valid {
        return object_check;
    }

    let mut errors = Vec::new();
    for field in SNAPSHOT_FIELDS {
        if data.get(*field).is_none() {
            errors.push(format!("Weather data missing required field: {field}"));
        }
    }

    match data.get("current") {
        Some(Value::Object(current)) => {
            for field in CURRENT_FIELDS {
                if !current.contains_key(*field) {
                    errors.push(format!("Current weather missing required field: {field}"));
                }
            }
        }
        Some(_) => errors.push("Current weather must be an object".to_string()),
        None => {}
    }

    if !data.get("hourly").is_some_and(Value::is_array) {
        errors.push("Hourly forecast must be an array".to_string());
    }
    if !data.get("daily").is_some_and(Value::is_array) {
        errors.push("Daily forecast must be an array".to_string());
    }

    if let Some(location) = data.get("location") {
        let has = |key: &str| {
            location
                .get(key)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty())
        };
        if !has("city") || !has("country") {
            errors.push("Location must have both city and country".to_string());
        }
    }

    ValidationResult::from_errors(errors)
}

/// Check an object carrying `latitude`/`longitude` keys.
pub fn validate_location_data(data: &Value) -> ValidationResult {
    let object_check = validate_object(Some(data), "location data", true);
    if !object_check.is_valid {
        return object_check;
    }

    let lat = data.get("latitude").and_then(Value::as_f64).unwrap_or(f64::NAN);
    let lon = data.get("longitude").and_then(Value::as_f64).unwrap_or(f64::NAN);
    validate_coordinates(lat, lon)
}

pub fn validate_search_query(query: Option<&Value>) -> ValidationResult {
    let errors = match query.and_then(Value::as_str) {
        None => vec!["Search query must be a string".to_string()],
        Some(q) if q.trim().is_empty() => vec!["Search query cannot be empty".to_string()],
        Some(q) if q.trim().chars().count() < 2 => {
            vec!["Search query must be at least 2 characters long".to_string()]
        }
        Some(q) if q.chars().count() > 50 => {
            vec!["Search query cannot exceed 50 characters".to_string()]
        }
        Some(_) => Vec::new(),
    };
    ValidationResult::from_errors(errors)
}

/// Trim, drop angle brackets, and cap at `max_len` characters.
pub fn sanitize_user_input(input: &str, max_len: usize) -> String {
    input
        .trim()
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .take(max_len)
        .collect()
}

pub fn safe_number(value: Option<&Value>, fallback: f64) -> f64 {
    value
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .unwrap_or(fallback)
}

pub fn safe_integer(value: Option<&Value>, fallback: i64) -> i64 {
    value
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .map(|n| n.round() as i64)
        .unwrap_or(fallback)
}

pub fn safe_string(value: Option<&Value>, fallback: &str) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

/// Like [`safe_string`], but whitespace-only strings count as missing.
pub fn safe_non_empty_string(value: Option<&Value>, fallback: &str) -> String {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

pub fn safe_array(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

pub fn safe_object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value.and_then(Value::as_object)
}
