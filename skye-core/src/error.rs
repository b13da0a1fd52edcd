//! Error types surfaced at the service boundary.

use thiserror::Error;

/// Failures while obtaining the device position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location services are disabled")]
    ServiceDisabled,
    #[error("Location request timed out")]
    Timeout,
    #[error("Invalid location data received from device")]
    InvalidData,
    #[error("Location error: {0}")]
    Other(String),
}

impl LocationError {
    /// Remediation text for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied => {
                "Location permission denied. Please enable location access in settings.".to_string()
            }
            Self::ServiceDisabled => {
                "Location services are disabled. Please enable GPS.".to_string()
            }
            Self::Timeout => "Location request timed out. Please try again.".to_string(),
            Self::InvalidData => "Invalid location data received. Please try again.".to_string(),
            Self::Other(msg) => format!("Unable to get your location: {msg}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Caller supplied malformed input (coordinates, query).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upstream unreachable, timed out, or answered with a non-success status.
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream answered 2xx but the body is unusable.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Location(#[from] LocationError),

    /// Stored cache entry could not be trusted. Never leaves the cache module.
    #[error("Cache corruption: {0}")]
    CacheCorruption(String),
}

impl WeatherError {
    /// Short human-readable message for display next to a retry action.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => format!("Invalid request: {msg}"),
            Self::Network(_) => {
                "Network error. Please check your internet connection and try again.".to_string()
            }
            Self::InvalidResponse(_) => {
                "The weather service returned unexpected data. Please try again.".to_string()
            }
            Self::Location(err) => err.user_message(),
            Self::CacheCorruption(_) => "Local cache error".to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::InvalidResponse(_))
    }

    pub(crate) fn with_context(self, context: &str) -> Self {
        match self {
            Self::Network(msg) => Self::Network(format!("{context}: {msg}")),
            Self::InvalidResponse(msg) => Self::InvalidResponse(format!("{context}: {msg}")),
            other => other,
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(format!("request timed out: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}
