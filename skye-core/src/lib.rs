//! Core library for the Skye weather app.
//!
//! This crate defines:
//! - Validation of untrusted input and total normalization of provider payloads
//! - Icon / air-quality mapping and display formatting
//! - The weather service that aggregates current, forecast and air-quality feeds
//! - A single-entry expiring snapshot cache over a pluggable key-value store
//! - City search, reverse geocoding and device location lookup
//! - Configuration & credentials handling
//!
//! It is used by `skye-cli`, but can also be embedded by other front ends.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod estimate;
pub mod geocode;
pub mod location;
pub mod mapping;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod service;
pub mod storage;
pub mod validation;

pub use cache::WeatherCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, TrackedLocation};
pub use error::{LocationError, WeatherError};
pub use location::{FixedGeolocator, Geolocator, LocationService};
pub use model::{
    CitySearchResult, Coordinate, CurrentConditions, DailySlice, HourlySlice, LocationInfo,
    WeatherSnapshot,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherClient, provider_from_config};
pub use service::{ProgressFn, WeatherService};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
