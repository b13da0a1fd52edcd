//! Values the free OpenWeather tier does not provide.
//!
//! Precipitation chance and UV index are placeholders today. They sit behind
//! [`SupplementalSource`] so a richer upstream can replace them without
//! touching the aggregator.

use std::fmt::Debug;

use crate::normalize::CurrentReading;

/// UV index reported when no real source is available.
pub const PLACEHOLDER_UV_INDEX: f64 = 4.5;

pub trait SupplementalSource: Send + Sync + Debug {
    /// Chance of precipitation in percent.
    fn precipitation(&self, current: &CurrentReading) -> i64;

    fn uv_index(&self, current: &CurrentReading) -> f64;
}

/// Cloud cover stands in for precipitation chance; UV index is constant.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeTierEstimates;

impl SupplementalSource for FreeTierEstimates {
    fn precipitation(&self, current: &CurrentReading) -> i64 {
        current.cloud_cover.clamp(0.0, 100.0).round() as i64
    }

    fn uv_index(&self, _current: &CurrentReading) -> f64 {
        PLACEHOLDER_UV_INDEX
    }
}
