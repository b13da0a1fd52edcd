//! Device position lookup behind a platform-neutral [`Geolocator`].

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{error::LocationError, model::Coordinate};

/// Platform hook for the device's position service.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn services_enabled(&self) -> bool;

    async fn permission_granted(&self) -> bool;

    /// Ask the user for access. Returns whether it was granted.
    async fn request_permission(&self) -> bool;

    async fn current_position(&self) -> Result<Coordinate, LocationError>;
}

#[derive(Debug, Clone)]
pub struct LocationService {
    geolocator: Arc<dyn Geolocator>,
}

impl LocationService {
    pub fn new(geolocator: Arc<dyn Geolocator>) -> Self {
        Self { geolocator }
    }

    pub async fn is_location_enabled(&self) -> bool {
        self.geolocator.services_enabled().await
    }

    /// Current device position, sanitized to six decimals.
    pub async fn current_coordinate(&self) -> Result<Coordinate, LocationError> {
        if !self.geolocator.services_enabled().await {
            return Err(LocationError::ServiceDisabled);
        }

        if !self.geolocator.permission_granted().await
            && !self.geolocator.request_permission().await
        {
            return Err(LocationError::PermissionDenied);
        }

        let position = self.geolocator.current_position().await?;
        if !position.is_valid() {
            tracing::warn!(%position, "Invalid coordinates in location data");
            return Err(LocationError::InvalidData);
        }

        Ok(position.sanitized())
    }
}

/// Serves a fixed position, e.g. a configured home location.
///
/// With no position, location services report as disabled.
#[derive(Debug, Clone, Default)]
pub struct FixedGeolocator {
    position: Option<Coordinate>,
}

impl FixedGeolocator {
    pub fn new(position: Option<Coordinate>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn services_enabled(&self) -> bool {
        self.position.is_some()
    }

    async fn permission_granted(&self) -> bool {
        true
    }

    async fn request_permission(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        self.position.ok_or(LocationError::ServiceDisabled)
    }
}
