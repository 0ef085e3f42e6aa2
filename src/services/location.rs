use crate::error::LocationError;
use crate::models::LocationSample;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Where the device position comes from. Implemented by the host shell.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<LocationSample, LocationError>;
}

/// What the UI shows about the location fix.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocationStatus {
    #[default]
    Locating,
    Available,
    PermissionDenied,
    Unavailable,
}

impl From<&LocationError> for LocationStatus {
    fn from(error: &LocationError) -> Self {
        match error {
            LocationError::PermissionDenied => LocationStatus::PermissionDenied,
            LocationError::Unavailable(_) => LocationStatus::Unavailable,
        }
    }
}

/// Always answers with the same sample. Handy for demos and tests.
#[derive(Debug, Clone)]
pub struct FixedLocationProvider {
    sample: Result<LocationSample, LocationError>,
}

impl FixedLocationProvider {
    pub fn at(sample: LocationSample) -> Self {
        Self { sample: Ok(sample) }
    }

    pub fn failing(error: LocationError) -> Self {
        Self { sample: Err(error) }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_position(&self) -> Result<LocationSample, LocationError> {
        self.sample.clone()
    }
}
