use crate::constants::EARTH_RADIUS_KM;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(format!(
                "Invalid latitude: {} (must be between -90 and 90)",
                lat
            ));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(format!(
                "Invalid longitude: {} (must be between -180 and 180)",
                lng
            ));
        }
        Ok(Coordinates { lat, lng })
    }

    /// Calculate distance between two coordinates using Haversine formula
    /// Returns distance in kilometers
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Linear interpolation in coordinate space: `self + (other - self) * fraction`.
    /// Not a great-circle interpolation.
    pub fn lerp(&self, other: &Coordinates, fraction: f64) -> Coordinates {
        Coordinates {
            lat: self.lat + (other.lat - self.lat) * fraction,
            lng: self.lng + (other.lng - self.lng) * fraction,
        }
    }

    /// True when both axes differ by at most `tolerance_deg`.
    pub fn approx_eq(&self, other: &Coordinates, tolerance_deg: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance_deg
            && (self.lng - other.lng).abs() <= tolerance_deg
    }
}

/// Great-circle distance in kilometers. Symmetric, zero for identical points.
pub fn distance_km(a: &Coordinates, b: &Coordinates) -> f64 {
    a.distance_to(b)
}

/// A position fix from the location provider. Each sample replaces the
/// previous one wholesale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LocationSample {
    pub coordinates: Coordinates,
    /// Horizontal accuracy radius in meters
    pub accuracy_m: f64,
}

impl LocationSample {
    /// Accuracy used when the provider does not report one.
    pub const DEFAULT_ACCURACY_M: f64 = 10.0;

    pub fn new(coordinates: Coordinates, accuracy_m: f64) -> Result<Self, String> {
        if !accuracy_m.is_finite() || accuracy_m < 0.0 {
            return Err(format!(
                "Invalid accuracy: {} (must be a finite number >= 0)",
                accuracy_m
            ));
        }
        Ok(LocationSample {
            coordinates,
            accuracy_m,
        })
    }

    pub fn at(coordinates: Coordinates) -> Self {
        LocationSample {
            coordinates,
            accuracy_m: Self::DEFAULT_ACCURACY_M,
        }
    }
}
