use crate::models::Coordinates;
use serde::{Deserialize, Serialize};

/// A partner location willing to shelter someone in danger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefugeZone {
    pub id: String,
    pub name: String,
    pub coordinates: Coordinates,
    /// Declared zone radius. Informational: guidance thresholds ignore it.
    pub radius_m: f64,
}

impl RefugeZone {
    pub fn new(id: &str, name: &str, lat: f64, lng: f64, radius_m: f64) -> Result<Self, String> {
        Ok(RefugeZone {
            id: id.to_string(),
            name: name.to_string(),
            coordinates: Coordinates::new(lat, lng)?,
            radius_m,
        })
    }

    pub fn distance_from(&self, point: &Coordinates) -> f64 {
        point.distance_to(&self.coordinates)
    }
}

/// A refuge paired with its distance from some reference point.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RefugeDistance {
    #[serde(flatten)]
    pub zone: RefugeZone,
    pub distance_km: f64,
}
