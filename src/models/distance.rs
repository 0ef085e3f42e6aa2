use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit preference for displaying distances to the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Km,
    M,
}

impl DistanceUnit {
    /// Format a distance given in kilometers for list rows and marker subtitles.
    pub fn format(&self, distance_km: f64) -> String {
        match self {
            DistanceUnit::Km => format!("{:.2} km", distance_km),
            DistanceUnit::M => format!("{:.0} m", distance_km * 1000.0),
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceUnit::Km => write!(f, "km"),
            DistanceUnit::M => write!(f, "m"),
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "km" | "kilometers" => Ok(DistanceUnit::Km),
            "m" | "meters" => Ok(DistanceUnit::M),
            _ => Err(format!("Invalid distance unit: '{}'", s)),
        }
    }
}
