use crate::constants::FALLBACK_ROUTE_SEGMENTS;
use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a route path came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    /// Road geometry from the routing service
    Routed,
    /// Straight interpolation synthesized locally
    Fallback,
}

impl fmt::Display for RouteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteSource::Routed => write!(f, "routed"),
            RouteSource::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Route {
    /// Ordered path, origin first, destination last
    pub path: Vec<Coordinates>,
    pub source: RouteSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

impl Route {
    pub fn routed(path: Vec<Coordinates>, distance_km: f64, duration_minutes: u32) -> Self {
        Route {
            path,
            source: RouteSource::Routed,
            distance_km: Some(distance_km),
            duration_minutes: Some(duration_minutes),
        }
    }

    /// Deterministic straight path used whenever the routing service cannot
    /// answer. Always `FALLBACK_ROUTE_SEGMENTS + 1` points.
    pub fn fallback(origin: Coordinates, destination: Coordinates) -> Self {
        let path = (0..=FALLBACK_ROUTE_SEGMENTS)
            .map(|i| match i {
                0 => origin,
                // `a + (b - a) * 1.0` can be off by one ulp
                FALLBACK_ROUTE_SEGMENTS => destination,
                _ => origin.lerp(&destination, i as f64 / FALLBACK_ROUTE_SEGMENTS as f64),
            })
            .collect();

        Route {
            path,
            source: RouteSource::Fallback,
            distance_km: None,
            duration_minutes: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == RouteSource::Fallback
    }
}
