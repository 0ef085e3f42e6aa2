use crate::constants::{DEFAULT_OSRM_BASE_URL, DEFAULT_OSRM_PROFILE, DEFAULT_ROUTE_TIMEOUT_SECONDS};
use crate::error::{AppError, Result};
use crate::models::Coordinates;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for an OSRM-compatible `/route/v1/{profile}` endpoint.
#[derive(Clone)]
pub struct OsrmClient {
    client: Client,
    base_url: String,
    profile: String,
}

impl OsrmClient {
    pub fn new() -> Result<Self> {
        Self::with_config(
            DEFAULT_OSRM_BASE_URL.to_string(),
            DEFAULT_OSRM_PROFILE.to_string(),
            Duration::from_secs(DEFAULT_ROUTE_TIMEOUT_SECONDS),
        )
    }

    pub fn with_config(base_url: String, profile: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(OsrmClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            profile,
        })
    }

    /// Full URL for a route between two points. OSRM wants `lng,lat` pairs.
    pub fn route_url(&self, origin: &Coordinates, destination: &Coordinates) -> String {
        format!(
            "{}/{}/{},{};{},{}",
            self.base_url, self.profile, origin.lng, origin.lat, destination.lng, destination.lat
        )
    }

    /// Get a routed path with full geometry between two points
    pub async fn get_route(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
    ) -> Result<DirectionsResponse> {
        let url = self.route_url(origin, destination);

        tracing::debug!(
            profile = %self.profile,
            "OSRM request: ({}, {}) -> ({}, {})",
            origin.lat, origin.lng, destination.lat, destination.lng
        );

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await
            .map_err(|e| AppError::Routing(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = %status, "OSRM HTTP error {}: {}", status, error_text);
            return Err(AppError::Routing(format!("HTTP {}: {}", status, error_text)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains("application/json") {
            return Err(AppError::Routing(format!(
                "Response is not JSON (content-type: '{}')",
                content_type
            )));
        }

        let directions: OsrmRouteApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Routing(format!("Failed to parse response: {}", e)))?;

        let route = directions
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Routing("No routes found".to_string()))?;

        if route.geometry.coordinates.is_empty() {
            return Err(AppError::Routing("Route has no geometry".to_string()));
        }

        tracing::debug!(
            distance_km = %format!("{:.2}", route.distance / 1000.0),
            duration_min = %format!("{:.0}", route.duration / 60.0),
            path_points = route.geometry.coordinates.len(),
            "OSRM response: {:.2}km, {:.0}min, {} path points",
            route.distance / 1000.0, route.duration / 60.0, route.geometry.coordinates.len()
        );

        Ok(DirectionsResponse {
            distance_meters: route.distance,
            duration_seconds: route.duration,
            geometry: route.geometry.coordinates,
        })
    }
}

// OSRM API response types

#[derive(Debug, Deserialize)]
struct OsrmRouteApiResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    #[serde(default)]
    distance: f64, // meters
    #[serde(default)]
    duration: f64, // seconds
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>, // [lng, lat] pairs
}

// Our simplified response type

#[derive(Debug, Clone, Serialize)]
pub struct DirectionsResponse {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    /// GeoJSON coordinates as [lng, lat] pairs
    pub geometry: Vec<[f64; 2]>,
}

impl DirectionsResponse {
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    pub fn duration_minutes(&self) -> u32 {
        (self.duration_seconds / 60.0).round() as u32
    }

    /// Convert GeoJSON `[lng, lat]` pairs to our Coordinates type
    pub fn to_coordinates(&self) -> Vec<Coordinates> {
        self.geometry
            .iter()
            .filter_map(|coord| Coordinates::new(coord[1], coord[0]).ok())
            .collect()
    }
}
