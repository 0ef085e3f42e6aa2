use crate::error::Result;
use crate::models::{Coordinates, Route};
use crate::services::osrm::OsrmClient;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Source of paths between the user and a refuge.
///
/// Implementations never fail outward: whatever goes wrong, the caller gets a
/// non-empty path back.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn fetch_route(&self, origin: Coordinates, destination: Coordinates) -> Route;
}

/// Routes through OSRM, falling back to a straight interpolated path.
#[derive(Clone)]
pub struct OsrmRouteProvider {
    client: OsrmClient,
}

impl OsrmRouteProvider {
    pub fn new(client: OsrmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RouteProvider for OsrmRouteProvider {
    async fn fetch_route(&self, origin: Coordinates, destination: Coordinates) -> Route {
        match self.client.get_route(&origin, &destination).await {
            Ok(directions) => {
                let path = directions.to_coordinates();
                if path.is_empty() {
                    tracing::warn!("OSRM geometry had no valid coordinates, using fallback route");
                    return Route::fallback(origin, destination);
                }
                Route::routed(path, directions.distance_km(), directions.duration_minutes())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Route fetch failed, using fallback route: {}", e);
                Route::fallback(origin, destination)
            }
        }
    }
}

/// Never calls out; always answers with the interpolated path.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLineRouteProvider;

#[async_trait]
impl RouteProvider for StraightLineRouteProvider {
    async fn fetch_route(&self, origin: Coordinates, destination: Coordinates) -> Route {
        Route::fallback(origin, destination)
    }
}

/// OSRM-backed provider for `base_url`, or the offline provider when there
/// is none.
pub fn build_route_provider(
    base_url: Option<String>,
    profile: String,
    timeout: Duration,
) -> Result<Arc<dyn RouteProvider>> {
    match base_url {
        Some(base_url) => {
            tracing::info!(base_url = %base_url, profile = %profile, "Routing through OSRM");
            let client = OsrmClient::with_config(base_url, profile, timeout)?;
            Ok(Arc::new(OsrmRouteProvider::new(client)))
        }
        None => {
            tracing::info!("No routing service configured, using straight-line routes");
            Ok(Arc::new(StraightLineRouteProvider))
        }
    }
}
