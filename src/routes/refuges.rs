use crate::error::{AppError, Result};
use crate::models::{Coordinates, RefugeDistance, RefugeZone};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

/// Optional reference point for distance queries
#[derive(Debug, Deserialize)]
pub struct PointQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl PointQuery {
    /// `None` when no point was given. Half a point is an error.
    pub fn point(&self) -> Result<Option<Coordinates>> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Coordinates::new(lat, lng)
                .map(Some)
                .map_err(AppError::InvalidRequest),
            (None, None) => Ok(None),
            _ => Err(AppError::InvalidRequest(
                "lat and lng must be given together".to_string(),
            )),
        }
    }
}

/// GET /refuges?lat&lng
/// Catalog sorted by distance from the point, or in catalog order without one
pub async fn list_refuges(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PointQuery>,
) -> Result<Json<Vec<RefugeDistance>>> {
    let refuges = match query.point()? {
        Some(point) => state.registry.sorted_by_distance(&point),
        None => state
            .registry
            .iter()
            .map(|zone| RefugeDistance {
                zone: zone.clone(),
                distance_km: 0.0,
            })
            .collect(),
    };

    Ok(Json(refuges))
}

/// GET /refuges/nearest?lat&lng
pub async fn nearest_refuge(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PointQuery>,
) -> Result<Json<RefugeDistance>> {
    let point = query
        .point()?
        .ok_or_else(|| AppError::InvalidRequest("lat and lng are required".to_string()))?;

    let zone = state.registry.nearest(&point);
    tracing::debug!(refuge_id = %zone.id, "Nearest refuge to ({}, {})", point.lat, point.lng);

    Ok(Json(RefugeDistance {
        zone: zone.clone(),
        distance_km: zone.distance_from(&point),
    }))
}

/// GET /refuges/{id}
pub async fn get_refuge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RefugeZone>> {
    state
        .registry
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Refuge '{}' not found", id)))
}
