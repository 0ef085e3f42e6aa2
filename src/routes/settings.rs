use crate::error::Result;
use crate::models::{MapSettings, SettingsUpdate};
use crate::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// GET /settings
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Result<Json<MapSettings>> {
    Ok(Json(state.session.settings().await?))
}

/// PATCH /settings
/// Only the fields present in the body change
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<MapSettings>> {
    let settings = state.session.update_settings(update).await?;
    tracing::info!("Settings updated");
    Ok(Json(settings))
}
