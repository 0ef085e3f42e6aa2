use crate::error::{AppError, LocationError, Result};
use crate::map::web::parse_inbound;
use crate::map::WebMapMessage;
use crate::models::{Coordinates, LocationSample};
use crate::services::navigation::SessionSnapshot;
use crate::services::speech::Utterance;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct LocationBody {
    pub lat: f64,
    pub lng: f64,
    /// Meters; defaults to 10
    pub accuracy: Option<f64>,
}

impl LocationBody {
    pub fn to_sample(&self) -> Result<LocationSample> {
        let coordinates = Coordinates::new(self.lat, self.lng).map_err(AppError::InvalidRequest)?;
        LocationSample::new(
            coordinates,
            self.accuracy.unwrap_or(LocationSample::DEFAULT_ACCURACY_M),
        )
        .map_err(AppError::InvalidRequest)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationFailure {
    PermissionDenied,
    Unavailable,
}

#[derive(Debug, Deserialize)]
pub struct LocationErrorBody {
    pub reason: LocationFailure,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectBody {
    /// `null` follows the nearest refuge again
    pub refuge_id: Option<String>,
}

async fn snapshot(state: &AppState) -> Result<Json<SessionSnapshot>> {
    Ok(Json(state.session.snapshot().await?))
}

/// GET /session
pub async fn get_session(State(state): State<Arc<AppState>>) -> Result<Json<SessionSnapshot>> {
    snapshot(&state).await
}

/// POST /session/location
pub async fn post_location(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LocationBody>,
) -> Result<Json<SessionSnapshot>> {
    let sample = body.to_sample()?;
    state.session.location_update(sample)?;
    snapshot(&state).await
}

/// POST /session/location/error
pub async fn post_location_error(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LocationErrorBody>,
) -> Result<Json<SessionSnapshot>> {
    let error = match body.reason {
        LocationFailure::PermissionDenied => LocationError::PermissionDenied,
        LocationFailure::Unavailable => LocationError::Unavailable(
            body.message
                .unwrap_or_else(|| "Failed to get location".to_string()),
        ),
    };
    state.session.location_failed(error)?;
    snapshot(&state).await
}

/// POST /session/select
pub async fn select_refuge(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SelectBody>,
) -> Result<Json<SessionSnapshot>> {
    state.session.select_refuge(body.refuge_id).await?;
    snapshot(&state).await
}

/// POST /session/focus/{id}
/// Marker press or list pick; unknown ids leave the session as it was
pub async fn focus_refuge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>> {
    state.session.focus_refuge(id).await?;
    snapshot(&state).await
}

/// POST /session/navigate
pub async fn start_navigation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionSnapshot>> {
    let started = state.session.start_navigation().await?;
    if !started {
        tracing::debug!("Navigate request ignored: no location or target yet");
    }
    snapshot(&state).await
}

/// POST /session/stop
pub async fn stop_navigation(State(state): State<Arc<AppState>>) -> Result<Json<SessionSnapshot>> {
    state.session.stop_navigation()?;
    snapshot(&state).await
}

/// POST /session/close
pub async fn close_selected_refuge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionSnapshot>> {
    state.session.close_selected_refuge()?;
    snapshot(&state).await
}

/// POST /session/voice/toggle
pub async fn toggle_voice_guidance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionSnapshot>> {
    state.session.toggle_voice_guidance().await?;
    snapshot(&state).await
}

/// POST /session/map/zoom-in
pub async fn zoom_in(State(state): State<Arc<AppState>>) -> Result<Json<SessionSnapshot>> {
    state.session.zoom_in()?;
    snapshot(&state).await
}

/// POST /session/map/zoom-out
pub async fn zoom_out(State(state): State<Arc<AppState>>) -> Result<Json<SessionSnapshot>> {
    state.session.zoom_out()?;
    snapshot(&state).await
}

/// POST /session/map/center
pub async fn center_on_user(State(state): State<Arc<AppState>>) -> Result<Json<SessionSnapshot>> {
    state.session.center_on_user()?;
    snapshot(&state).await
}

/// POST /session/map/events
/// Raw message posted by the embedded web map
pub async fn map_event(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<SessionSnapshot>> {
    let input = parse_inbound(&body)?;
    state.session.map_input(input)?;
    snapshot(&state).await
}

/// GET /session/map/outbox
pub async fn drain_map_outbox(State(state): State<Arc<AppState>>) -> Json<Vec<WebMapMessage>> {
    Json(state.map_outbox.drain())
}

/// GET /session/speech
pub async fn drain_speech(State(state): State<Arc<AppState>>) -> Json<Vec<Utterance>> {
    Json(state.speech.drain())
}
