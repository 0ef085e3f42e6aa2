pub mod debug;
pub mod refuges;
pub mod session;
pub mod settings;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/debug/health", get(debug::health_check))
        .route("/refuges", get(refuges::list_refuges))
        .route("/refuges/nearest", get(refuges::nearest_refuge))
        .route("/refuges/{id}", get(refuges::get_refuge))
        .route("/session", get(session::get_session))
        .route("/session/location", post(session::post_location))
        .route("/session/location/error", post(session::post_location_error))
        .route("/session/select", post(session::select_refuge))
        .route("/session/focus/{id}", post(session::focus_refuge))
        .route("/session/navigate", post(session::start_navigation))
        .route("/session/stop", post(session::stop_navigation))
        .route("/session/close", post(session::close_selected_refuge))
        .route("/session/voice/toggle", post(session::toggle_voice_guidance))
        .route("/session/map/zoom-in", post(session::zoom_in))
        .route("/session/map/zoom-out", post(session::zoom_out))
        .route("/session/map/center", post(session::center_on_user))
        .route("/session/map/events", post(session::map_event))
        .route("/session/map/outbox", get(session::drain_map_outbox))
        .route("/session/speech", get(session::drain_speech))
        .route(
            "/settings",
            get(settings::get_settings).patch(settings::update_settings),
        )
        .with_state(state)
}
