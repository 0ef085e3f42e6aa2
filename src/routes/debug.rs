use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /debug/health - Check that the session loop is alive
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut status = json!({
        "status": "ok",
        "refuges": state.registry.len(),
        "checks": {}
    });

    match state.session.snapshot().await {
        Ok(snapshot) => {
            status["checks"]["session"] = json!("ok");
            status["checks"]["location_status"] = json!(snapshot.location_status);
        }
        Err(e) => {
            status["checks"]["session"] = json!({"error": e.to_string()});
            status["status"] = json!("error");
        }
    }

    Json(status)
}
