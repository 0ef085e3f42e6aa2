use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures reported by the location provider.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("Permission to access location was denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Routing service error: {0}")]
    Routing(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid refuge registry: {0}")]
    InvalidRegistry(String),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error("Navigation session is closed")]
    SessionClosed,

    #[error("Internal error: {0}")]
    Internal(String),
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Routing(ref e) => {
                tracing::error!("Routing service error: {}", e);
                (StatusCode::BAD_GATEWAY, "Routing service error".to_string())
            }
            AppError::InvalidRequest(ref e) => (StatusCode::BAD_REQUEST, e.clone()),
            AppError::NotFound(ref e) => (StatusCode::NOT_FOUND, e.clone()),
            AppError::InvalidRegistry(ref e) => {
                tracing::error!("Invalid refuge registry: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Refuge registry unavailable".to_string(),
                )
            }
            AppError::Location(ref e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
            AppError::SessionClosed => {
                tracing::error!("Navigation session event loop has stopped");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Navigation session closed".to_string(),
                )
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
