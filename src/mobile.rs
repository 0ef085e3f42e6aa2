use crate::config::GuidanceConfig;
use crate::constants::{DEFAULT_OSRM_PROFILE, DEFAULT_ROUTE_TIMEOUT_SECONDS};
use crate::services::registry::RefugeRegistry;
use crate::services::route_provider::build_route_provider;
use crate::AppState;

use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct ServerConfig {
    /// 0 picks a free port
    pub port: u16,
    /// `None` routes offline with straight lines
    pub osrm_base_url: Option<String>,
    pub refuges_path: Option<String>,
}

pub struct ServerHandle {
    pub port: u16,
    pub shutdown_tx: oneshot::Sender<()>,
}

/// Serve the session API on loopback for the mobile shell.
pub async fn start_server(
    config: ServerConfig,
) -> Result<ServerHandle, Box<dyn std::error::Error + Send + Sync>> {
    let registry = match config.refuges_path {
        Some(ref path) => RefugeRegistry::from_path(path)?,
        None => RefugeRegistry::toulouse(),
    };

    let routes = build_route_provider(
        config.osrm_base_url,
        DEFAULT_OSRM_PROFILE.to_string(),
        Duration::from_secs(DEFAULT_ROUTE_TIMEOUT_SECONDS),
    )?;

    let state = Arc::new(AppState::start(
        Arc::new(registry),
        routes,
        GuidanceConfig::default(),
    ));

    let app = Router::new()
        .nest("/api/v1", crate::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Bind listener
    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    // Graceful shutdown channel
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    tracing::info!(port = actual_port, "Mobile server listening");

    Ok(ServerHandle {
        port: actual_port,
        shutdown_tx,
    })
}
