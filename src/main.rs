use axum::Router;
use refugeroute::config::Config;
use refugeroute::services::registry::RefugeRegistry;
use refugeroute::services::route_provider::build_route_provider;
use refugeroute::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refugeroute=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting RefugeRoute server");
    tracing::info!("Configuration loaded successfully");

    // Refuge catalog: file if configured, built-in otherwise
    let registry = match config.refuges_path {
        Some(ref path) => RefugeRegistry::from_path(path)?,
        None => {
            tracing::info!("Using built-in Toulouse refuge catalog");
            RefugeRegistry::toulouse()
        }
    };

    let routes = build_route_provider(
        config.osrm_base_url.clone(),
        config.osrm_profile.clone(),
        config.route_timeout(),
    )?;

    // Create application state (spawns the session loop)
    let state = Arc::new(AppState::start(
        Arc::new(registry),
        routes,
        config.guidance.clone(),
    ));

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", refugeroute::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
