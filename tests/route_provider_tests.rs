use axum::http::StatusCode;
use refugeroute::models::{Coordinates, RouteSource};
use refugeroute::services::osrm::OsrmClient;
use refugeroute::services::route_provider::{
    build_route_provider, OsrmRouteProvider, RouteProvider,
};
use std::time::Duration;

mod common;

use common::{osrm_body, spawn_stub_osrm, StubReply};

fn capitole() -> Coordinates {
    Coordinates::new(43.6047, 1.4410).unwrap()
}

fn refuge() -> Coordinates {
    Coordinates::new(43.6047, 1.4500).unwrap()
}

fn provider_for(base_url: &str) -> OsrmRouteProvider {
    let client = OsrmClient::with_config(
        base_url.to_string(),
        "driving".to_string(),
        Duration::from_secs(2),
    )
    .unwrap();
    OsrmRouteProvider::new(client)
}

#[tokio::test]
async fn test_routed_path_swaps_axes() {
    let stub = spawn_stub_osrm(StubReply::Json(osrm_body(
        &[[1.4410, 43.6047], [1.4455, 43.6051], [1.4500, 43.6047]],
        812.4,
        95.2,
    )))
    .await;

    let route = provider_for(&stub.base_url)
        .fetch_route(capitole(), refuge())
        .await;

    assert_eq!(route.source, RouteSource::Routed);
    assert_eq!(route.path.len(), 3);
    assert_eq!(route.path[1], Coordinates::new(43.6051, 1.4455).unwrap());
    assert!((route.distance_km.unwrap() - 0.8124).abs() < 1e-9);
    assert_eq!(route.duration_minutes, Some(2));

    let requests = stub.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(
        requests[0].starts_with("/route/v1/driving/1.441,43.6047;1.45,43.6047?"),
        "unexpected request: {}",
        requests[0]
    );
    assert!(requests[0].contains("overview=full"));
    assert!(requests[0].contains("geometries=geojson"));
}

#[tokio::test]
async fn test_server_error_falls_back() {
    let stub = spawn_stub_osrm(StubReply::Status(StatusCode::INTERNAL_SERVER_ERROR)).await;

    let route = provider_for(&stub.base_url)
        .fetch_route(capitole(), refuge())
        .await;

    assert_eq!(route.source, RouteSource::Fallback);
    assert_eq!(route.path.len(), 21);
    assert_eq!(route.path[0], capitole());
    assert_eq!(route.path[20], refuge());
}

#[tokio::test]
async fn test_non_json_response_falls_back() {
    let stub = spawn_stub_osrm(StubReply::Text("<html>maintenance</html>")).await;

    let route = provider_for(&stub.base_url)
        .fetch_route(capitole(), refuge())
        .await;

    assert!(route.is_fallback());
    assert_eq!(route.distance_km, None);
}

#[tokio::test]
async fn test_no_route_falls_back() {
    let stub = spawn_stub_osrm(StubReply::Json(
        serde_json::json!({"code": "NoRoute", "routes": []}),
    ))
    .await;

    let route = provider_for(&stub.base_url)
        .fetch_route(capitole(), refuge())
        .await;

    assert!(route.is_fallback());
}

#[tokio::test]
async fn test_empty_geometry_falls_back() {
    let stub = spawn_stub_osrm(StubReply::Json(osrm_body(&[], 0.0, 0.0))).await;

    let route = provider_for(&stub.base_url)
        .fetch_route(capitole(), refuge())
        .await;

    assert!(route.is_fallback());
    assert_eq!(route.path.len(), 21);
}

#[tokio::test]
async fn test_offline_provider_never_calls_out() {
    let provider =
        build_route_provider(None, "driving".to_string(), Duration::from_secs(1)).unwrap();
    let route = provider.fetch_route(capitole(), refuge()).await;
    assert!(route.is_fallback());
}

#[tokio::test]
async fn test_fallback_is_deterministic() {
    let stub = spawn_stub_osrm(StubReply::Status(StatusCode::SERVICE_UNAVAILABLE)).await;
    let provider = provider_for(&stub.base_url);

    let first = provider.fetch_route(capitole(), refuge()).await;
    let second = provider.fetch_route(capitole(), refuge()).await;
    assert_eq!(first, second);
}
