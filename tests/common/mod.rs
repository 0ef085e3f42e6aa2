use async_trait::async_trait;
use axum::{http::StatusCode, http::Uri, response::IntoResponse, Router};
use refugeroute::map::{Marker, NativeMapControl, Region};
use refugeroute::models::{Coordinates, Route};
use refugeroute::services::navigation::{SessionHandle, SessionSnapshot};
use refugeroute::services::route_provider::RouteProvider;
use refugeroute::services::speech::{SpeechOptions, SpeechSink};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

/// What the stub routing service answers with
#[derive(Clone)]
#[allow(dead_code)]
pub enum StubReply {
    Json(serde_json::Value),
    Status(StatusCode),
    Text(&'static str),
}

#[allow(dead_code)]
pub struct StubOsrm {
    pub base_url: String,
    /// Path and query of every request received
    pub requests: Arc<Mutex<Vec<String>>>,
}

/// Start a local OSRM stand-in on an ephemeral port.
#[allow(dead_code)]
pub async fn spawn_stub_osrm(reply: StubReply) -> StubOsrm {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    let app = Router::new().fallback(move |uri: Uri| {
        let reply = reply.clone();
        let recorded = recorded.clone();
        async move {
            recorded.lock().unwrap().push(uri.to_string());
            match reply {
                StubReply::Json(body) => (StatusCode::OK, axum::Json(body)).into_response(),
                StubReply::Status(status) => (status, "upstream failure").into_response(),
                StubReply::Text(text) => (StatusCode::OK, text).into_response(),
            }
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub OSRM");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubOsrm {
        base_url: format!("http://{}/route/v1", addr),
        requests,
    }
}

/// A well-formed OSRM answer with the given `[lng, lat]` geometry
#[allow(dead_code)]
pub fn osrm_body(coordinates: &[[f64; 2]], distance_m: f64, duration_s: f64) -> serde_json::Value {
    serde_json::json!({
        "code": "Ok",
        "routes": [{
            "geometry": {"type": "LineString", "coordinates": coordinates},
            "distance": distance_m,
            "duration": duration_s
        }],
        "waypoints": []
    })
}

/// Route provider that holds every fetch until a permit is released.
#[allow(dead_code)]
pub struct GatedRouteProvider {
    pub gate: Arc<Semaphore>,
}

#[allow(dead_code)]
impl GatedRouteProvider {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
        }
    }
}

#[async_trait]
impl RouteProvider for GatedRouteProvider {
    async fn fetch_route(&self, origin: Coordinates, destination: Coordinates) -> Route {
        self.gate.acquire().await.unwrap().forget();
        Route::fallback(origin, destination)
    }
}

/// Speech sink keeping a log of every call
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn spoken(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| *e != "<stop>")
            .cloned()
            .collect()
    }
}

impl SpeechSink for RecordingSink {
    fn speak(&mut self, text: &str, _options: &SpeechOptions) -> refugeroute::Result<()> {
        self.events.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn stop(&mut self) -> refugeroute::Result<()> {
        self.events.lock().unwrap().push("<stop>".to_string());
        Ok(())
    }
}

/// Native map control keeping a log of every call
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct RecordingControl {
    pub regions: Arc<Mutex<Vec<(Region, u32)>>>,
    pub markers: Arc<Mutex<Vec<Vec<Marker>>>>,
    pub routes: Arc<Mutex<Vec<Vec<Coordinates>>>>,
}

impl NativeMapControl for RecordingControl {
    fn animate_to_region(&mut self, region: Region, duration_ms: u32) {
        self.regions.lock().unwrap().push((region, duration_ms));
    }

    fn render_markers(&mut self, markers: &[Marker]) {
        self.markers.lock().unwrap().push(markers.to_vec());
    }

    fn render_route(&mut self, path: &[Coordinates]) {
        self.routes.lock().unwrap().push(path.to_vec());
    }
}

/// Poll the session until no route fetch is outstanding.
#[allow(dead_code)]
pub async fn wait_for_routes(handle: &SessionHandle) -> SessionSnapshot {
    for _ in 0..200 {
        let snapshot = handle.snapshot().await.unwrap();
        if snapshot.pending_route_fetches == 0 {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("route fetch never resolved");
}

/// Kilometers per degree of longitude at the latitude used in tests
#[allow(dead_code)]
pub fn km_per_lng_degree(lat: f64) -> f64 {
    6371.0 * lat.to_radians().cos() * std::f64::consts::PI / 180.0
}
