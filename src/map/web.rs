use crate::constants::{WEB_DEFAULT_ZOOM, WEB_MAX_ZOOM, WEB_MIN_ZOOM};
use crate::error::{AppError, Result};
use crate::map::{MapEvent, MapInput, MapView, Marker, MoveSuppressor};
use crate::models::Coordinates;
use geojson::{Geometry, Value};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Command posted to the embedded web map.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebMapMessage {
    CenterTo { lat: f64, lng: f64 },
    ZoomIn,
    ZoomOut,
    SetView { lat: f64, lng: f64, zoom: u8 },
    SetMarkers { markers: Vec<Marker> },
    /// `None` clears the polyline
    SetRoute { route: Option<Geometry> },
}

impl WebMapMessage {
    /// Whether the message redraws a whole layer rather than moving the view.
    pub fn replaces_layer(&self) -> bool {
        matches!(
            self,
            WebMapMessage::SetMarkers { .. } | WebMapMessage::SetRoute { .. }
        )
    }
}

/// Message posted back by the embedded web map.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum InboundMessage {
    Moveend { latitude: f64, longitude: f64 },
    MarkerPress { id: String },
    Ready,
}

/// Parse a raw message from the web map.
pub fn parse_inbound(json: &str) -> Result<MapInput> {
    let message: InboundMessage = serde_json::from_str(json)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid map message: {}", e)))?;

    Ok(match message {
        InboundMessage::Moveend {
            latitude,
            longitude,
        } => MapInput::RegionChanged {
            center: Coordinates::new(latitude, longitude).map_err(AppError::InvalidRequest)?,
            span_deg: None,
        },
        InboundMessage::MarkerPress { id } => MapInput::MarkerPressed(id),
        InboundMessage::Ready => MapInput::Ready,
    })
}

/// Messages waiting for the web view to pick them up.
///
/// Cloning shares the queue.
#[derive(Debug, Clone, Default)]
pub struct WebMapOutbox {
    pending: Arc<Mutex<VecDeque<WebMapMessage>>>,
}

impl WebMapOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message. Marker sets and routes replace the whole layer, so a
    /// newer one supersedes any still waiting.
    fn push(&self, message: WebMapMessage) {
        tracing::debug!(?message, "Web map: post");
        let Ok(mut pending) = self.pending.lock() else {
            tracing::warn!("Web map outbox lock poisoned, message dropped");
            return;
        };
        if message.replaces_layer() {
            let kind = std::mem::discriminant(&message);
            pending.retain(|queued| std::mem::discriminant(queued) != kind);
        }
        pending.push_back(message);
    }

    /// Take every pending message, oldest first.
    pub fn drain(&self) -> Vec<WebMapMessage> {
        match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Tile zoom level showing about `span_deg` degrees.
fn zoom_for_span(span_deg: f64) -> u8 {
    if !span_deg.is_finite() || span_deg <= 0.0 {
        return WEB_MAX_ZOOM;
    }
    (360.0 / span_deg)
        .log2()
        .round()
        .clamp(WEB_MIN_ZOOM as f64, WEB_MAX_ZOOM as f64) as u8
}

fn line_string(path: &[Coordinates]) -> Geometry {
    Geometry::new(Value::LineString(
        path.iter().map(|c| vec![c.lng, c.lat]).collect(),
    ))
}

pub struct WebMapView {
    outbox: WebMapOutbox,
    zoom: u8,
    center: Option<Coordinates>,
    markers: Vec<Marker>,
    suppressor: MoveSuppressor,
}

impl WebMapView {
    pub fn new(outbox: WebMapOutbox) -> Self {
        WebMapView {
            outbox,
            zoom: WEB_DEFAULT_ZOOM,
            center: None,
            markers: Vec::new(),
            suppressor: MoveSuppressor::default(),
        }
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    fn step_zoom(&mut self, zoom: u8, message: WebMapMessage) {
        if zoom == self.zoom {
            return;
        }
        self.zoom = zoom;
        if let Some(center) = self.center {
            self.suppressor.expect(center);
        }
        self.outbox.push(message);
    }
}

impl MapView for WebMapView {
    fn center_to(&mut self, center: Coordinates) {
        self.center = Some(center);
        self.suppressor.expect(center);
        self.outbox.push(WebMapMessage::CenterTo {
            lat: center.lat,
            lng: center.lng,
        });
    }

    fn zoom_in(&mut self) {
        let zoom = (self.zoom + 1).min(WEB_MAX_ZOOM);
        self.step_zoom(zoom, WebMapMessage::ZoomIn);
    }

    fn zoom_out(&mut self) {
        let zoom = self.zoom.saturating_sub(1).max(WEB_MIN_ZOOM);
        self.step_zoom(zoom, WebMapMessage::ZoomOut);
    }

    fn focus(&mut self, center: Coordinates, span_deg: f64) {
        self.zoom = zoom_for_span(span_deg);
        self.center = Some(center);
        self.suppressor.expect(center);
        self.outbox.push(WebMapMessage::SetView {
            lat: center.lat,
            lng: center.lng,
            zoom: self.zoom,
        });
    }

    fn set_markers(&mut self, markers: &[Marker]) {
        self.markers = markers.to_vec();
        self.outbox.push(WebMapMessage::SetMarkers {
            markers: self.markers.clone(),
        });
    }

    fn set_route(&mut self, path: &[Coordinates]) {
        let route = if path.is_empty() {
            None
        } else {
            Some(line_string(path))
        };
        self.outbox.push(WebMapMessage::SetRoute { route });
    }

    fn handle_input(&mut self, input: MapInput) -> Option<MapEvent> {
        match input {
            MapInput::RegionChanged { center, .. } => {
                let echo = self.suppressor.is_echo(&center);
                self.center = Some(center);
                if echo {
                    None
                } else {
                    Some(MapEvent::RegionChanged(center))
                }
            }
            MapInput::MarkerPressed(id) => Some(MapEvent::MarkerPressed(id)),
            MapInput::Ready => {
                // A freshly loaded page has no markers yet
                self.outbox.push(WebMapMessage::SetMarkers {
                    markers: self.markers.clone(),
                });
                None
            }
        }
    }

    fn center(&self) -> Option<Coordinates> {
        self.center
    }

    fn backend(&self) -> &'static str {
        "web"
    }
}
