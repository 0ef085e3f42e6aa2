//! Map rendering backends.
//!
//! The session talks to a [`MapView`] only. Two backends implement it: a
//! native map control driven by animated regions and an embedded web map
//! driven by JSON messages. [`select_map_view`] picks one from what the
//! platform offers.

pub mod native;
pub mod web;

pub use native::{NativeMapControl, NativeMapView, Region};
pub use web::{WebMapMessage, WebMapOutbox, WebMapView};

use crate::constants::{VIEW_ECHO_QUEUE_LEN, VIEW_ECHO_TOLERANCE_DEG};
use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A pin on the map. Wire shape matches the embedded map's marker layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl Marker {
    pub fn new(id: impl Into<String>, coordinates: Coordinates, color: &str) -> Self {
        Marker {
            id: id.into(),
            latitude: coordinates.lat,
            longitude: coordinates.lng,
            color: Some(color.to_string()),
            icon_url: None,
            title: None,
            subtitle: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

/// Raw interaction reported by a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum MapInput {
    /// The visible region settled. `span_deg` is known only on backends that
    /// report region deltas.
    RegionChanged {
        center: Coordinates,
        span_deg: Option<f64>,
    },
    MarkerPressed(String),
    /// The backend finished loading and can take commands.
    Ready,
}

/// Interaction the session has to act on, after echo filtering.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    RegionChanged(Coordinates),
    MarkerPressed(String),
}

/// Common contract of both map backends. Holds view state only.
pub trait MapView: Send {
    /// Recenter keeping the current zoom.
    fn center_to(&mut self, center: Coordinates);

    fn zoom_in(&mut self);

    fn zoom_out(&mut self);

    /// Recenter and show roughly `span_deg` degrees of latitude.
    fn focus(&mut self, center: Coordinates, span_deg: f64);

    /// Replace the whole marker set.
    fn set_markers(&mut self, markers: &[Marker]);

    /// Draw the route polyline. An empty path removes it.
    fn set_route(&mut self, path: &[Coordinates]);

    /// Filter an interaction. Region changes caused by our own moves are
    /// swallowed.
    fn handle_input(&mut self, input: MapInput) -> Option<MapEvent>;

    /// Center currently shown, once known.
    fn center(&self) -> Option<Coordinates>;

    fn backend(&self) -> &'static str;
}

/// Remembers recent programmatic moves so their region-change echoes can be
/// told apart from user pans. Moves issued back to back each get one echo.
#[derive(Debug, Default)]
pub(crate) struct MoveSuppressor {
    pending: VecDeque<Coordinates>,
}

impl MoveSuppressor {
    pub(crate) fn expect(&mut self, center: Coordinates) {
        if self.pending.len() == VIEW_ECHO_QUEUE_LEN {
            self.pending.pop_front();
        }
        self.pending.push_back(center);
    }

    /// True once per expected move. Older moves whose echo never came are
    /// forgotten when a newer one answers.
    pub(crate) fn is_echo(&mut self, center: &Coordinates) -> bool {
        let matched = self
            .pending
            .iter()
            .position(|expected| expected.approx_eq(center, VIEW_ECHO_TOLERANCE_DEG));
        match matched {
            Some(index) => {
                self.pending.drain(..=index);
                true
            }
            None => false,
        }
    }
}

/// Native control when the platform has one, embedded web map otherwise.
pub fn select_map_view(
    native: Option<Box<dyn NativeMapControl>>,
    outbox: WebMapOutbox,
) -> Box<dyn MapView> {
    match native {
        Some(control) => {
            tracing::info!("Using native map control");
            Box::new(NativeMapView::new(control))
        }
        None => {
            tracing::info!("Native map unavailable, using embedded web map");
            Box::new(WebMapView::new(outbox))
        }
    }
}
