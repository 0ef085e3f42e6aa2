use crate::constants::{
    DEFAULT_MAP_CENTER_LAT, DEFAULT_MAP_CENTER_LNG, NATIVE_FOCUS_ANIMATION_MS,
    NATIVE_INITIAL_SPAN_DEG, NATIVE_MAX_SPAN_DEG, NATIVE_MIN_SPAN_DEG,
    NATIVE_RECENTER_ANIMATION_MS, NATIVE_ZOOM_ANIMATION_MS, NATIVE_ZOOM_STEP_DEG,
};
use crate::map::{MapEvent, MapInput, MapView, Marker, MoveSuppressor};
use crate::models::Coordinates;
use serde::Serialize;

/// Visible area of a native map: center plus the degrees shown on each axis.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Region {
    pub center: Coordinates,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    pub fn new(center: Coordinates, span_deg: f64) -> Self {
        Region {
            center,
            latitude_delta: span_deg,
            longitude_delta: span_deg,
        }
    }

    fn zoomed(&self, step_deg: f64) -> Self {
        let clamp = |delta: f64| (delta + step_deg).clamp(NATIVE_MIN_SPAN_DEG, NATIVE_MAX_SPAN_DEG);
        Region {
            center: self.center,
            latitude_delta: clamp(self.latitude_delta),
            longitude_delta: clamp(self.longitude_delta),
        }
    }
}

/// The platform map widget. Implemented by the host shell.
pub trait NativeMapControl: Send {
    fn animate_to_region(&mut self, region: Region, duration_ms: u32);
    fn render_markers(&mut self, markers: &[Marker]);
    fn render_route(&mut self, path: &[Coordinates]);
}

pub struct NativeMapView {
    control: Box<dyn NativeMapControl>,
    region: Region,
    suppressor: MoveSuppressor,
}

impl NativeMapView {
    pub fn new(control: Box<dyn NativeMapControl>) -> Self {
        let center = Coordinates {
            lat: DEFAULT_MAP_CENTER_LAT,
            lng: DEFAULT_MAP_CENTER_LNG,
        };
        NativeMapView {
            control,
            region: Region::new(center, NATIVE_INITIAL_SPAN_DEG),
            suppressor: MoveSuppressor::default(),
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    fn animate(&mut self, region: Region, duration_ms: u32) {
        tracing::debug!(
            lat = region.center.lat,
            lng = region.center.lng,
            delta = region.latitude_delta,
            duration_ms,
            "Native map: animate to region"
        );
        self.region = region;
        self.suppressor.expect(region.center);
        self.control.animate_to_region(region, duration_ms);
    }

    fn zoom_by(&mut self, step_deg: f64) {
        let zoomed = self.region.zoomed(step_deg);
        if zoomed == self.region {
            return;
        }
        self.animate(zoomed, NATIVE_ZOOM_ANIMATION_MS);
    }
}

impl MapView for NativeMapView {
    fn center_to(&mut self, center: Coordinates) {
        let region = Region {
            center,
            ..self.region
        };
        self.animate(region, NATIVE_RECENTER_ANIMATION_MS);
    }

    fn zoom_in(&mut self) {
        self.zoom_by(-NATIVE_ZOOM_STEP_DEG);
    }

    fn zoom_out(&mut self) {
        self.zoom_by(NATIVE_ZOOM_STEP_DEG);
    }

    fn focus(&mut self, center: Coordinates, span_deg: f64) {
        let span = span_deg.clamp(NATIVE_MIN_SPAN_DEG, NATIVE_MAX_SPAN_DEG);
        self.animate(Region::new(center, span), NATIVE_FOCUS_ANIMATION_MS);
    }

    fn set_markers(&mut self, markers: &[Marker]) {
        self.control.render_markers(markers);
    }

    fn set_route(&mut self, path: &[Coordinates]) {
        self.control.render_route(path);
    }

    fn handle_input(&mut self, input: MapInput) -> Option<MapEvent> {
        match input {
            MapInput::RegionChanged { center, span_deg } => {
                let echo = self.suppressor.is_echo(&center);
                self.region.center = center;
                if let Some(span) = span_deg {
                    self.region.latitude_delta = span;
                    self.region.longitude_delta = span;
                }
                if echo {
                    None
                } else {
                    Some(MapEvent::RegionChanged(center))
                }
            }
            MapInput::MarkerPressed(id) => Some(MapEvent::MarkerPressed(id)),
            MapInput::Ready => None,
        }
    }

    fn center(&self) -> Option<Coordinates> {
        Some(self.region.center)
    }

    fn backend(&self) -> &'static str {
        "native"
    }
}
