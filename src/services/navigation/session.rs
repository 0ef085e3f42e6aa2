use crate::models::{Coordinates, LocationSample, RefugeZone, Route, RouteSource};
use crate::services::guidance::{GuidanceState, VoiceGuidance};
use crate::services::location::LocationStatus;
use serde::Serialize;

/// Mutable state of one map-screen session.
///
/// Only [`NavigationController`](super::NavigationController) mutates it.
#[derive(Debug, Clone)]
pub struct NavigationSession {
    pub current_location: Option<LocationSample>,
    pub location_status: LocationStatus,
    /// Explicit choice; `None` follows the nearest refuge
    pub target_refuge: Option<RefugeZone>,
    pub nearest_refuge: Option<RefugeZone>,
    pub route: Option<Route>,
    pub is_navigating: bool,
    pub guidance: VoiceGuidance,
    /// Last center the user panned to
    pub view_center: Option<Coordinates>,
    /// Bumped on every start and stop; route results from older epochs are stale
    pub(crate) epoch: u64,
    pub(crate) pending_fetches: usize,
}

impl NavigationSession {
    pub fn new(guidance: VoiceGuidance) -> Self {
        NavigationSession {
            current_location: None,
            location_status: LocationStatus::Locating,
            target_refuge: None,
            nearest_refuge: None,
            route: None,
            is_navigating: false,
            guidance,
            view_center: None,
            epoch: 0,
            pending_fetches: 0,
        }
    }

    /// Explicit selection, else the nearest refuge.
    pub fn effective_target(&self) -> Option<&RefugeZone> {
        self.target_refuge.as_ref().or(self.nearest_refuge.as_ref())
    }

    pub fn voice_guidance_active(&self) -> bool {
        self.guidance.is_active()
    }

    pub fn last_announced_distance_km(&self) -> Option<f64> {
        self.guidance.last_distance_km()
    }

    pub fn route_path(&self) -> &[Coordinates] {
        self.route.as_ref().map(|r| r.path.as_slice()).unwrap_or(&[])
    }

    pub fn distance_to_target_km(&self) -> Option<f64> {
        let location = self.current_location?;
        let target = self.effective_target()?;
        Some(target.distance_from(&location.coordinates))
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_location: self.current_location,
            location_status: self.location_status,
            target_refuge: self.target_refuge.clone(),
            nearest_refuge: self.nearest_refuge.clone(),
            effective_target: self.effective_target().cloned(),
            distance_to_target_km: self.distance_to_target_km(),
            route: self.route_path().to_vec(),
            route_source: self.route.as_ref().map(|r| r.source),
            route_distance_km: self.route.as_ref().and_then(|r| r.distance_km),
            route_duration_minutes: self.route.as_ref().and_then(|r| r.duration_minutes),
            is_navigating: self.is_navigating,
            voice_guidance_active: self.voice_guidance_active(),
            guidance_state: self.guidance.state(),
            last_announced_distance_km: self.last_announced_distance_km(),
            pending_route_fetches: self.pending_fetches,
            view_center: self.view_center,
        }
    }
}

/// Read-only view of the session for the UI.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionSnapshot {
    pub current_location: Option<LocationSample>,
    pub location_status: LocationStatus,
    pub target_refuge: Option<RefugeZone>,
    pub nearest_refuge: Option<RefugeZone>,
    pub effective_target: Option<RefugeZone>,
    pub distance_to_target_km: Option<f64>,
    pub route: Vec<Coordinates>,
    pub route_source: Option<RouteSource>,
    pub route_distance_km: Option<f64>,
    pub route_duration_minutes: Option<u32>,
    pub is_navigating: bool,
    pub voice_guidance_active: bool,
    pub guidance_state: GuidanceState,
    pub last_announced_distance_km: Option<f64>,
    pub pending_route_fetches: usize,
    pub view_center: Option<Coordinates>,
}
