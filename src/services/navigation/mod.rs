//! Navigation session controller.
//!
//! [`NavigationController`] owns the [`NavigationSession`] and is the only
//! thing that mutates it. Every operation is synchronous; the one slow step,
//! fetching a route, is split in two: [`NavigationController::start_navigation`]
//! hands out a [`RouteTicket`] and [`NavigationController::apply_route`] installs
//! the result later, unless the session moved on in between. The
//! [`runner`] module drives a controller from a tokio task.

pub mod runner;
pub mod session;

pub use runner::{spawn_session, SessionCommand, SessionHandle, SessionServices};
pub use session::{NavigationSession, SessionSnapshot};

use crate::config::GuidanceConfig;
use crate::constants::{
    CURRENT_LOCATION_COLOR, CURRENT_LOCATION_MARKER_ID, NAVIGATION_FOCUS_SPAN_DEG,
    REFUGE_FOCUS_SPAN_DEG, REFUGE_MARKER_COLOR, TARGET_REFUGE_MARKER_COLOR, USER_FOCUS_SPAN_DEG,
};
use crate::error::{AppError, LocationError, Result};
use crate::map::{MapEvent, MapInput, MapView, Marker};
use crate::models::{
    Coordinates, LocationSample, MapSettings, RefugeDistance, RefugeZone, Route, SettingsUpdate,
};
use crate::services::guidance::{Announcement, VoiceGuidance};
use crate::services::location::LocationStatus;
use crate::services::registry::RefugeRegistry;
use crate::services::speech::{SpeechOptions, SpeechSink};
use std::sync::Arc;

/// Identifies the navigation a route fetch was started for.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTicket {
    pub epoch: u64,
    pub target_id: String,
    pub origin: Coordinates,
    pub destination: Coordinates,
}

pub struct NavigationController {
    registry: Arc<RefugeRegistry>,
    map: Box<dyn MapView>,
    speech: Box<dyn SpeechSink>,
    settings: MapSettings,
    language: String,
    session: NavigationSession,
    /// Fetches started by a target change, collected by the runner
    route_requests: Vec<RouteTicket>,
}

impl NavigationController {
    pub fn new(
        registry: Arc<RefugeRegistry>,
        map: Box<dyn MapView>,
        speech: Box<dyn SpeechSink>,
        settings: MapSettings,
        guidance: GuidanceConfig,
    ) -> Self {
        tracing::info!(
            refuges = registry.len(),
            map = map.backend(),
            "Navigation session created"
        );
        NavigationController {
            registry,
            map,
            speech,
            settings,
            language: guidance.speech.language,
            session: NavigationSession::new(VoiceGuidance::new(guidance.thresholds)),
            route_requests: Vec::new(),
        }
    }

    pub fn session(&self) -> &NavigationSession {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    pub fn registry(&self) -> &RefugeRegistry {
        &self.registry
    }

    /// Every refuge by distance from the user. Empty until the first fix.
    pub fn sorted_refuges(&self) -> Vec<RefugeDistance> {
        match self.session.current_location {
            Some(sample) => self.registry.sorted_by_distance(&sample.coordinates),
            None => Vec::new(),
        }
    }

    // --- Location ---

    /// Nearest refuge first, then guidance, then markers. While following
    /// the nearest refuge, a new nearest one gets a new route.
    pub fn on_location_update(&mut self, sample: LocationSample) {
        let first_fix = self.session.current_location.is_none();
        let position = sample.coordinates;
        let previous_target = self.effective_target_id();

        self.session.current_location = Some(sample);
        self.session.location_status = LocationStatus::Available;
        self.session.nearest_refuge = Some(self.registry.nearest(&position).clone());
        self.reroute_if_retargeted(previous_target);

        if self.session.is_navigating && self.session.voice_guidance_active() {
            if let Some(distance_km) = self.session.distance_to_target_km() {
                let update = self.session.guidance.evaluate(distance_km);
                if update.arrived {
                    self.silence();
                }
                for announcement in &update.announcements {
                    self.say(announcement);
                }
            }
        }

        self.refresh_markers();

        if first_fix {
            tracing::info!(lat = position.lat, lng = position.lng, "First location fix");
            self.map.focus(position, USER_FOCUS_SPAN_DEG);
        }
    }

    pub fn on_location_error(&mut self, error: &LocationError) {
        tracing::warn!(error = %error, "Location provider failed");
        self.session.location_status = LocationStatus::from(error);
    }

    // --- Target selection ---

    /// `None` goes back to following the nearest refuge.
    pub fn select_refuge(&mut self, zone: Option<RefugeZone>) {
        tracing::debug!(
            refuge_id = zone.as_ref().map(|z| z.id.as_str()),
            "Target refuge selected"
        );
        let previous_target = self.effective_target_id();
        self.session.target_refuge = zone;
        self.reroute_if_retargeted(previous_target);
        self.refresh_markers();
    }

    pub fn select_refuge_by_id(&mut self, refuge_id: Option<&str>) -> Result<()> {
        let zone = match refuge_id {
            Some(id) => Some(
                self.registry
                    .get(id)
                    .cloned()
                    .ok_or_else(|| AppError::NotFound(format!("Refuge '{}' not found", id)))?,
            ),
            None => None,
        };
        self.select_refuge(zone);
        Ok(())
    }

    /// Marker press or list pick. Picking the nearest refuge clears the
    /// explicit choice. Returns false for ids that are not refuges.
    pub fn focus_refuge(&mut self, refuge_id: &str) -> bool {
        let Some(zone) = self.registry.get(refuge_id).cloned() else {
            tracing::debug!(refuge_id, "Ignoring press on unknown marker");
            return false;
        };

        let is_nearest = self
            .session
            .nearest_refuge
            .as_ref()
            .is_some_and(|nearest| nearest.id == zone.id);
        let center = zone.coordinates;

        self.select_refuge(if is_nearest { None } else { Some(zone) });
        self.map.focus(center, REFUGE_FOCUS_SPAN_DEG);
        true
    }

    /// Close the refuge card: back to the nearest refuge and stop navigating.
    pub fn close_selected_refuge(&mut self) {
        self.session.target_refuge = None;
        self.stop_navigation();
    }

    // --- Navigation ---

    /// Start (or restart) navigation to the effective target. Needs a fix
    /// and a target; returns the ticket the route fetch must come back with.
    pub fn start_navigation(&mut self) -> Option<RouteTicket> {
        let Some(sample) = self.session.current_location else {
            tracing::debug!("Cannot navigate without a location fix");
            return None;
        };
        let Some(target) = self.session.effective_target().cloned() else {
            tracing::debug!("Cannot navigate without a target refuge");
            return None;
        };

        if self.session.is_navigating {
            tracing::info!("Restarting navigation");
        }

        self.session.epoch += 1;
        self.session.is_navigating = true;
        self.session.route = None;
        self.session.pending_fetches += 1;
        self.map.set_route(&[]);

        if self.settings.voice_guidance_enabled {
            self.silence();
            let announcement = self.session.guidance.start(&target.name);
            self.say(&announcement);
        } else {
            self.session.guidance.reset();
        }

        if self.settings.auto_zoom_navigation {
            self.map.focus(target.coordinates, NAVIGATION_FOCUS_SPAN_DEG);
        } else {
            self.map.center_to(target.coordinates);
        }
        self.refresh_markers();

        tracing::info!(
            refuge_id = %target.id,
            refuge = %target.name,
            epoch = self.session.epoch,
            "Navigation started"
        );

        Some(RouteTicket {
            epoch: self.session.epoch,
            target_id: target.id,
            origin: sample.coordinates,
            destination: target.coordinates,
        })
    }

    /// Install a fetched route. Returns false, leaving the session untouched,
    /// when the ticket no longer matches the navigation in progress.
    pub fn apply_route(&mut self, ticket: &RouteTicket, route: Route) -> bool {
        self.session.pending_fetches = self.session.pending_fetches.saturating_sub(1);

        let same_target = self
            .session
            .effective_target()
            .is_some_and(|target| target.id == ticket.target_id);
        if !self.session.is_navigating || ticket.epoch != self.session.epoch || !same_target {
            tracing::debug!(
                ticket_epoch = ticket.epoch,
                epoch = self.session.epoch,
                refuge_id = %ticket.target_id,
                "Discarding stale route"
            );
            return false;
        }

        let route = if route.path.is_empty() {
            Route::fallback(ticket.origin, ticket.destination)
        } else {
            route
        };

        if !route.is_fallback() && self.session.voice_guidance_active() {
            if let (Some(distance_km), Some(minutes)) = (route.distance_km, route.duration_minutes)
            {
                self.say(&Announcement::route_found(distance_km, minutes));
            }
        }

        if self.settings.route_visualization_enabled {
            self.map.set_route(&route.path);
        }

        tracing::info!(
            source = %route.source,
            points = route.path.len(),
            "Route installed"
        );
        self.session.route = Some(route);
        true
    }

    pub fn stop_navigation(&mut self) {
        let was_navigating = self.session.is_navigating;

        self.session.epoch += 1;
        self.session.is_navigating = false;
        self.session.route = None;
        self.session.guidance.reset();
        self.silence();
        self.map.set_route(&[]);
        self.refresh_markers();

        if was_navigating {
            tracing::info!(epoch = self.session.epoch, "Navigation stopped");
        }
    }

    /// Returns whether guidance is on afterwards. Turning it on needs an
    /// active navigation.
    pub fn toggle_voice_guidance(&mut self) -> bool {
        if self.session.voice_guidance_active() {
            self.session.guidance.deactivate();
            self.silence();
            tracing::info!("Voice guidance off");
            return false;
        }

        if !self.session.is_navigating {
            tracing::debug!("Voice guidance needs an active navigation");
            return false;
        }

        match self.session.effective_target().cloned() {
            Some(target) => {
                let announcement = self.session.guidance.resume(&target.name);
                self.say(&announcement);
                tracing::info!(refuge = %target.name, "Voice guidance on");
                true
            }
            None => false,
        }
    }

    // --- Map controls ---

    pub fn zoom_in(&mut self) {
        self.map.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.map.zoom_out();
    }

    pub fn center_on_user(&mut self) -> bool {
        match self.session.current_location {
            Some(sample) => {
                self.map.focus(sample.coordinates, USER_FOCUS_SPAN_DEG);
                true
            }
            None => false,
        }
    }

    pub fn on_map_input(&mut self, input: MapInput) {
        match self.map.handle_input(input) {
            Some(MapEvent::MarkerPressed(id)) => {
                self.focus_refuge(&id);
            }
            Some(MapEvent::RegionChanged(center)) => {
                self.session.view_center = Some(center);
            }
            None => {}
        }
    }

    // --- Settings ---

    pub fn update_settings(&mut self, update: SettingsUpdate) -> Result<MapSettings> {
        update.validate().map_err(AppError::InvalidRequest)?;
        self.settings.apply(update);

        if !self.settings.voice_guidance_enabled && self.session.voice_guidance_active() {
            self.session.guidance.deactivate();
            self.silence();
        }

        if self.settings.route_visualization_enabled {
            let path = self.session.route_path().to_vec();
            if !path.is_empty() {
                self.map.set_route(&path);
            }
        } else {
            self.map.set_route(&[]);
        }

        self.refresh_markers();
        tracing::debug!(settings = ?self.settings, "Settings updated");
        Ok(self.settings.clone())
    }

    /// Route fetches queued since the last call. Each ticket already counts
    /// as pending and must come back through [`Self::apply_route`].
    pub fn take_route_requests(&mut self) -> Vec<RouteTicket> {
        std::mem::take(&mut self.route_requests)
    }

    // --- Internals ---

    fn effective_target_id(&self) -> Option<String> {
        self.session.effective_target().map(|t| t.id.clone())
    }

    /// Navigation follows the effective target: when it changed, drop the
    /// route in place and queue a fetch for the new one.
    fn reroute_if_retargeted(&mut self, previous_target: Option<String>) {
        if !self.session.is_navigating {
            return;
        }
        let Some(sample) = self.session.current_location else {
            return;
        };
        let Some(target) = self.session.effective_target().cloned() else {
            return;
        };
        if previous_target.as_deref() == Some(target.id.as_str()) {
            return;
        }

        self.session.epoch += 1;
        self.session.route = None;
        self.session.pending_fetches += 1;
        self.session.guidance.retarget();
        self.map.set_route(&[]);

        tracing::info!(
            refuge_id = %target.id,
            epoch = self.session.epoch,
            "Target changed during navigation, fetching a new route"
        );

        self.route_requests.push(RouteTicket {
            epoch: self.session.epoch,
            target_id: target.id,
            origin: sample.coordinates,
            destination: target.coordinates,
        });
    }

    fn speech_options(&self) -> SpeechOptions {
        SpeechOptions {
            language: self.language.clone(),
            pitch: self.settings.voice_pitch,
            rate: self.settings.voice_speech_rate,
        }
    }

    fn say(&mut self, announcement: &Announcement) {
        let options = self.speech_options();
        tracing::debug!(kind = ?announcement.kind, text = %announcement.text, "Announcing");
        if let Err(e) = self.speech.speak(&announcement.text, &options) {
            tracing::warn!(error = %e, "Speech output failed");
        }
    }

    fn silence(&mut self) {
        if let Err(e) = self.speech.stop() {
            tracing::warn!(error = %e, "Failed to stop speech output");
        }
    }

    fn markers(&self) -> Vec<Marker> {
        let mut markers = Vec::new();
        let location = self.session.current_location.map(|s| s.coordinates);

        if let Some(position) = location {
            markers.push(
                Marker::new(CURRENT_LOCATION_MARKER_ID, position, CURRENT_LOCATION_COLOR)
                    .with_title("Ma position"),
            );
        }

        let target_id = self.session.effective_target().map(|t| t.id.clone());
        for zone in self.registry.iter() {
            let is_target = target_id.as_deref() == Some(zone.id.as_str());
            // Hidden refuges still show the one being navigated to
            if !self.settings.show_refuge_markers && !(is_target && self.session.is_navigating) {
                continue;
            }

            let color = if is_target {
                TARGET_REFUGE_MARKER_COLOR
            } else {
                REFUGE_MARKER_COLOR
            };
            let mut marker = Marker::new(zone.id.clone(), zone.coordinates, color)
                .with_title(zone.name.clone());
            if let Some(position) = location {
                marker = marker.with_subtitle(
                    self.settings
                        .distance_unit
                        .format(zone.distance_from(&position)),
                );
            }
            markers.push(marker);
        }

        markers
    }

    fn refresh_markers(&mut self) {
        let markers = self.markers();
        self.map.set_markers(&markers);
    }
}
