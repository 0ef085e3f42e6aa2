//! Spoken proximity guidance.
//!
//! [`VoiceGuidance`] watches the distance to the refuge being navigated to and
//! produces one announcement each time the distance crosses a threshold from
//! above. Crossing the arrival threshold ends guidance for the session.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GuidanceState {
    /// Guidance off
    Idle,
    /// Evaluating distance updates
    Active,
    /// Arrival threshold crossed; off until re-enabled
    Arrived,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProximityThreshold {
    pub distance_km: f64,
    pub message: String,
    /// Crossing this threshold ends guidance
    #[serde(default)]
    pub arrival: bool,
}

impl ProximityThreshold {
    pub fn new(distance_km: f64, message: &str) -> Self {
        ProximityThreshold {
            distance_km,
            message: message.to_string(),
            arrival: false,
        }
    }

    pub fn arrival(distance_km: f64, message: &str) -> Self {
        ProximityThreshold {
            distance_km,
            message: message.to_string(),
            arrival: true,
        }
    }
}

/// The default French threshold table, farthest first.
pub fn default_thresholds() -> Vec<ProximityThreshold> {
    vec![
        ProximityThreshold::new(0.5, "Vous êtes à 500 mètres du refuge"),
        ProximityThreshold::new(0.2, "Vous êtes à 200 mètres du refuge"),
        ProximityThreshold::new(
            0.1,
            "Vous êtes à 100 mètres du refuge. Vous êtes presque arrivé",
        ),
        ProximityThreshold::new(0.05, "Vous êtes à 50 mètres. Le refuge est juste devant vous"),
        ProximityThreshold::arrival(0.02, "Vous êtes arrivé au refuge. Vous êtes en sécurité"),
    ]
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementKind {
    NavigationStarted,
    GuidanceResumed,
    RouteFound,
    Proximity,
    Arrived,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Announcement {
    pub kind: AnnouncementKind,
    pub text: String,
}

impl Announcement {
    pub fn navigation_started(refuge_name: &str) -> Self {
        Announcement {
            kind: AnnouncementKind::NavigationStarted,
            text: format!("Démarrage de la navigation vers {}", refuge_name),
        }
    }

    pub fn guidance_resumed(refuge_name: &str) -> Self {
        Announcement {
            kind: AnnouncementKind::GuidanceResumed,
            text: format!("Guidage vocal activé. Direction {}", refuge_name),
        }
    }

    pub fn route_found(distance_km: f64, duration_minutes: u32) -> Self {
        Announcement {
            kind: AnnouncementKind::RouteFound,
            text: format!(
                "Itinéraire trouvé. Distance {:.1} kilomètres. Durée estimée {} minutes.",
                distance_km, duration_minutes
            ),
        }
    }
}

/// Result of feeding one distance sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuidanceUpdate {
    pub announcements: Vec<Announcement>,
    pub arrived: bool,
}

#[derive(Debug, Clone)]
pub struct VoiceGuidance {
    thresholds: Vec<ProximityThreshold>,
    state: GuidanceState,
    last_distance_km: Option<f64>,
}

impl VoiceGuidance {
    pub fn new(mut thresholds: Vec<ProximityThreshold>) -> Self {
        thresholds.sort_by(|a, b| b.distance_km.total_cmp(&a.distance_km));
        VoiceGuidance {
            thresholds,
            state: GuidanceState::Idle,
            last_distance_km: None,
        }
    }

    pub fn state(&self) -> GuidanceState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == GuidanceState::Active
    }

    /// Last evaluated distance; `None` until the first sample of a session.
    pub fn last_distance_km(&self) -> Option<f64> {
        self.last_distance_km
    }

    pub fn thresholds(&self) -> &[ProximityThreshold] {
        &self.thresholds
    }

    /// Enter `Active` for a fresh navigation. The next sample seeds tracking.
    pub fn start(&mut self, refuge_name: &str) -> Announcement {
        self.state = GuidanceState::Active;
        self.last_distance_km = None;
        Announcement::navigation_started(refuge_name)
    }

    /// Re-enter `Active` keeping the tracked distance, so no reseeding.
    pub fn resume(&mut self, refuge_name: &str) -> Announcement {
        self.state = GuidanceState::Active;
        Announcement::guidance_resumed(refuge_name)
    }

    /// Turn guidance off but keep distance tracking.
    pub fn deactivate(&mut self) {
        self.state = GuidanceState::Idle;
    }

    /// The target changed mid-session. Keeps the state; the next sample
    /// seeds tracking against the new target.
    pub fn retarget(&mut self) {
        self.last_distance_km = None;
    }

    /// Back to a blank session: off, and the next activation reseeds.
    pub fn reset(&mut self) {
        self.state = GuidanceState::Idle;
        self.last_distance_km = None;
    }

    /// Feed the latest distance to the target. Only evaluated while `Active`.
    pub fn evaluate(&mut self, current_km: f64) -> GuidanceUpdate {
        if self.state != GuidanceState::Active {
            return GuidanceUpdate::default();
        }

        let Some(last_km) = self.last_distance_km else {
            tracing::debug!(distance_km = current_km, "Guidance seeded");
            self.last_distance_km = Some(current_km);
            return GuidanceUpdate::default();
        };

        let mut update = GuidanceUpdate::default();
        for threshold in &self.thresholds {
            if last_km > threshold.distance_km && current_km <= threshold.distance_km {
                update.announcements.push(Announcement {
                    kind: if threshold.arrival {
                        AnnouncementKind::Arrived
                    } else {
                        AnnouncementKind::Proximity
                    },
                    text: threshold.message.clone(),
                });
                if threshold.arrival {
                    update.arrived = true;
                }
            }
        }

        if update.arrived {
            self.state = GuidanceState::Arrived;
            tracing::info!(distance_km = current_km, "Arrived at refuge, guidance off");
        }

        tracing::debug!(
            last_km,
            current_km,
            fired = update.announcements.len(),
            "Guidance evaluated"
        );
        self.last_distance_km = Some(current_km);
        update
    }
}

impl Default for VoiceGuidance {
    fn default() -> Self {
        Self::new(default_thresholds())
    }
}
