use crate::constants::{DEFAULT_SPEECH_PITCH, DEFAULT_SPEECH_RATE};
use crate::models::DistanceUnit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    #[default]
    Standard,
    Satellite,
    Hybrid,
}

/// User preferences for the map screen. Held in memory only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapSettings {
    pub voice_guidance_enabled: bool,
    pub show_refuge_markers: bool,
    pub show_danger_zone: bool,
    pub show_refuge_radius: bool,
    pub notifications_enabled: bool,
    pub distance_unit: DistanceUnit,
    pub voice_speech_rate: f32,
    pub voice_pitch: f32,
    pub map_type: MapType,
    pub auto_zoom_navigation: bool,
    pub haptic_feedback_enabled: bool,
    pub route_visualization_enabled: bool,
    pub arrival_notification_distance_m: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        MapSettings {
            voice_guidance_enabled: true,
            show_refuge_markers: true,
            show_danger_zone: true,
            show_refuge_radius: true,
            notifications_enabled: true,
            distance_unit: DistanceUnit::Km,
            voice_speech_rate: DEFAULT_SPEECH_RATE,
            voice_pitch: DEFAULT_SPEECH_PITCH,
            map_type: MapType::Standard,
            auto_zoom_navigation: true,
            haptic_feedback_enabled: true,
            route_visualization_enabled: true,
            arrival_notification_distance_m: 100.0,
        }
    }
}

/// Partial update: only the fields that are present get applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub voice_guidance_enabled: Option<bool>,
    pub show_refuge_markers: Option<bool>,
    pub show_danger_zone: Option<bool>,
    pub show_refuge_radius: Option<bool>,
    pub notifications_enabled: Option<bool>,
    pub distance_unit: Option<DistanceUnit>,
    pub voice_speech_rate: Option<f32>,
    pub voice_pitch: Option<f32>,
    pub map_type: Option<MapType>,
    pub auto_zoom_navigation: Option<bool>,
    pub haptic_feedback_enabled: Option<bool>,
    pub route_visualization_enabled: Option<bool>,
    pub arrival_notification_distance_m: Option<f64>,
}

impl SettingsUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(rate) = self.voice_speech_rate {
            if !(0.1..=2.0).contains(&rate) {
                return Err("voice_speech_rate must be between 0.1 and 2.0".to_string());
            }
        }
        if let Some(pitch) = self.voice_pitch {
            if !(0.5..=2.0).contains(&pitch) {
                return Err("voice_pitch must be between 0.5 and 2.0".to_string());
            }
        }
        if let Some(distance) = self.arrival_notification_distance_m {
            if !distance.is_finite() || distance <= 0.0 {
                return Err("arrival_notification_distance_m must be positive".to_string());
            }
        }
        Ok(())
    }
}

impl MapSettings {
    pub fn apply(&mut self, update: SettingsUpdate) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = update.$field {
                    self.$field = value;
                })*
            };
        }

        merge!(
            voice_guidance_enabled,
            show_refuge_markers,
            show_danger_zone,
            show_refuge_radius,
            notifications_enabled,
            distance_unit,
            voice_speech_rate,
            voice_pitch,
            map_type,
            auto_zoom_navigation,
            haptic_feedback_enabled,
            route_visualization_enabled,
            arrival_notification_distance_m,
        );
    }

    pub fn reset(&mut self) {
        *self = MapSettings::default();
    }
}
