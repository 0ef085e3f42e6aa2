use crate::constants::*;
use crate::services::guidance::{default_thresholds, ProximityThreshold};
use crate::services::speech::SpeechOptions;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// `None` runs offline: every route is the interpolated fallback
    pub osrm_base_url: Option<String>,
    pub osrm_profile: String,
    pub route_timeout_secs: u64,
    /// JSON catalog replacing the built-in refuges
    pub refuges_path: Option<String>,
    pub guidance: GuidanceConfig,
}

/// Voice guidance tuning handed to the navigation controller.
#[derive(Debug, Clone, PartialEq)]
pub struct GuidanceConfig {
    /// Proximity announcements, farthest first. The `arrival` one ends guidance.
    pub thresholds: Vec<ProximityThreshold>,

    /// Voice used for every announcement. Rate and pitch are the starting
    /// values of the user settings.
    pub speech: SpeechOptions,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            thresholds: default_thresholds(),
            speech: SpeechOptions::default(),
        }
    }
}

impl GuidanceConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let rate: f32 = env::var("SPEECH_RATE")
            .unwrap_or_else(|_| defaults.speech.rate.to_string())
            .parse()
            .map_err(|_| "Invalid SPEECH_RATE")?;

        if !(0.1..=2.0).contains(&rate) {
            return Err("SPEECH_RATE must be between 0.1 and 2.0".to_string());
        }

        let pitch: f32 = env::var("SPEECH_PITCH")
            .unwrap_or_else(|_| defaults.speech.pitch.to_string())
            .parse()
            .map_err(|_| "Invalid SPEECH_PITCH")?;

        if !(0.5..=2.0).contains(&pitch) {
            return Err("SPEECH_PITCH must be between 0.5 and 2.0".to_string());
        }

        Ok(Self {
            thresholds: defaults.thresholds,
            speech: SpeechOptions {
                language: env::var("SPEECH_LANGUAGE").unwrap_or(defaults.speech.language),
                pitch,
                rate,
            },
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let route_timeout_secs: u64 = env::var("ROUTE_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_ROUTE_TIMEOUT_SECONDS.to_string())
            .parse()
            .map_err(|_| "Invalid ROUTE_TIMEOUT_SECS")?;

        if route_timeout_secs == 0 {
            return Err("ROUTE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        // Set but empty means offline
        let osrm_base_url = match env::var("OSRM_BASE_URL") {
            Ok(url) if url.trim().is_empty() => None,
            Ok(url) => Some(url),
            Err(_) => Some(DEFAULT_OSRM_BASE_URL.to_string()),
        };

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            osrm_base_url,
            osrm_profile: env::var("OSRM_PROFILE")
                .unwrap_or_else(|_| DEFAULT_OSRM_PROFILE.to_string()),
            route_timeout_secs,
            refuges_path: env::var("REFUGES_PATH").ok().filter(|p| !p.is_empty()),
            guidance: GuidanceConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn route_timeout(&self) -> Duration {
        Duration::from_secs(self.route_timeout_secs)
    }
}
