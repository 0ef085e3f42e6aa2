//! Stable application-wide constants.
//!
//! Values here are protocol details, geometric invariants and default
//! fallbacks for env-var-based configuration. Anything the user can change at
//! runtime lives in [`MapSettings`](crate::models::MapSettings) instead.

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- Routing service ---

/// Public OSRM demo instance. Overridden by `OSRM_BASE_URL`.
pub const DEFAULT_OSRM_BASE_URL: &str = "https://router.project-osrm.org/route/v1";
/// Routing profile appended to the base URL. Overridden by `OSRM_PROFILE`.
pub const DEFAULT_OSRM_PROFILE: &str = "driving";
/// Request timeout for a single route fetch. Overridden by `ROUTE_TIMEOUT_SECS`.
pub const DEFAULT_ROUTE_TIMEOUT_SECONDS: u64 = 10;

/// Number of segments in the interpolated fallback route (21 points).
pub const FALLBACK_ROUTE_SEGMENTS: usize = 20;

// --- Geodesy ---

/// Mean Earth radius used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// --- Speech defaults ---

pub const DEFAULT_SPEECH_LANGUAGE: &str = "fr-FR";
pub const DEFAULT_SPEECH_PITCH: f32 = 1.0;
pub const DEFAULT_SPEECH_RATE: f32 = 0.9;

// --- Map view spans (degrees of latitude visible) ---

/// Span used when focusing the user's own position.
pub const USER_FOCUS_SPAN_DEG: f64 = 0.05;
/// Span used when a refuge is picked from the map or the list.
pub const REFUGE_FOCUS_SPAN_DEG: f64 = 0.02;
/// Span used when navigation starts (tighter than a plain pick).
pub const NAVIGATION_FOCUS_SPAN_DEG: f64 = 0.01;

// --- Native map control (region deltas) ---

/// Region shown before the first location fix (Toulouse, Capitole).
pub const DEFAULT_MAP_CENTER_LAT: f64 = 43.6047;
pub const DEFAULT_MAP_CENTER_LNG: f64 = 1.4410;
pub const NATIVE_INITIAL_SPAN_DEG: f64 = 0.1;

pub const NATIVE_ZOOM_STEP_DEG: f64 = 0.01;
pub const NATIVE_MIN_SPAN_DEG: f64 = 0.005;
pub const NATIVE_MAX_SPAN_DEG: f64 = 0.5;
pub const NATIVE_ZOOM_ANIMATION_MS: u32 = 300;
pub const NATIVE_RECENTER_ANIMATION_MS: u32 = 500;
pub const NATIVE_FOCUS_ANIMATION_MS: u32 = 1000;

// --- Embedded web map (tile zoom levels) ---

pub const WEB_DEFAULT_ZOOM: u8 = 15;
pub const WEB_MIN_ZOOM: u8 = 3;
pub const WEB_MAX_ZOOM: u8 = 19;

/// Two centers closer than this (degrees) are considered the same view.
/// Used to recognise the echo of a programmatic move.
pub const VIEW_ECHO_TOLERANCE_DEG: f64 = 1e-6;
/// Programmatic moves remembered while waiting for their echo.
pub const VIEW_ECHO_QUEUE_LEN: usize = 4;

// --- Host queues ---

/// Utterances kept for the shell; older ones are dropped first.
pub const SPEECH_QUEUE_CAPACITY: usize = 16;

// --- Markers ---

pub const CURRENT_LOCATION_MARKER_ID: &str = "current-location";
pub const CURRENT_LOCATION_COLOR: &str = "#2563EB";
pub const REFUGE_MARKER_COLOR: &str = "#00C851";
pub const TARGET_REFUGE_MARKER_COLOR: &str = "#F59E0B";
