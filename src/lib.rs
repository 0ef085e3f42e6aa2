// Library exports for testing and reusability

pub mod config;
pub mod constants;
pub mod error;
pub mod ffi;
pub mod map;
pub mod mobile;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use config::GuidanceConfig;
use map::{select_map_view, WebMapOutbox};
use models::MapSettings;
use services::navigation::{spawn_session, NavigationController, SessionHandle, SessionServices};
use services::registry::RefugeRegistry;
use services::route_provider::RouteProvider;
use services::speech::SpeechQueue;
use std::sync::Arc;

// App state for sharing across the application
pub struct AppState {
    pub registry: Arc<RefugeRegistry>,
    pub session: SessionHandle,
    /// Utterances for the host shell to voice
    pub speech: SpeechQueue,
    /// Commands for the embedded web map
    pub map_outbox: WebMapOutbox,
}

impl AppState {
    /// Start a session whose speech and map output are queued for the host
    /// shell to collect. Must run inside a tokio runtime.
    pub fn start(
        registry: Arc<RefugeRegistry>,
        routes: Arc<dyn RouteProvider>,
        guidance: GuidanceConfig,
    ) -> Self {
        let speech = SpeechQueue::new();
        let map_outbox = WebMapOutbox::new();

        let settings = MapSettings {
            voice_speech_rate: guidance.speech.rate,
            voice_pitch: guidance.speech.pitch,
            ..MapSettings::default()
        };

        let controller = NavigationController::new(
            registry.clone(),
            select_map_view(None, map_outbox.clone()),
            Box::new(speech.clone()),
            settings,
            guidance,
        );

        let session = spawn_session(
            controller,
            SessionServices {
                routes,
                location: None,
            },
        );

        AppState {
            registry,
            session,
            speech,
            map_outbox,
        }
    }
}
