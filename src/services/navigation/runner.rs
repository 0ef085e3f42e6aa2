use crate::error::{AppError, LocationError, Result};
use crate::map::MapInput;
use crate::models::{LocationSample, MapSettings, RefugeDistance, Route, SettingsUpdate};
use crate::services::location::LocationProvider;
use crate::services::navigation::{NavigationController, RouteTicket, SessionSnapshot};
use crate::services::route_provider::RouteProvider;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Everything the session loop understands. Commands are handled one at a
/// time, in arrival order.
#[derive(Debug)]
pub enum SessionCommand {
    LocationUpdate(LocationSample),
    LocationFailed(LocationError),
    /// Pull one fix from the location provider
    RequestLocation,
    SelectRefuge {
        refuge_id: Option<String>,
        reply: oneshot::Sender<Result<()>>,
    },
    FocusRefuge {
        refuge_id: String,
        reply: oneshot::Sender<bool>,
    },
    StartNavigation {
        reply: oneshot::Sender<bool>,
    },
    RouteResolved {
        ticket: RouteTicket,
        route: Route,
    },
    StopNavigation,
    CloseSelectedRefuge,
    ToggleVoiceGuidance {
        reply: oneshot::Sender<bool>,
    },
    ZoomIn,
    ZoomOut,
    CenterOnUser,
    MapInput(MapInput),
    UpdateSettings {
        update: SettingsUpdate,
        reply: oneshot::Sender<Result<MapSettings>>,
    },
    GetSettings {
        reply: oneshot::Sender<MapSettings>,
    },
    SortedRefuges {
        reply: oneshot::Sender<Vec<RefugeDistance>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// External collaborators the loop calls out to.
#[derive(Clone)]
pub struct SessionServices {
    pub routes: Arc<dyn RouteProvider>,
    pub location: Option<Arc<dyn LocationProvider>>,
}

/// Sender side of a running session. The loop stops once every handle is
/// dropped.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.tx.send(command).map_err(|_| AppError::SessionClosed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.send(build(reply))?;
        rx.await.map_err(|_| AppError::SessionClosed)
    }

    pub fn location_update(&self, sample: LocationSample) -> Result<()> {
        self.send(SessionCommand::LocationUpdate(sample))
    }

    pub fn location_failed(&self, error: LocationError) -> Result<()> {
        self.send(SessionCommand::LocationFailed(error))
    }

    pub fn request_location(&self) -> Result<()> {
        self.send(SessionCommand::RequestLocation)
    }

    pub async fn select_refuge(&self, refuge_id: Option<String>) -> Result<()> {
        self.request(|reply| SessionCommand::SelectRefuge { refuge_id, reply }).await?
    }

    pub async fn focus_refuge(&self, refuge_id: String) -> Result<bool> {
        self.request(|reply| SessionCommand::FocusRefuge { refuge_id, reply }).await
    }

    /// Whether navigation started. The route arrives later.
    pub async fn start_navigation(&self) -> Result<bool> {
        self.request(|reply| SessionCommand::StartNavigation { reply }).await
    }

    pub fn stop_navigation(&self) -> Result<()> {
        self.send(SessionCommand::StopNavigation)
    }

    pub fn close_selected_refuge(&self) -> Result<()> {
        self.send(SessionCommand::CloseSelectedRefuge)
    }

    pub async fn toggle_voice_guidance(&self) -> Result<bool> {
        self.request(|reply| SessionCommand::ToggleVoiceGuidance { reply }).await
    }

    pub fn zoom_in(&self) -> Result<()> {
        self.send(SessionCommand::ZoomIn)
    }

    pub fn zoom_out(&self) -> Result<()> {
        self.send(SessionCommand::ZoomOut)
    }

    pub fn center_on_user(&self) -> Result<()> {
        self.send(SessionCommand::CenterOnUser)
    }

    pub fn map_input(&self, input: MapInput) -> Result<()> {
        self.send(SessionCommand::MapInput(input))
    }

    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<MapSettings> {
        self.request(|reply| SessionCommand::UpdateSettings { update, reply }).await?
    }

    pub async fn settings(&self) -> Result<MapSettings> {
        self.request(|reply| SessionCommand::GetSettings { reply }).await
    }

    pub async fn sorted_refuges(&self) -> Result<Vec<RefugeDistance>> {
        self.request(|reply| SessionCommand::SortedRefuges { reply }).await
    }

    /// Session state after every command sent before this call.
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        self.request(|reply| SessionCommand::Snapshot { reply }).await
    }
}

/// Run `controller` on its own task and return the handle that feeds it.
pub fn spawn_session(controller: NavigationController, services: SessionServices) -> SessionHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let weak = tx.downgrade();

    tokio::spawn(run(controller, services, rx, weak));

    SessionHandle { tx }
}

async fn run(
    mut controller: NavigationController,
    services: SessionServices,
    mut rx: mpsc::UnboundedReceiver<SessionCommand>,
    // Weak so background tasks do not keep the loop alive
    weak: mpsc::WeakUnboundedSender<SessionCommand>,
) {
    tracing::debug!("Session loop started");

    while let Some(command) = rx.recv().await {
        match command {
            SessionCommand::LocationUpdate(sample) => controller.on_location_update(sample),
            SessionCommand::LocationFailed(error) => controller.on_location_error(&error),
            SessionCommand::RequestLocation => match services.location.clone() {
                Some(provider) => {
                    let weak = weak.clone();
                    tokio::spawn(async move {
                        let command = match provider.current_position().await {
                            Ok(sample) => SessionCommand::LocationUpdate(sample),
                            Err(error) => SessionCommand::LocationFailed(error),
                        };
                        if let Some(tx) = weak.upgrade() {
                            let _ = tx.send(command);
                        }
                    });
                }
                None => controller.on_location_error(&LocationError::Unavailable(
                    "No location provider configured".to_string(),
                )),
            },
            SessionCommand::SelectRefuge { refuge_id, reply } => {
                let _ = reply.send(controller.select_refuge_by_id(refuge_id.as_deref()));
            }
            SessionCommand::FocusRefuge { refuge_id, reply } => {
                let _ = reply.send(controller.focus_refuge(&refuge_id));
            }
            SessionCommand::StartNavigation { reply } => {
                let ticket = controller.start_navigation();
                let _ = reply.send(ticket.is_some());

                if let Some(ticket) = ticket {
                    spawn_route_fetch(&services, &weak, ticket);
                }
            }
            SessionCommand::RouteResolved { ticket, route } => {
                controller.apply_route(&ticket, route);
            }
            SessionCommand::StopNavigation => controller.stop_navigation(),
            SessionCommand::CloseSelectedRefuge => controller.close_selected_refuge(),
            SessionCommand::ToggleVoiceGuidance { reply } => {
                let _ = reply.send(controller.toggle_voice_guidance());
            }
            SessionCommand::ZoomIn => controller.zoom_in(),
            SessionCommand::ZoomOut => controller.zoom_out(),
            SessionCommand::CenterOnUser => {
                controller.center_on_user();
            }
            SessionCommand::MapInput(input) => controller.on_map_input(input),
            SessionCommand::UpdateSettings { update, reply } => {
                let _ = reply.send(controller.update_settings(update));
            }
            SessionCommand::GetSettings { reply } => {
                let _ = reply.send(controller.settings().clone());
            }
            SessionCommand::SortedRefuges { reply } => {
                let _ = reply.send(controller.sorted_refuges());
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(controller.snapshot());
            }
        }

        // Target changes while navigating queue their own fetches
        for ticket in controller.take_route_requests() {
            spawn_route_fetch(&services, &weak, ticket);
        }
    }

    tracing::debug!("Session loop stopped: every handle dropped");
}

fn spawn_route_fetch(
    services: &SessionServices,
    weak: &mpsc::WeakUnboundedSender<SessionCommand>,
    ticket: RouteTicket,
) {
    let routes = services.routes.clone();
    let weak = weak.clone();
    tokio::spawn(async move {
        let route = routes.fetch_route(ticket.origin, ticket.destination).await;
        if let Some(tx) = weak.upgrade() {
            let _ = tx.send(SessionCommand::RouteResolved { ticket, route });
        }
    });
}
