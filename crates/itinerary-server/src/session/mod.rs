//! Route planning session.
//!
//! One task owns the waypoint store, the route coordinator and the marker
//! bookkeeping. User input, route completions and address lookups all arrive
//! as [`SessionEvent`]s on a single queue and are applied in order, so none
//! of the state needs a lock.

pub mod annotator;
pub mod coordinator;
pub mod surface;

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use itinerary_core::{
    ClearAction, GeoPoint, InfoWindow, MarkerHandle, MarkerOverlayHost, MarkerSynchronizer,
    PointRole, RenderOp, RouteOptions, RouteResult, Scene, Waypoint, WaypointError, WaypointRole,
    WaypointStore, WaypointUpdate,
};
use itinerary_providers::{Geocoder, RouteProvider};

use self::annotator::AddressAnnotator;
use self::coordinator::RouteRequestCoordinator;
use self::surface::{apply_op, RenderSurface};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Waypoint(#[from] WaypointError),

    #[error("no info window with a deletable waypoint is open")]
    NothingSelected,

    #[error("marker {0} is not on the map")]
    UnknownMarker(MarkerHandle),

    #[error("planning session is closed")]
    Closed,
}

/// User input accepted by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointSelected { position: GeoPoint, role: PointRole },
    WaypointRemoved { role: WaypointRole },
    ClearActionInvoked { action: ClearAction },
    MarkerTapped { handle: MarkerHandle },
    InfoWindowDelete,
    MapTapped,
    Reset,
}

pub type InputReply = oneshot::Sender<Result<InputOutcome, SessionError>>;

pub enum SessionEvent {
    Input {
        event: InputEvent,
        reply: Option<InputReply>,
    },
    RouteCompleted {
        sequence: u64,
        result: RouteResult,
    },
    AddressResolved {
        handle: MarkerHandle,
        address: String,
    },
    Query(SessionQuery),
}

pub enum SessionQuery {
    ClearOptions(oneshot::Sender<Vec<ClearAction>>),
    Waypoints(oneshot::Sender<Vec<Waypoint>>),
    View(oneshot::Sender<SessionView>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputOutcome {
    pub waypoints: Vec<Waypoint>,
    pub route_sequence: u64,
    pub route_pending: bool,
}

/// Read-only picture of the session for late joiners and the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub waypoints: Vec<Waypoint>,
    pub route: RouteResult,
    pub route_sequence: u64,
    pub route_pending: bool,
    pub scene: Scene,
    pub clear_options: Vec<ClearAction>,
    pub info_window: Option<MarkerHandle>,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub options: RouteOptions,
    pub route_timeout: Duration,
    pub queue_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            options: RouteOptions::default(),
            route_timeout: Duration::from_secs(15),
            queue_capacity: 256,
        }
    }
}

pub struct Session {
    store: WaypointStore,
    coordinator: RouteRequestCoordinator,
    markers: MarkerSynchronizer,
    annotator: AddressAnnotator,
    info_window: InfoWindow,
    surface: Box<dyn RenderSurface>,
}

impl Session {
    /// Build a session. `events` must feed the queue this session is driven
    /// from; background completions are posted there.
    pub fn new(
        settings: &SessionSettings,
        provider: Arc<dyn RouteProvider>,
        geocoder: Arc<dyn Geocoder>,
        surface: Box<dyn RenderSurface>,
        events: mpsc::Sender<SessionEvent>,
    ) -> Self {
        Self {
            store: WaypointStore::new(),
            coordinator: RouteRequestCoordinator::new(
                provider,
                settings.options.clone(),
                settings.route_timeout,
                events.clone(),
            ),
            markers: MarkerSynchronizer::new(),
            annotator: AddressAnnotator::new(geocoder, events),
            info_window: InfoWindow::new(),
            surface,
        }
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Input { event, reply } => {
                let outcome = self.handle_input(event);
                if let Err(err) = &outcome {
                    tracing::debug!("Input rejected: {}", err);
                }
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }
            SessionEvent::RouteCompleted { sequence, result } => {
                self.complete_route(sequence, result);
            }
            SessionEvent::AddressResolved { handle, address } => {
                self.resolve_address(handle, address);
            }
            SessionEvent::Query(query) => match query {
                SessionQuery::ClearOptions(reply) => {
                    let _ = reply.send(self.clear_options());
                }
                SessionQuery::Waypoints(reply) => {
                    let _ = reply.send(self.waypoints());
                }
                SessionQuery::View(reply) => {
                    let _ = reply.send(self.view());
                }
            },
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Result<InputOutcome, SessionError> {
        match event {
            InputEvent::PointSelected { position, role } => {
                let update = match role {
                    PointRole::Start => self.store.set_start(position)?,
                    PointRole::Destination => self.store.set_destination(position)?,
                    PointRole::Via => self.store.add_via(position)?.1,
                };
                self.waypoints_changed(update);
            }
            InputEvent::WaypointRemoved { role } => {
                let update = self.store.remove_by_role(role)?;
                self.waypoints_changed(update);
            }
            InputEvent::ClearActionInvoked { action } => self.execute_clear_action(action)?,
            InputEvent::MarkerTapped { handle } => {
                let marker = self
                    .markers
                    .find(handle)
                    .cloned()
                    .ok_or(SessionError::UnknownMarker(handle))?;
                self.info_window.open(&marker);
            }
            InputEvent::InfoWindowDelete => {
                let handle = self
                    .info_window
                    .deletable()
                    .ok_or(SessionError::NothingSelected)?;
                let role = self
                    .markers
                    .find(handle)
                    .and_then(|marker| marker.id.role())
                    .ok_or(SessionError::UnknownMarker(handle))?;
                self.info_window.close();
                let update = self.store.remove_by_role(role)?;
                self.waypoints_changed(update);
            }
            InputEvent::MapTapped => self.info_window.close(),
            InputEvent::Reset => {
                let update = self.store.clear();
                self.waypoints_changed(update);
            }
        }
        Ok(self.outcome())
    }

    /// Apply a clear-menu choice.
    pub fn execute_clear_action(&mut self, action: ClearAction) -> Result<(), SessionError> {
        match action {
            ClearAction::ClearRouteNodesOnly => {
                let ops = self.markers.clear_route_steps();
                self.render(ops);
            }
            ClearAction::ClearRouteOnly => {
                let ops = self.markers.clear_route_path();
                self.render(ops);
            }
            ClearAction::ClearAll => {
                let mut ops = self.markers.clear_route_steps();
                ops.extend(self.markers.clear_route_path());
                self.render(ops);
                let update = self.store.remove_by_role(WaypointRole::Destination)?;
                self.waypoints_changed(update);
            }
            ClearAction::NothingToClear => {}
        }
        Ok(())
    }

    pub fn complete_route(&mut self, sequence: u64, result: RouteResult) {
        let Some(accepted) = self.coordinator.on_completion(sequence, result) else {
            return;
        };
        self.publish_route(&accepted.route);
        if let Some(notice) = accepted.notice {
            self.surface.notify(notice);
        }
    }

    pub fn resolve_address(&mut self, handle: MarkerHandle, address: String) {
        match self.markers.describe(handle, address) {
            Some(op) => self.render(vec![op]),
            None => tracing::debug!("Marker {} gone before its address arrived", handle),
        }
    }

    pub fn clear_options(&self) -> Vec<ClearAction> {
        self.markers.clear_options()
    }

    pub fn waypoints(&self) -> Vec<Waypoint> {
        self.store.snapshot().waypoints()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            waypoints: self.waypoints(),
            route: self.coordinator.current().clone(),
            route_sequence: self.coordinator.latest_sequence(),
            route_pending: self.coordinator.pending(),
            scene: self.markers.scene(),
            clear_options: self.clear_options(),
            info_window: self.info_window.selected(),
        }
    }

    fn outcome(&self) -> InputOutcome {
        InputOutcome {
            waypoints: self.waypoints(),
            route_sequence: self.coordinator.latest_sequence(),
            route_pending: self.coordinator.pending(),
        }
    }

    fn waypoints_changed(&mut self, update: WaypointUpdate) {
        let ops = self
            .markers
            .sync_itinerary(&update.snapshot, &update.renames);
        self.render(ops);

        if let Some(route) = self.coordinator.on_waypoints_changed(&update.snapshot) {
            self.publish_route(&route);
        }
    }

    fn publish_route(&mut self, route: &RouteResult) {
        let ops = self.markers.apply_route(route);
        self.render(ops);
    }

    fn render(&mut self, ops: Vec<RenderOp>) {
        for op in &ops {
            apply_op(self.surface.as_mut(), op);
            match op {
                RenderOp::AddMarker { marker } => self.annotator.annotate(marker),
                RenderOp::RemoveMarker { handle } => {
                    if self.info_window.selected() == Some(*handle) {
                        self.info_window.close();
                    }
                }
                _ => {}
            }
        }
    }
}

/// Cheap, cloneable front door to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionEvent>,
}

impl SessionHandle {
    pub fn new(tx: mpsc::Sender<SessionEvent>) -> Self {
        Self { tx }
    }

    pub async fn input(&self, event: InputEvent) -> Result<InputOutcome, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionEvent::Input {
                event,
                reply: Some(reply),
            })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    pub async fn clear_options(&self) -> Result<Vec<ClearAction>, SessionError> {
        self.query(SessionQuery::ClearOptions).await
    }

    pub async fn waypoints(&self) -> Result<Vec<Waypoint>, SessionError> {
        self.query(SessionQuery::Waypoints).await
    }

    pub async fn view(&self) -> Result<SessionView, SessionError> {
        self.query(SessionQuery::View).await
    }

    async fn query<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionQuery,
    ) -> Result<T, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionEvent::Query(build(reply)))
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }
}

/// Drive a session until shutdown.
pub async fn run_session_loop(
    mut session: Session,
    mut rx: mpsc::Receiver<SessionEvent>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Session loop shutting down");
                break;
            }
            event = rx.recv() => {
                match event {
                    Some(event) => session.handle_event(event),
                    None => {
                        tracing::info!("Session channel closed");
                        break;
                    }
                }
            }
        }
    }
}

/// Create a session and spawn its loop.
pub fn start_session(
    settings: SessionSettings,
    provider: Arc<dyn RouteProvider>,
    geocoder: Arc<dyn Geocoder>,
    surface: Box<dyn RenderSurface>,
    shutdown: broadcast::Receiver<()>,
) -> (SessionHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(settings.queue_capacity.max(1));
    let session = Session::new(&settings, provider, geocoder, surface, tx.clone());
    let task = tokio::spawn(run_session_loop(session, rx, shutdown));
    (SessionHandle::new(tx), task)
}
