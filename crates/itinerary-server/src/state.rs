//! Shared handler state.

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use itinerary_core::RouteOptions;
use itinerary_providers::{Geocoder, RouteProvider};

use crate::config::Config;
use crate::session::surface::{BroadcastSurface, SurfaceFrame};
use crate::session::{start_session, SessionHandle, SessionSettings};

/// Application state handed to every route.
pub struct AppState {
    session: SessionHandle,
    frames: broadcast::Sender<SurfaceFrame>,
    config: Config,
}

impl AppState {
    /// Spawn the planning session and wrap it for the API.
    pub fn start(
        config: Config,
        provider: Arc<dyn RouteProvider>,
        geocoder: Arc<dyn Geocoder>,
        shutdown: broadcast::Receiver<()>,
    ) -> (Arc<Self>, JoinHandle<()>) {
        let (frames, _) = broadcast::channel(config.frame_buffer.max(1));
        let settings = SessionSettings {
            options: RouteOptions {
                locale: config.locale.clone(),
            },
            route_timeout: config.route_timeout(),
            queue_capacity: config.event_queue_capacity,
        };
        let surface = Box::new(BroadcastSurface::new(frames.clone()));
        let (session, task) = start_session(settings, provider, geocoder, surface, shutdown);

        let state = Arc::new(Self {
            session,
            frames,
            config,
        });
        (state, task)
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Subscribe to surface frames emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SurfaceFrame> {
        self.frames.subscribe()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
