//! Route request coordination.
//!
//! Turns waypoint changes into sequenced provider calls and filters the
//! completions that come back, so only the route for the latest edit is
//! ever published.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use itinerary_core::{
    Completion, Notice, RequestSequencer, RouteOptions, RoutePlan, RouteRequest, RouteResult,
    WaypointSet,
};
use itinerary_providers::{ProviderError, RouteProvider};

use super::SessionEvent;

/// A completion that made it past the sequence check.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedRoute {
    pub route: RouteResult,
    pub notice: Option<Notice>,
}

pub struct RouteRequestCoordinator {
    sequencer: RequestSequencer,
    provider: Arc<dyn RouteProvider>,
    events: mpsc::Sender<SessionEvent>,
    timeout: Duration,
    current: RouteResult,
    settled: Option<u64>,
}

impl RouteRequestCoordinator {
    pub fn new(
        provider: Arc<dyn RouteProvider>,
        options: RouteOptions,
        timeout: Duration,
        events: mpsc::Sender<SessionEvent>,
    ) -> Self {
        Self {
            sequencer: RequestSequencer::new(options),
            provider,
            events,
            timeout,
            current: RouteResult::empty(),
            settled: None,
        }
    }

    /// React to a waypoint change.
    ///
    /// Returns the route to publish right away when no request is needed.
    pub fn on_waypoints_changed(&mut self, waypoints: &WaypointSet) -> Option<RouteResult> {
        match self.sequencer.plan(waypoints) {
            RoutePlan::Dispatch(request) => {
                self.dispatch(request);
                None
            }
            RoutePlan::NoRoute { sequence } => {
                tracing::debug!("Route {} skipped: start or destination missing", sequence);
                self.current = RouteResult::empty();
                self.settled = Some(sequence);
                Some(self.current.clone())
            }
        }
    }

    /// Filter a provider completion. Stale and duplicate completions yield
    /// `None` and leave the published route untouched.
    pub fn on_completion(&mut self, sequence: u64, result: RouteResult) -> Option<AcceptedRoute> {
        if let Completion::Stale { latest } = self.sequencer.check(sequence) {
            tracing::debug!("Discarding stale route {} (latest is {})", sequence, latest);
            return None;
        }
        if self.settled == Some(sequence) {
            tracing::debug!("Route {} already settled", sequence);
            return None;
        }
        self.settled = Some(sequence);

        if result.is_failed() {
            self.current = RouteResult::failed();
            return Some(AcceptedRoute {
                route: self.current.clone(),
                notice: Some(Notice::RouteUnavailable),
            });
        }

        tracing::info!(
            "Route {} accepted: {} steps, {}",
            sequence,
            result.steps.len(),
            result.summary()
        );
        self.current = result;
        Some(AcceptedRoute {
            route: self.current.clone(),
            notice: None,
        })
    }

    pub fn current(&self) -> &RouteResult {
        &self.current
    }

    pub fn latest_sequence(&self) -> u64 {
        self.sequencer.latest()
    }

    /// True while the latest request has not completed yet.
    pub fn pending(&self) -> bool {
        self.sequencer.latest() != 0 && self.settled != Some(self.sequencer.latest())
    }

    fn dispatch(&self, request: RouteRequest) {
        let provider = self.provider.clone();
        let events = self.events.clone();
        let timeout = self.timeout;

        tracing::debug!(
            "Requesting route {} from {} through {} waypoints",
            request.sequence,
            provider.name(),
            request.waypoints.len()
        );

        tokio::spawn(async move {
            let result = match fetch_route(provider.as_ref(), &request, timeout).await {
                Ok(route) => route,
                Err(err) => {
                    tracing::warn!("Route {} failed: {}", request.sequence, err);
                    RouteResult::failed()
                }
            };

            let completion = SessionEvent::RouteCompleted {
                sequence: request.sequence,
                result,
            };
            if events.send(completion).await.is_err() {
                tracing::debug!("Session gone before route {} completed", request.sequence);
            }
        });
    }
}

/// One provider call bounded by `timeout`.
async fn fetch_route(
    provider: &dyn RouteProvider,
    request: &RouteRequest,
    timeout: Duration,
) -> Result<RouteResult, ProviderError> {
    let fetch = provider.request_route(&request.waypoints, &request.options);
    match tokio::time::timeout(timeout, fetch).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use itinerary_core::{GeoPoint, WaypointStore};

    struct SilentProvider;

    #[async_trait]
    impl RouteProvider for SilentProvider {
        fn name(&self) -> &str {
            "silent"
        }

        async fn request_route(
            &self,
            _waypoints: &[GeoPoint],
            _options: &RouteOptions,
        ) -> Result<RouteResult, ProviderError> {
            std::future::pending().await
        }
    }

    fn request() -> RouteRequest {
        RouteRequest {
            sequence: 1,
            waypoints: vec![GeoPoint::new(1.0, 1.0), GeoPoint::new(2.0, 2.0)],
            options: RouteOptions::default(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let timeout = Duration::from_millis(250);
        let err = fetch_route(&SilentProvider, &request(), timeout)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(after) if after == timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_request_completes_as_failed_route() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut coordinator = RouteRequestCoordinator::new(
            Arc::new(SilentProvider),
            RouteOptions::default(),
            Duration::from_secs(2),
            tx,
        );
        let mut store = WaypointStore::new();
        store.set_start(GeoPoint::new(1.0, 1.0)).unwrap();
        let update = store.set_destination(GeoPoint::new(2.0, 2.0)).unwrap();
        assert!(coordinator.on_waypoints_changed(&update.snapshot).is_none());
        assert!(coordinator.pending());

        let Some(SessionEvent::RouteCompleted { sequence, result }) = rx.recv().await else {
            panic!("expected a route completion");
        };
        assert_eq!(sequence, 1);
        assert!(result.is_failed());

        let accepted = coordinator.on_completion(sequence, result).unwrap();
        assert_eq!(accepted.notice, Some(Notice::RouteUnavailable));
        assert!(!coordinator.pending());
    }
}
