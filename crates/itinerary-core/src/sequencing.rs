//! Route request sequencing.
//!
//! Every waypoint change advances a sequence counter. A route completion is
//! applied only when it carries the latest sequence number; anything older
//! is a stale completion and gets dropped. This keeps a slow response to an
//! earlier edit from overwriting the route of a later edit, whatever order
//! the network delivers them in.

use crate::models::{RouteOptions, RouteRequest};
use crate::waypoints::WaypointSet;

/// What the coordinator should do after a waypoint change.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutePlan {
    /// Both endpoints are set; send this request to the routing provider.
    Dispatch(RouteRequest),
    /// An endpoint is missing; publish the empty route without a network call.
    NoRoute { sequence: u64 },
}

impl RoutePlan {
    pub fn sequence(&self) -> u64 {
        match self {
            RoutePlan::Dispatch(request) => request.sequence,
            RoutePlan::NoRoute { sequence } => *sequence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Accepted,
    Stale { latest: u64 },
}

#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    latest: u64,
    options: RouteOptions,
}

impl RequestSequencer {
    pub fn new(options: RouteOptions) -> Self {
        Self { latest: 0, options }
    }

    /// Highest sequence number handed out so far (0 before the first change).
    pub fn latest(&self) -> u64 {
        self.latest
    }

    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    /// Advance the counter for a waypoint change and decide whether to fetch.
    ///
    /// The counter also advances for `NoRoute`, so a request still in flight
    /// from before an endpoint was removed can never be accepted afterwards.
    pub fn plan(&mut self, waypoints: &WaypointSet) -> RoutePlan {
        self.latest += 1;
        match waypoints.route_points() {
            Some(points) => RoutePlan::Dispatch(RouteRequest {
                sequence: self.latest,
                waypoints: points,
                options: self.options.clone(),
            }),
            None => RoutePlan::NoRoute {
                sequence: self.latest,
            },
        }
    }

    pub fn check(&self, sequence: u64) -> Completion {
        if sequence == self.latest {
            Completion::Accepted
        } else {
            Completion::Stale {
                latest: self.latest,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;
    use crate::waypoints::WaypointStore;

    #[test]
    fn missing_endpoint_plans_no_route() {
        let mut store = WaypointStore::new();
        let mut sequencer = RequestSequencer::default();
        let update = store.set_start(GeoPoint::new(52.5, 13.4)).unwrap();
        assert_eq!(sequencer.plan(&update.snapshot), RoutePlan::NoRoute { sequence: 1 });
    }

    #[test]
    fn only_latest_sequence_is_accepted() {
        let mut store = WaypointStore::new();
        let mut sequencer = RequestSequencer::new(RouteOptions {
            locale: "de_DE".to_string(),
        });
        store.set_start(GeoPoint::new(52.5, 13.4)).unwrap();
        let first = sequencer.plan(&store.set_destination(GeoPoint::new(48.8, 2.3)).unwrap().snapshot);
        let (_, update) = store.add_via(GeoPoint::new(50.1, 8.7)).unwrap();
        let second = sequencer.plan(&update.snapshot);

        let RoutePlan::Dispatch(request) = &second else {
            panic!("expected a dispatch, got {:?}", second);
        };
        assert_eq!(request.waypoints.len(), 3);
        assert_eq!(request.options.locale, "de_DE");

        assert_eq!(sequencer.check(first.sequence()), Completion::Stale { latest: 2 });
        assert_eq!(sequencer.check(second.sequence()), Completion::Accepted);
    }

    #[test]
    fn removing_an_endpoint_invalidates_in_flight_request() {
        let mut store = WaypointStore::new();
        let mut sequencer = RequestSequencer::default();
        store.set_start(GeoPoint::new(1.0, 1.0)).unwrap();
        let update = store.set_destination(GeoPoint::new(2.0, 2.0)).unwrap();
        let in_flight = sequencer.plan(&update.snapshot);

        let update = store
            .remove_by_role(crate::models::WaypointRole::Destination)
            .unwrap();
        sequencer.plan(&update.snapshot);

        assert!(matches!(
            sequencer.check(in_flight.sequence()),
            Completion::Stale { .. }
        ));
    }
}
