//! Itinerary core: waypoint editing, route request sequencing, marker
//! synchronization and clear-menu policy for interactive route planning.
//!
//! Everything in this crate is synchronous and free of I/O; the session in
//! `itinerary-server` drives it from a single event loop.

pub mod clearance;
pub mod error;
pub mod format;
pub mod markers;
pub mod models;
pub mod overlay;
pub mod sequencing;
pub mod spatial;
pub mod waypoints;

pub use clearance::{compute_clear_options, ClearAction};
pub use error::WaypointError;
pub use format::length_duration_text;
pub use markers::{MarkerSynchronizer, RenderOp, Scene};
pub use models::{
    GeoPoint, Marker, MarkerHandle, MarkerIcon, MarkerId, MarkerKind, Notice, OverlayPresence,
    PointRole, RouteOptions, RouteRequest, RouteResult, RouteStatus, RouteStep, Waypoint,
    WaypointRole,
};
pub use overlay::{InfoWindow, MarkerOverlayHost};
pub use sequencing::{Completion, RequestSequencer, RoutePlan};
pub use spatial::haversine_distance;
pub use waypoints::{RoleRename, WaypointSet, WaypointStore, WaypointUpdate};
