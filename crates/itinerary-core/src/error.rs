//! Error types for waypoint editing.

use crate::models::WaypointRole;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WaypointError {
    #[error("no waypoint with role {role} ({via_count} via points)")]
    InvalidRole { role: WaypointRole, via_count: usize },

    #[error("unknown waypoint role: {0}")]
    UnknownRole(String),

    #[error("position out of range: lat {lat}, lon {lon}")]
    InvalidPosition { lat: f64, lon: f64 },
}
