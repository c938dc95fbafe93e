//! Core data models for interactive route planning.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WaypointError;
use crate::format::length_duration_text;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both coordinates are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

/// Role of a waypoint inside the itinerary.
///
/// The role doubles as the identity of the itinerary marker drawn for the
/// waypoint. `Via` indices are dense and shift down when an earlier via point
/// is removed. The derived ordering is itinerary order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointRole {
    Start,
    Via(usize),
    Destination,
}

impl fmt::Display for WaypointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaypointRole::Start => f.write_str("start"),
            WaypointRole::Via(index) => write!(f, "via-{}", index),
            WaypointRole::Destination => f.write_str("destination"),
        }
    }
}

impl FromStr for WaypointRole {
    type Err = WaypointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        match value.as_str() {
            "start" | "departure" => Ok(WaypointRole::Start),
            "destination" | "dest" => Ok(WaypointRole::Destination),
            other => other
                .strip_prefix("via-")
                .and_then(|index| index.parse().ok())
                .map(WaypointRole::Via)
                .ok_or_else(|| WaypointError::UnknownRole(s.to_string())),
        }
    }
}

/// Role requested when the user picks a point on the map.
///
/// Unlike [`WaypointRole`] a via selection carries no index: new via points
/// are appended after the existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointRole {
    Start,
    Via,
    Destination,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub role: WaypointRole,
    pub position: GeoPoint,
}

/// Options forwarded to the routing provider with every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOptions {
    /// Language tag for turn instructions, e.g. `en` or `de_DE`.
    pub locale: String,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
        }
    }
}

/// A sequenced route request. Waypoints are ordered start, vias, destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub sequence: u64,
    pub waypoints: Vec<GeoPoint>,
    pub options: RouteOptions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    #[default]
    Ok,
    Failed,
}

/// One turn instruction of a computed route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    /// Length of the segment following this instruction, in kilometers.
    pub length_km: f64,
    /// Duration of the segment following this instruction, in seconds.
    pub duration_s: f64,
    pub location: GeoPoint,
}

impl RouteStep {
    pub fn sub_description(&self) -> String {
        length_duration_text(self.length_km, self.duration_s)
    }
}

/// A route as published by the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub status: RouteStatus,
    pub steps: Vec<RouteStep>,
    /// Path geometry; empty means there is no path to draw.
    pub path: Vec<GeoPoint>,
    #[serde(default)]
    pub length_km: f64,
    #[serde(default)]
    pub duration_s: f64,
}

impl RouteResult {
    /// The "no route" state: Ok status, no steps, no path.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failed() -> Self {
        Self {
            status: RouteStatus::Failed,
            ..Self::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == RouteStatus::Failed
    }

    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn summary(&self) -> String {
        length_duration_text(self.length_km, self.duration_s)
    }
}

/// Opaque marker reference handed to the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerHandle(pub u64);

impl fmt::Display for MarkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Itinerary,
    RouteStep,
}

/// Typed marker identity: the waypoint role for itinerary markers, the step
/// index within the accepted route for route-step markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerId {
    Itinerary(WaypointRole),
    RouteStep(usize),
}

impl MarkerId {
    pub fn kind(&self) -> MarkerKind {
        match self {
            MarkerId::Itinerary(_) => MarkerKind::Itinerary,
            MarkerId::RouteStep(_) => MarkerKind::RouteStep,
        }
    }

    pub fn role(&self) -> Option<WaypointRole> {
        match self {
            MarkerId::Itinerary(role) => Some(*role),
            MarkerId::RouteStep(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerIcon {
    Departure,
    Via,
    Destination,
    RouteNode,
}

/// A visual marker owned by the marker synchronizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub handle: MarkerHandle,
    pub id: MarkerId,
    pub position: GeoPoint,
    pub title: String,
    /// Filled asynchronously for itinerary markers (reverse-geocoded address).
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_description: Option<String>,
    pub icon: MarkerIcon,
}

/// What is currently drawn, as far as the clear menu is concerned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayPresence {
    pub route_path_present: bool,
    pub route_step_marker_count: usize,
    pub destination_marker_present: bool,
}

/// One-shot user-visible notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    RouteUnavailable,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::RouteUnavailable => "We have a problem to get the route",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_path_form() {
        for role in [
            WaypointRole::Start,
            WaypointRole::Via(0),
            WaypointRole::Via(12),
            WaypointRole::Destination,
        ] {
            assert_eq!(role.to_string().parse::<WaypointRole>().unwrap(), role);
        }
        assert_eq!("Departure".parse::<WaypointRole>().unwrap(), WaypointRole::Start);
        assert!("via-x".parse::<WaypointRole>().is_err());
        assert!("middle".parse::<WaypointRole>().is_err());
    }

    #[test]
    fn role_order_is_itinerary_order() {
        let mut roles = vec![
            WaypointRole::Destination,
            WaypointRole::Via(1),
            WaypointRole::Start,
            WaypointRole::Via(0),
        ];
        roles.sort();
        assert_eq!(
            roles,
            vec![
                WaypointRole::Start,
                WaypointRole::Via(0),
                WaypointRole::Via(1),
                WaypointRole::Destination,
            ]
        );
    }

    #[test]
    fn empty_route_has_nothing_to_draw() {
        let route = RouteResult::empty();
        assert_eq!(route.status, RouteStatus::Ok);
        assert!(route.steps.is_empty());
        assert!(!route.has_path());
        assert!(RouteResult::failed().is_failed());
    }

    #[test]
    fn geo_point_validation() {
        assert!(GeoPoint::new(52.5, 13.4).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::NAN).is_valid());
    }
}
