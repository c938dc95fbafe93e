//! Marker bookkeeping for itinerary and route-step markers.
//!
//! The synchronizer owns every marker that is on screen and turns waypoint
//! snapshots and accepted routes into a list of [`RenderOp`]s for the
//! rendering surface. The two marker families are tracked separately so a
//! route rebuild never touches itinerary markers and vice versa.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::clearance::ClearAction;
use crate::models::{
    GeoPoint, Marker, MarkerHandle, MarkerIcon, MarkerId, OverlayPresence, RouteResult,
    WaypointRole,
};
use crate::waypoints::{RoleRename, WaypointSet};

/// A single instruction for the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderOp {
    AddMarker { marker: Marker },
    RemoveMarker { handle: MarkerHandle },
    DescribeMarker { handle: MarkerHandle, description: String },
    SetRoutePath { path: Option<Vec<GeoPoint>> },
    Redraw,
}

/// Everything currently drawn, for late-joining viewers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub itinerary: Vec<Marker>,
    pub route_steps: Vec<Marker>,
    pub route_path: Option<Vec<GeoPoint>>,
}

#[derive(Debug, Default)]
pub struct MarkerSynchronizer {
    next_handle: u64,
    itinerary: BTreeMap<WaypointRole, Marker>,
    route_steps: Vec<Marker>,
    route_path: Option<Vec<GeoPoint>>,
}

impl MarkerSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring itinerary markers in line with `waypoints`.
    ///
    /// Renamed via points keep their marker (and its handle and description);
    /// markers are only removed for vanished waypoints and replaced when a
    /// waypoint moved.
    pub fn sync_itinerary(&mut self, waypoints: &WaypointSet, renames: &[RoleRename]) -> Vec<RenderOp> {
        let mut removed = Vec::new();
        let mut added = Vec::new();

        let moving: Vec<(WaypointRole, Marker)> = renames
            .iter()
            .filter_map(|rename| {
                self.itinerary
                    .remove(&rename.from)
                    .map(|marker| (rename.to, marker))
            })
            .collect();
        for (role, mut marker) in moving {
            marker.id = MarkerId::Itinerary(role);
            if let Some(displaced) = self.itinerary.insert(role, marker) {
                removed.push(displaced.handle);
            }
        }

        let desired = waypoints.waypoints();
        let stale: Vec<WaypointRole> = self
            .itinerary
            .keys()
            .filter(|role| waypoints.get(**role).is_none())
            .copied()
            .collect();
        for role in stale {
            if let Some(marker) = self.itinerary.remove(&role) {
                removed.push(marker.handle);
            }
        }

        for waypoint in desired {
            let unchanged = self
                .itinerary
                .get(&waypoint.role)
                .is_some_and(|marker| marker.position == waypoint.position);
            if unchanged {
                continue;
            }
            let marker = self.itinerary_marker(waypoint.role, waypoint.position);
            if let Some(previous) = self.itinerary.insert(waypoint.role, marker.clone()) {
                removed.push(previous.handle);
            }
            added.push(marker);
        }

        finish(removed, added)
    }

    /// Replace route-step markers and path with those of an accepted route.
    pub fn apply_route(&mut self, route: &RouteResult) -> Vec<RenderOp> {
        let mut ops: Vec<RenderOp> = self
            .route_steps
            .drain(..)
            .map(|marker| RenderOp::RemoveMarker {
                handle: marker.handle,
            })
            .collect();

        if self.route_path.take().is_some() {
            ops.push(RenderOp::SetRoutePath { path: None });
        }
        if route.has_path() {
            self.route_path = Some(route.path.clone());
            ops.push(RenderOp::SetRoutePath {
                path: Some(route.path.clone()),
            });
        }

        for (index, step) in route.steps.iter().enumerate() {
            let marker = Marker {
                handle: self.next_handle(),
                id: MarkerId::RouteStep(index),
                position: step.location,
                title: format!("Step {}", index + 1),
                description: step.instruction.clone(),
                sub_description: Some(step.sub_description()),
                icon: MarkerIcon::RouteNode,
            };
            self.route_steps.push(marker.clone());
            ops.push(RenderOp::AddMarker { marker });
        }

        ops.push(RenderOp::Redraw);
        ops
    }

    pub fn clear_route_steps(&mut self) -> Vec<RenderOp> {
        let removed = self.route_steps.drain(..).map(|marker| marker.handle).collect();
        finish(removed, Vec::new())
    }

    pub fn clear_route_path(&mut self) -> Vec<RenderOp> {
        let mut ops = Vec::new();
        if self.route_path.take().is_some() {
            ops.push(RenderOp::SetRoutePath { path: None });
        }
        ops.push(RenderOp::Redraw);
        ops
    }

    /// Set the description of a marker that is still drawn. Returns `None`
    /// when the marker has been removed in the meantime.
    pub fn describe(&mut self, handle: MarkerHandle, description: String) -> Option<RenderOp> {
        let marker = self
            .itinerary
            .values_mut()
            .chain(self.route_steps.iter_mut())
            .find(|marker| marker.handle == handle)?;
        marker.description = description.clone();
        Some(RenderOp::DescribeMarker {
            handle,
            description,
        })
    }

    pub fn find(&self, handle: MarkerHandle) -> Option<&Marker> {
        self.itinerary
            .values()
            .chain(self.route_steps.iter())
            .find(|marker| marker.handle == handle)
    }

    pub fn itinerary_marker_for(&self, role: WaypointRole) -> Option<&Marker> {
        self.itinerary.get(&role)
    }

    pub fn route_step_count(&self) -> usize {
        self.route_steps.len()
    }

    pub fn presence(&self) -> OverlayPresence {
        OverlayPresence {
            route_path_present: self.route_path.is_some(),
            route_step_marker_count: self.route_steps.len(),
            destination_marker_present: self.itinerary.contains_key(&WaypointRole::Destination),
        }
    }

    pub fn clear_options(&self) -> Vec<ClearAction> {
        crate::clearance::compute_clear_options(&self.presence())
    }

    pub fn scene(&self) -> Scene {
        Scene {
            itinerary: self.itinerary.values().cloned().collect(),
            route_steps: self.route_steps.clone(),
            route_path: self.route_path.clone(),
        }
    }

    fn itinerary_marker(&mut self, role: WaypointRole, position: GeoPoint) -> Marker {
        let (title, icon) = match role {
            WaypointRole::Start => ("Departure", MarkerIcon::Departure),
            WaypointRole::Via(_) => ("Via point", MarkerIcon::Via),
            WaypointRole::Destination => ("Destination", MarkerIcon::Destination),
        };
        Marker {
            handle: self.next_handle(),
            id: MarkerId::Itinerary(role),
            position,
            title: title.to_string(),
            description: String::new(),
            sub_description: None,
            icon,
        }
    }

    fn next_handle(&mut self) -> MarkerHandle {
        self.next_handle += 1;
        MarkerHandle(self.next_handle)
    }
}

fn finish(removed: Vec<MarkerHandle>, added: Vec<Marker>) -> Vec<RenderOp> {
    let mut ops: Vec<RenderOp> = removed
        .into_iter()
        .map(|handle| RenderOp::RemoveMarker { handle })
        .collect();
    ops.extend(added.into_iter().map(|marker| RenderOp::AddMarker { marker }));
    ops.push(RenderOp::Redraw);
    ops
}
