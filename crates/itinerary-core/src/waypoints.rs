//! Canonical waypoint set and its editing operations.

use serde::{Deserialize, Serialize};

use crate::error::WaypointError;
use crate::models::{GeoPoint, Waypoint, WaypointRole};

/// Immutable snapshot of the itinerary: optional start, ordered via points,
/// optional destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaypointSet {
    start: Option<GeoPoint>,
    vias: Vec<GeoPoint>,
    destination: Option<GeoPoint>,
}

impl WaypointSet {
    pub fn start(&self) -> Option<GeoPoint> {
        self.start
    }

    pub fn destination(&self) -> Option<GeoPoint> {
        self.destination
    }

    pub fn vias(&self) -> &[GeoPoint] {
        &self.vias
    }

    pub fn get(&self, role: WaypointRole) -> Option<GeoPoint> {
        match role {
            WaypointRole::Start => self.start,
            WaypointRole::Via(index) => self.vias.get(index).copied(),
            WaypointRole::Destination => self.destination,
        }
    }

    pub fn has_endpoints(&self) -> bool {
        self.start.is_some() && self.destination.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.vias.is_empty() && self.destination.is_none()
    }

    pub fn len(&self) -> usize {
        self.vias.len() + usize::from(self.start.is_some()) + usize::from(self.destination.is_some())
    }

    /// All present waypoints in itinerary order.
    pub fn waypoints(&self) -> Vec<Waypoint> {
        let mut out = Vec::with_capacity(self.len());
        if let Some(position) = self.start {
            out.push(Waypoint {
                role: WaypointRole::Start,
                position,
            });
        }
        out.extend(self.vias.iter().enumerate().map(|(index, position)| Waypoint {
            role: WaypointRole::Via(index),
            position: *position,
        }));
        if let Some(position) = self.destination {
            out.push(Waypoint {
                role: WaypointRole::Destination,
                position,
            });
        }
        out
    }

    /// Ordered positions for a route request, `None` unless both endpoints
    /// are set.
    pub fn route_points(&self) -> Option<Vec<GeoPoint>> {
        let (start, destination) = (self.start?, self.destination?);
        let mut points = Vec::with_capacity(self.vias.len() + 2);
        points.push(start);
        points.extend_from_slice(&self.vias);
        points.push(destination);
        Some(points)
    }
}

/// A via point whose index shifted after an earlier via point was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRename {
    pub from: WaypointRole,
    pub to: WaypointRole,
}

/// Result of a store mutation: the new snapshot plus any identity shifts
/// downstream consumers must apply.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointUpdate {
    pub snapshot: WaypointSet,
    pub renames: Vec<RoleRename>,
}

/// Owner of the waypoint set. Pure state, no I/O.
#[derive(Debug, Clone, Default)]
pub struct WaypointStore {
    set: WaypointSet,
}

impl WaypointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &WaypointSet {
        &self.set
    }

    pub fn set_start(&mut self, position: GeoPoint) -> Result<WaypointUpdate, WaypointError> {
        self.set.start = Some(check_position(position)?);
        Ok(self.update(Vec::new()))
    }

    pub fn set_destination(&mut self, position: GeoPoint) -> Result<WaypointUpdate, WaypointError> {
        self.set.destination = Some(check_position(position)?);
        Ok(self.update(Vec::new()))
    }

    /// Append a via point; returns its index.
    pub fn add_via(&mut self, position: GeoPoint) -> Result<(usize, WaypointUpdate), WaypointError> {
        self.set.vias.push(check_position(position)?);
        let index = self.set.vias.len() - 1;
        Ok((index, self.update(Vec::new())))
    }

    /// Remove the waypoint with the given role.
    ///
    /// Removing an absent start or destination is a no-op. Removing `Via(i)`
    /// shifts every later via point down by one and reports the shifts.
    pub fn remove_by_role(&mut self, role: WaypointRole) -> Result<WaypointUpdate, WaypointError> {
        let renames = match role {
            WaypointRole::Start => {
                self.set.start = None;
                Vec::new()
            }
            WaypointRole::Destination => {
                self.set.destination = None;
                Vec::new()
            }
            WaypointRole::Via(index) => {
                let via_count = self.set.vias.len();
                if index >= via_count {
                    return Err(WaypointError::InvalidRole { role, via_count });
                }
                self.set.vias.remove(index);
                (index + 1..via_count)
                    .map(|old| RoleRename {
                        from: WaypointRole::Via(old),
                        to: WaypointRole::Via(old - 1),
                    })
                    .collect()
            }
        };
        Ok(self.update(renames))
    }

    pub fn clear(&mut self) -> WaypointUpdate {
        self.set = WaypointSet::default();
        self.update(Vec::new())
    }

    fn update(&self, renames: Vec<RoleRename>) -> WaypointUpdate {
        WaypointUpdate {
            snapshot: self.set.clone(),
            renames,
        }
    }
}

fn check_position(position: GeoPoint) -> Result<GeoPoint, WaypointError> {
    if position.is_valid() {
        Ok(position)
    } else {
        Err(WaypointError::InvalidPosition {
            lat: position.lat,
            lon: position.lon,
        })
    }
}
