//! Info-window hosting for markers.

use crate::models::{Marker, MarkerHandle, MarkerKind};

/// Capability of anything that can show a bubble over a marker.
pub trait MarkerOverlayHost {
    /// Show the bubble for `marker`.
    fn open(&mut self, marker: &Marker) {
        self.on_open(marker);
    }

    /// Hide the bubble, if any.
    fn close(&mut self);

    /// Hook run when a bubble opens.
    fn on_open(&mut self, marker: &Marker);
}

/// The single bubble of a planning session.
///
/// Remembers which marker it is open on by handle, so a via point that gets
/// renumbered while its bubble is open still resolves to the right waypoint.
#[derive(Debug, Default)]
pub struct InfoWindow {
    selected: Option<(MarkerHandle, MarkerKind)>,
}

impl InfoWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<MarkerHandle> {
        self.selected.map(|(handle, _)| handle)
    }

    /// Handle of the open itinerary marker; route-step bubbles have no delete
    /// button.
    pub fn deletable(&self) -> Option<MarkerHandle> {
        match self.selected {
            Some((handle, MarkerKind::Itinerary)) => Some(handle),
            _ => None,
        }
    }
}

impl MarkerOverlayHost for InfoWindow {
    fn close(&mut self) {
        self.selected = None;
    }

    fn on_open(&mut self, marker: &Marker) {
        self.selected = Some((marker.handle, marker.id.kind()));
    }
}
