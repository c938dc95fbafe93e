//! Best-effort address lookup for new itinerary markers.

use std::sync::Arc;
use tokio::sync::mpsc;

use itinerary_core::{Marker, MarkerKind};
use itinerary_providers::Geocoder;

use super::SessionEvent;

pub struct AddressAnnotator {
    geocoder: Arc<dyn Geocoder>,
    events: mpsc::Sender<SessionEvent>,
}

impl AddressAnnotator {
    pub fn new(geocoder: Arc<dyn Geocoder>, events: mpsc::Sender<SessionEvent>) -> Self {
        Self { geocoder, events }
    }

    /// Look up the address of a freshly created marker in the background.
    ///
    /// Route-step markers already carry their instruction as description and
    /// are skipped. Lookup failures are swallowed.
    pub fn annotate(&self, marker: &Marker) {
        if marker.id.kind() != MarkerKind::Itinerary {
            return;
        }

        let geocoder = self.geocoder.clone();
        let events = self.events.clone();
        let handle = marker.handle;
        let position = marker.position;

        tokio::spawn(async move {
            let address = match geocoder.reverse_geocode(position).await {
                Ok(address) => address,
                Err(err) => {
                    tracing::debug!("Reverse geocode for {} failed: {}", position, err);
                    String::new()
                }
            };
            if address.is_empty() {
                return;
            }
            let _ = events
                .send(SessionEvent::AddressResolved { handle, address })
                .await;
        });
    }
}
