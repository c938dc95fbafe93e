//! Routing and reverse-geocoding providers.
//!
//! The session only sees the [`RouteProvider`] and [`Geocoder`] traits; the
//! concrete HTTP clients live in their own modules.

pub mod cache;
pub mod error;
pub mod graphhopper;
pub mod nominatim;
pub mod straight_line;

use async_trait::async_trait;
use itinerary_core::{GeoPoint, RouteOptions, RouteResult};

pub use cache::CachedGeocoder;
pub use error::ProviderError;
pub use graphhopper::GraphHopperClient;
pub use nominatim::NominatimClient;
pub use straight_line::StraightLineRouter;

/// External route computation.
///
/// Failure is a normal outcome; callers degrade to an empty route.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Compute a route through `waypoints` in order (start first, destination last).
    async fn request_route(
        &self,
        waypoints: &[GeoPoint],
        options: &RouteOptions,
    ) -> Result<RouteResult, ProviderError>;
}

/// External reverse geocoding.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Human-readable address for `position`. An empty string means the
    /// provider knows nothing about the place.
    async fn reverse_geocode(&self, position: GeoPoint) -> Result<String, ProviderError>;
}
