//! Offline router that connects waypoints with straight legs.
//!
//! Useful for demos and for running the server without a routing backend.

use async_trait::async_trait;

use itinerary_core::spatial::{bearing_deg, distance_m};
use itinerary_core::{GeoPoint, RouteOptions, RouteResult, RouteStatus, RouteStep};

use crate::{ProviderError, RouteProvider};

const DEFAULT_SPEED_KMH: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct StraightLineRouter {
    speed_kmh: f64,
}

impl Default for StraightLineRouter {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED_KMH)
    }
}

impl StraightLineRouter {
    pub fn new(speed_kmh: f64) -> Self {
        let speed_kmh = if speed_kmh.is_finite() && speed_kmh > 0.0 {
            speed_kmh
        } else {
            DEFAULT_SPEED_KMH
        };
        Self { speed_kmh }
    }
}

fn compass_point(bearing: f64) -> &'static str {
    const POINTS: [&str; 8] = [
        "north",
        "northeast",
        "east",
        "southeast",
        "south",
        "southwest",
        "west",
        "northwest",
    ];
    let index = ((bearing + 22.5) / 45.0).floor() as usize % POINTS.len();
    POINTS[index]
}

#[async_trait]
impl RouteProvider for StraightLineRouter {
    fn name(&self) -> &str {
        "straight-line"
    }

    async fn request_route(
        &self,
        waypoints: &[GeoPoint],
        _options: &RouteOptions,
    ) -> Result<RouteResult, ProviderError> {
        if waypoints.len() < 2 {
            return Err(ProviderError::TooFewWaypoints(waypoints.len()));
        }

        let last_leg = waypoints.len() - 2;
        let mut steps = Vec::with_capacity(waypoints.len());
        let mut length_km = 0.0;
        for (leg, pair) in waypoints.windows(2).enumerate() {
            let (from, to) = (pair[0], pair[1]);
            let leg_km = distance_m(from, to) / 1000.0;
            let target = if leg == last_leg {
                "destination".to_string()
            } else {
                format!("via point {}", leg + 1)
            };
            steps.push(RouteStep {
                instruction: format!("Head {} towards {}", compass_point(bearing_deg(from, to)), target),
                length_km: leg_km,
                duration_s: leg_km / self.speed_kmh * 3600.0,
                location: from,
            });
            length_km += leg_km;
        }
        if let Some(destination) = waypoints.last() {
            steps.push(RouteStep {
                instruction: "You have reached your destination".to_string(),
                length_km: 0.0,
                duration_s: 0.0,
                location: *destination,
            });
        }

        Ok(RouteResult {
            status: RouteStatus::Ok,
            steps,
            path: waypoints.to_vec(),
            length_km,
            duration_s: length_km / self.speed_kmh * 3600.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn one_step_per_leg_plus_arrival() {
        let router = StraightLineRouter::new(100.0);
        let route = router
            .request_route(
                &[
                    GeoPoint::new(52.5, 13.4),
                    GeoPoint::new(50.1, 8.7),
                    GeoPoint::new(48.8, 2.3),
                ],
                &RouteOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(route.steps.len(), 3);
        assert_eq!(route.steps[0].instruction, "Head southwest towards via point 1");
        assert!(route.steps[1].instruction.ends_with("towards destination"));
        assert_eq!(route.path.len(), 3);
        assert!(route.length_km > 800.0);
        assert!((route.duration_s - route.length_km * 36.0).abs() < 1e-6);
    }

    #[test]
    fn compass_points_wrap() {
        assert_eq!(compass_point(0.0), "north");
        assert_eq!(compass_point(350.0), "north");
        assert_eq!(compass_point(90.0), "east");
        assert_eq!(compass_point(225.0), "southwest");
    }
}
