//! GraphHopper-compatible routing client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use itinerary_core::spatial::path_length_km;
use itinerary_core::{GeoPoint, RouteOptions, RouteResult, RouteStatus, RouteStep};

use crate::{ProviderError, RouteProvider};

/// HTTP client for a GraphHopper `/route` endpoint.
pub struct GraphHopperClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    profile: String,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    #[serde(default)]
    paths: Vec<ResponsePath>,
}

#[derive(Debug, Deserialize)]
struct ResponsePath {
    /// Meters. Some self-hosted setups leave it out.
    #[serde(default)]
    distance: Option<f64>,
    /// Milliseconds.
    time: u64,
    points: ResponsePoints,
    #[serde(default)]
    instructions: Vec<ResponseInstruction>,
}

#[derive(Debug, Deserialize)]
struct ResponsePoints {
    /// `[lon, lat]` or `[lon, lat, ele]`.
    coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct ResponseInstruction {
    #[serde(default)]
    text: String,
    distance: f64,
    time: u64,
    interval: [usize; 2],
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

impl GraphHopperClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        profile: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            profile: profile.into(),
        })
    }

    fn query(&self, waypoints: &[GeoPoint], options: &RouteOptions) -> Vec<(&'static str, String)> {
        let mut query: Vec<(&'static str, String)> = waypoints
            .iter()
            .map(|p| ("point", format!("{},{}", p.lat, p.lon)))
            .collect();
        query.push(("profile", self.profile.clone()));
        query.push(("locale", options.locale.clone()));
        query.push(("instructions", "true".to_string()));
        query.push(("calc_points", "true".to_string()));
        query.push(("points_encoded", "false".to_string()));
        if let Some(key) = self.api_key.as_deref() {
            query.push(("key", key.to_string()));
        }
        query
    }
}

#[async_trait]
impl RouteProvider for GraphHopperClient {
    fn name(&self) -> &str {
        "graphhopper"
    }

    async fn request_route(
        &self,
        waypoints: &[GeoPoint],
        options: &RouteOptions,
    ) -> Result<RouteResult, ProviderError> {
        if waypoints.len() < 2 {
            return Err(ProviderError::TooFewWaypoints(waypoints.len()));
        }

        let url = format!("{}/route", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&self.query(waypoints, options))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.is_client_error() {
                if let Ok(ErrorResponse { message: Some(message) }) = serde_json::from_str(&body) {
                    return Err(ProviderError::NoRoute(message));
                }
            }
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: RouteResponse = response.json().await?;
        into_route(body)
    }
}

fn into_route(response: RouteResponse) -> Result<RouteResult, ProviderError> {
    let path = response
        .paths
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::NoRoute("response contained no paths".to_string()))?;

    let geometry = path
        .points
        .coordinates
        .iter()
        .map(|coord| match coord.as_slice() {
            [lon, lat, ..] => Ok(GeoPoint::new(*lat, *lon)),
            _ => Err(ProviderError::InvalidResponse(format!(
                "coordinate with {} components",
                coord.len()
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let steps = path
        .instructions
        .iter()
        .map(|instruction| {
            let location = geometry
                .get(instruction.interval[0])
                .copied()
                .ok_or_else(|| {
                    ProviderError::InvalidResponse(format!(
                        "instruction interval {:?} outside path of {} points",
                        instruction.interval,
                        geometry.len()
                    ))
                })?;
            Ok(RouteStep {
                instruction: instruction.text.clone(),
                length_km: instruction.distance / 1000.0,
                duration_s: instruction.time as f64 / 1000.0,
                location,
            })
        })
        .collect::<Result<Vec<_>, ProviderError>>()?;

    Ok(RouteResult {
        status: RouteStatus::Ok,
        steps,
        length_km: path
            .distance
            .map(|meters| meters / 1000.0)
            .unwrap_or_else(|| path_length_km(&geometry)),
        duration_s: path.time as f64 / 1000.0,
        path: geometry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::RawQuery, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};

    fn fixture() -> Value {
        json!({
            "paths": [{
                "distance": 1523.4,
                "time": 245000,
                "points": {
                    "type": "LineString",
                    "coordinates": [[13.4, 52.5], [13.41, 52.51], [13.42, 52.52]]
                },
                "instructions": [
                    {"text": "Continue onto Unter den Linden", "distance": 800.0, "time": 120000, "interval": [0, 1], "sign": 0},
                    {"text": "Turn left onto Friedrichstraße", "distance": 723.4, "time": 125000, "interval": [1, 2], "sign": -2},
                    {"text": "Arrive at destination", "distance": 0.0, "time": 0, "interval": [2, 2], "sign": 4}
                ]
            }]
        })
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn parses_paths_and_instructions() {
        let response: RouteResponse = serde_json::from_value(fixture()).unwrap();
        let route = into_route(response).unwrap();

        assert_eq!(route.status, RouteStatus::Ok);
        assert_eq!(route.path.len(), 3);
        assert_eq!(route.path[0], GeoPoint::new(52.5, 13.4));
        assert_eq!(route.steps.len(), 3);
        assert_eq!(route.steps[1].instruction, "Turn left onto Friedrichstraße");
        assert_eq!(route.steps[1].location, GeoPoint::new(52.51, 13.41));
        assert!((route.steps[0].length_km - 0.8).abs() < 1e-9);
        assert!((route.duration_s - 245.0).abs() < 1e-9);
    }

    #[test]
    fn empty_paths_mean_no_route() {
        let response: RouteResponse = serde_json::from_value(json!({"paths": []})).unwrap();
        assert!(matches!(into_route(response), Err(ProviderError::NoRoute(_))));
    }

    #[test]
    fn out_of_range_interval_is_rejected() {
        let mut body = fixture();
        body["paths"][0]["instructions"][0]["interval"] = json!([7, 8]);
        let response: RouteResponse = serde_json::from_value(body).unwrap();
        assert!(matches!(into_route(response), Err(ProviderError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn sends_points_in_order_with_locale() {
        let app = Router::new().route(
            "/route",
            get(|RawQuery(query): RawQuery| async move {
                let query = query.unwrap_or_default();
                let points: Vec<&str> = query
                    .split('&')
                    .filter(|pair| pair.starts_with("point="))
                    .collect();
                if points.len() == 3
                    && points[0].contains("52.5")
                    && points[2].contains("48.8")
                    && query.contains("locale=de")
                    && query.contains("points_encoded=false")
                {
                    (StatusCode::OK, Json(fixture()))
                } else {
                    (StatusCode::BAD_REQUEST, Json(json!({"message": query})))
                }
            }),
        );
        let base = serve(app).await;
        let client = GraphHopperClient::new(base, None, "car", Duration::from_secs(5)).unwrap();
        let options = RouteOptions {
            locale: "de".to_string(),
        };
        let route = client
            .request_route(
                &[
                    GeoPoint::new(52.5, 13.4),
                    GeoPoint::new(50.1, 8.7),
                    GeoPoint::new(48.8, 2.3),
                ],
                &options,
            )
            .await
            .unwrap();
        assert_eq!(route.steps.len(), 3);
    }

    #[tokio::test]
    async fn client_error_message_becomes_no_route() {
        let app = Router::new().route(
            "/route",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"message": "Cannot find point 1"})),
                )
            }),
        );
        let base = serve(app).await;
        let client = GraphHopperClient::new(base, Some("  ".to_string()), "car", Duration::from_secs(5)).unwrap();
        let err = client
            .request_route(
                &[GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)],
                &RouteOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NoRoute(message) if message == "Cannot find point 1"));
    }

    #[tokio::test]
    async fn single_waypoint_is_rejected_without_a_call() {
        let client = GraphHopperClient::new("http://127.0.0.1:9", None, "car", Duration::from_secs(1)).unwrap();
        let err = client
            .request_route(&[GeoPoint::new(0.0, 0.0)], &RouteOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::TooFewWaypoints(1)));
    }
}
