//! Itinerary server client.

use anyhow::{bail, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

use itinerary_core::{ClearAction, PointRole, RouteResult, Scene, Waypoint, WaypointRole};

/// Client for a running itinerary server.
pub struct ItineraryClient {
    pub(crate) base_url: String,
    pub(crate) client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SelectPointRequest {
    lat: f64,
    lon: f64,
    role: PointRole,
}

#[derive(Debug, Serialize)]
struct ClearRequest {
    action: ClearAction,
}

/// Server reply to an edit.
#[derive(Debug, Clone, Deserialize)]
pub struct Outcome {
    pub waypoints: Vec<Waypoint>,
    pub route_sequence: u64,
    pub route_pending: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClearOption {
    pub action: ClearAction,
    pub label: String,
}

/// The parts of the session view the CLI prints.
#[derive(Debug, Clone, Deserialize)]
pub struct View {
    pub waypoints: Vec<Waypoint>,
    pub route: RouteResult,
    pub route_sequence: u64,
    pub route_pending: bool,
    pub scene: Scene,
    pub clear_options: Vec<ClearAction>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ItineraryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn select_point(&self, role: PointRole, lat: f64, lon: f64) -> Result<Outcome> {
        let request = SelectPointRequest { lat, lon, role };
        let builder = self.client.post(self.url("/v1/points")).json(&request);
        read(builder).await
    }

    pub async fn remove(&self, role: WaypointRole) -> Result<Outcome> {
        let path = format!("/v1/waypoints/{}", role);
        read(self.client.delete(self.url(&path))).await
    }

    pub async fn reset(&self) -> Result<Outcome> {
        read(self.client.delete(self.url("/v1/waypoints"))).await
    }

    pub async fn waypoints(&self) -> Result<Vec<Waypoint>> {
        read(self.client.get(self.url("/v1/waypoints"))).await
    }

    pub async fn clear_options(&self) -> Result<Vec<ClearOption>> {
        read(self.client.get(self.url("/v1/clear-options"))).await
    }

    pub async fn clear(&self, action: ClearAction) -> Result<Outcome> {
        let builder = self
            .client
            .post(self.url("/v1/clear"))
            .json(&ClearRequest { action });
        read(builder).await
    }

    pub async fn view(&self) -> Result<View> {
        read(self.client.get(self.url("/v1/scene"))).await
    }

    /// Poll the view until no route request is pending.
    pub async fn wait_for_route(&self, timeout: Duration) -> Result<View> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let view = self.view().await?;
            if !view.route_pending {
                return Ok(view);
            }
            if tokio::time::Instant::now() >= deadline {
                bail!("route {} still pending after {:?}", view.route_sequence, timeout);
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn read<T: DeserializeOwned>(builder: reqwest::RequestBuilder) -> Result<T> {
    let response = builder.send().await?;
    let status = response.status();
    if !status.is_success() {
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        bail!("server returned {}: {}", status.as_u16(), message);
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        routing::{delete, get},
        Json, Router,
    };
    use serde_json::json;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn error_bodies_become_messages() {
        let app = Router::new().route(
            "/v1/waypoints/:role",
            delete(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "via point via-3 does not exist" })),
                )
            }),
        );
        let client = ItineraryClient::new(serve(app).await);

        let err = client.remove(WaypointRole::Via(3)).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "server returned 404: via point via-3 does not exist"
        );
    }

    #[tokio::test]
    async fn clear_options_are_decoded() {
        let app = Router::new().route(
            "/v1/clear-options",
            get(|| async {
                Json(json!([
                    { "action": "clear_route_only", "label": "Clear Route Only" },
                    { "action": "clear_all", "label": "Clear All" }
                ]))
            }),
        );
        let client = ItineraryClient::new(serve(app).await);

        let options = client.clear_options().await.unwrap();
        let actions: Vec<_> = options.iter().map(|option| option.action).collect();
        assert_eq!(actions, vec![ClearAction::ClearRouteOnly, ClearAction::ClearAll]);
        assert_eq!(options[1].label, "Clear All");
    }
}
