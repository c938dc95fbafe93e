//! REST API routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use itinerary_core::{
    ClearAction, GeoPoint, MarkerHandle, PointRole, Waypoint, WaypointError, WaypointRole,
};

use crate::session::{InputEvent, InputOutcome, SessionError, SessionView};
use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/points", post(select_point))
        .route("/v1/waypoints", get(list_waypoints))
        .route("/v1/waypoints", delete(reset_waypoints))
        .route("/v1/waypoints/:role", delete(remove_waypoint))
        .route("/v1/clear-options", get(clear_options))
        .route("/v1/clear", post(clear))
        .route("/v1/scene", get(scene))
        .route("/v1/markers/:handle/open", post(open_marker))
        .route("/v1/info-window/delete", post(delete_from_info_window))
        .route("/v1/map/tap", post(tap_map))
}

// === Errors ===

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Waypoint(#[from] WaypointError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        let waypoint = match self {
            ApiError::Waypoint(err) | ApiError::Session(SessionError::Waypoint(err)) => err,
            ApiError::Session(SessionError::NothingSelected) => return StatusCode::CONFLICT,
            ApiError::Session(SessionError::UnknownMarker(_)) => return StatusCode::NOT_FOUND,
            ApiError::Session(SessionError::Closed) => return StatusCode::SERVICE_UNAVAILABLE,
        };
        match waypoint {
            WaypointError::InvalidRole { .. } => StatusCode::NOT_FOUND,
            WaypointError::UnknownRole(_) | WaypointError::InvalidPosition { .. } => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("API request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// === Request/Response types ===

#[derive(Debug, Deserialize)]
pub struct SelectPointRequest {
    pub lat: f64,
    pub lon: f64,
    pub role: PointRole,
}

#[derive(Debug, Deserialize)]
pub struct ClearRequest {
    pub action: ClearAction,
}

#[derive(Debug, Serialize)]
pub struct ClearOptionEntry {
    pub action: ClearAction,
    pub label: &'static str,
}

// === Handlers ===

async fn select_point(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectPointRequest>,
) -> Result<Json<InputOutcome>, ApiError> {
    let event = InputEvent::PointSelected {
        position: GeoPoint::new(req.lat, req.lon),
        role: req.role,
    };
    Ok(Json(state.session().input(event).await?))
}

async fn list_waypoints(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Waypoint>>, ApiError> {
    Ok(Json(state.session().waypoints().await?))
}

async fn reset_waypoints(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InputOutcome>, ApiError> {
    Ok(Json(state.session().input(InputEvent::Reset).await?))
}

async fn remove_waypoint(
    State(state): State<Arc<AppState>>,
    Path(role): Path<String>,
) -> Result<Json<InputOutcome>, ApiError> {
    let role: WaypointRole = role.parse()?;
    let outcome = state
        .session()
        .input(InputEvent::WaypointRemoved { role })
        .await?;
    Ok(Json(outcome))
}

async fn clear_options(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ClearOptionEntry>>, ApiError> {
    let options = state
        .session()
        .clear_options()
        .await?
        .into_iter()
        .map(|action| ClearOptionEntry {
            action,
            label: action.label(),
        })
        .collect();
    Ok(Json(options))
}

async fn clear(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClearRequest>,
) -> Result<Json<InputOutcome>, ApiError> {
    let outcome = state
        .session()
        .input(InputEvent::ClearActionInvoked { action: req.action })
        .await?;
    Ok(Json(outcome))
}

async fn scene(State(state): State<Arc<AppState>>) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.session().view().await?))
}

async fn open_marker(
    State(state): State<Arc<AppState>>,
    Path(handle): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state
        .session()
        .input(InputEvent::MarkerTapped {
            handle: MarkerHandle(handle),
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_from_info_window(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InputOutcome>, ApiError> {
    Ok(Json(state.session().input(InputEvent::InfoWindowDelete).await?))
}

async fn tap_map(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    state.session().input(InputEvent::MapTapped).await?;
    Ok(StatusCode::NO_CONTENT)
}
