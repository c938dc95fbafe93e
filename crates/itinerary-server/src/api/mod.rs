//! API routes for the itinerary server.

mod routes;
pub mod ws;

pub use routes::ApiError;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}
