//! Itinerary server: one route planning session behind a REST + WebSocket API.

pub mod api;
pub mod config;
pub mod session;
pub mod state;
