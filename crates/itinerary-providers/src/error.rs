//! Provider error type.

use std::time::Duration;

/// Errors that can occur while talking to a routing or geocoding provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("no route found: {0}")]
    NoRoute(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("need at least 2 waypoints, got {0}")]
    TooFewWaypoints(usize),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}
