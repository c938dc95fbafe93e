//! WebSocket stream of surface frames.
//!
//! A new viewer first gets a `snapshot` message with the full session view
//! and the instruction locale, then every render op and notice as it happens.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::session::SessionView;
use crate::state::AppState;

/// Handler for WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> axum::response::Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
        .into_response()
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before taking the snapshot so nothing falls in between.
    let mut rx = state.subscribe();

    let view = match state.session().view().await {
        Ok(view) => view,
        Err(err) => {
            tracing::debug!("Stream closed before snapshot: {}", err);
            return;
        }
    };
    let locale = state.config().locale.clone();
    tracing::debug!("Viewer connected (locale {})", locale);
    if socket.send(Message::Text(snapshot_frame(&view, &locale))).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
            frame = rx.recv() => {
                match frame {
                    Ok(frame) => {
                        let text = match serde_json::to_string(&frame) {
                            Ok(text) => text,
                            Err(err) => {
                                tracing::warn!("Failed to encode frame: {}", err);
                                continue;
                            }
                        };
                        if socket.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Viewer fell behind; deltas are lost, so resend the whole view.
                        tracing::debug!("Stream lagged by {} frames, resyncing", skipped);
                        let Ok(view) = state.session().view().await else {
                            break;
                        };
                        if socket.send(Message::Text(snapshot_frame(&view, &locale))).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }
}

fn snapshot_frame(view: &SessionView, locale: &str) -> String {
    json!({ "type": "snapshot", "locale": locale, "view": view }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use itinerary_core::{RouteResult, Scene};
    use serde_json::Value;

    #[test]
    fn snapshot_carries_locale_and_view() {
        let view = SessionView {
            waypoints: Vec::new(),
            route: RouteResult::empty(),
            route_sequence: 3,
            route_pending: false,
            scene: Scene::default(),
            clear_options: vec![itinerary_core::ClearAction::NothingToClear],
            info_window: None,
        };
        let frame: Value = serde_json::from_str(&snapshot_frame(&view, "de_DE")).unwrap();
        assert_eq!(frame["type"], "snapshot");
        assert_eq!(frame["locale"], "de_DE");
        assert_eq!(frame["view"]["route_sequence"], 3);
        assert_eq!(frame["view"]["clear_options"][0], "nothing_to_clear");
    }
}
