//! Live change feed: `GET /ws`
//!
//! Each connection holds one notifier subscription and receives every
//! change event as a JSON text frame. Client frames other than close are
//! ignored.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};

use crate::api::state::AppState;
use crate::services::ChangeNotifier;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let notifier = Arc::clone(&state.services.notifier);
    ws.on_upgrade(move |socket| handle_socket(socket, notifier))
}

async fn handle_socket(socket: WebSocket, notifier: Arc<ChangeNotifier>) {
    let (mut sender, mut receiver) = socket.split();
    let mut subscription = notifier.subscribe();
    tracing::debug!(subscribers = notifier.subscriber_count(), "Leaderboard viewer connected");

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!("Failed to serialize change event: {}", e),
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    tracing::debug!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    // Whichever side ends first tears down the other; the subscription
    // drops with the send task.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::debug!("Leaderboard viewer disconnected");
}
