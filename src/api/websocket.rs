//! WebSocket handler for the chat room
//!
//! One full-duplex connection per client. A forward task drains the
//! connection's room queue into the socket while the receive loop pumps
//! inbound frames into the relay; whichever side finishes first tears the
//! other down, and the connection is detached from the room on the way out.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt};

use super::ApiState;
use crate::registry::ConnectionId;
use crate::relay::protocol::ClientEvent;

/// Build the WebSocket router
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new().route("/ws", get(ws_upgrade)).with_state(state)
}

/// Handle the WebSocket upgrade request
async fn ws_upgrade(State(state): State<Arc<ApiState>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one WebSocket connection for its whole lifetime
async fn handle_socket(socket: WebSocket, state: Arc<ApiState>) {
    let conn_id = ConnectionId::new();
    let (mut sender, mut receiver) = socket.split();

    tracing::info!(conn = %conn_id, "connection opened");

    let mut rx = state.relay.attach(conn_id).await;

    // Forward room events to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!(error = %e, "failed to encode event"),
            }
        }
    });

    // Pump inbound frames into the relay
    let relay = Arc::clone(&state.relay);
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => relay.handle(conn_id, event).await,
                    Err(e) => {
                        tracing::debug!(conn = %conn_id, error = %e, "ignoring unparseable frame");
                    }
                },
                Message::Close(_) => {
                    tracing::info!(conn = %conn_id, "closed by client");
                    break;
                }
                _ => {}
            }
        }
    });

    // Whichever task finishes first tears down the other
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.relay.detach(conn_id).await;
    tracing::info!(conn = %conn_id, "connection closed");
}
