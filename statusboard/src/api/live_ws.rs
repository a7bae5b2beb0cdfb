//! WebSocket endpoint for live status updates
//!
//! `/ws` registers the socket with the broadcast hub. The client receives the
//! current snapshot immediately and then one snapshot per completed cycle.
//! Incoming frames are ignored apart from Close.

use axum::extract::ws::{Message, WebSocket};
use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use crate::events::{BroadcastHub, ClientHandle};
use crate::AppState;

/// WebSocket upgrade handler for live status updates
pub async fn live_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub.clone()))
}

async fn handle_socket(socket: WebSocket, hub: BroadcastHub) {
    let (mut sender, mut receiver) = socket.split();
    let ClientHandle {
        id,
        receiver: mut updates,
    } = hub.connect().await;

    debug!(connection_id = %id, "Live WebSocket client connected");

    // Watch for Close / errors from the client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    debug!(error = %e, "WebSocket receive error");
                    break;
                }
                // Pong is handled automatically by axum
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut recv_task => {
                debug!(connection_id = %id, "Live WebSocket client disconnected");
                break;
            }
            payload = updates.recv() => {
                match payload {
                    Some(payload) => {
                        if let Err(e) = sender.send(Message::Text((&*payload).into())).await {
                            warn!(connection_id = %id, error = %e, "Failed to send snapshot");
                            break;
                        }
                    }
                    None => {
                        // Hub dropped us (shutdown)
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        }
    }

    recv_task.abort();
    hub.disconnect(id).await;
}
