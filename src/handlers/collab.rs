use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};

use crate::services::metrics;
use crate::services::CollabHub;
use crate::startup::AppState;

/// Raw signaling relay: every text frame fans out to all sockets in the
/// document's room, sender included. No auth, no validation, no persistence.
pub async fn collab_ws(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    let hub = state.collab.clone();
    ws.on_upgrade(move |socket| relay(socket, hub, document_id))
}

async fn relay(socket: WebSocket, hub: CollabHub, document_id: String) {
    metrics::collab_session_opened();
    let (room_tx, mut room_rx) = hub.join(&document_id);
    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut outbound = tokio::spawn(async move {
        // A lagged receiver drops the socket; the relay makes no delivery
        // guarantees.
        while let Ok(text) = room_rx.recv().await {
            if ws_tx.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let mut inbound = tokio::spawn(async move {
        while let Some(Ok(message)) = ws_rx.next().await {
            if let Message::Text(text) = message {
                if room_tx.send(text).is_err() {
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut outbound => inbound.abort(),
        _ = &mut inbound => outbound.abort(),
    }

    hub.leave(&document_id);
    metrics::collab_session_closed();
    tracing::debug!(document_id = %document_id, "Collab socket closed");
}
