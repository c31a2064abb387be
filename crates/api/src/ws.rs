use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, error};

use pizzeria_live::LiveMessage;

use crate::routes::AppState;

/// `GET /ws/orders`: upgrade and hand the socket to the connection task.
pub async fn orders_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// One task per connection. The socket is split: a writer task owns the
/// sink and drains the client's channel, while this task reads inbound
/// frames. Any part of the system reaches this client by sending on the
/// channel registered with the registry.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (sink, mut stream) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<LiveMessage>();

    let client_id = state.registry.connect(tx.clone()).await;
    debug!(client_id, "websocket connected");

    // Push the current pending-order view to the new client right away.
    match state.notifier.pending_payload().await {
        Ok(payload) => {
            let _ = tx.send(LiveMessage::Json(payload));
        }
        Err(e) => {
            error!(client_id, error = %e, "failed to load initial pending orders");
        }
    }

    let writer = tokio::spawn(writer_task(sink, rx));

    while let Some(message) = stream.next().await {
        match message {
            Ok(WsMessage::Text(text)) => {
                // Client chatter is echoed to every connected client.
                state.registry.broadcast_json(json!({ "Echo": text })).await;
            }
            Ok(WsMessage::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    state.registry.disconnect(client_id).await;
    drop(tx);
    let _ = writer.await;
    debug!(client_id, "websocket disconnected");
}

/// Forwards channel messages to the WebSocket sink. Ends when every sender
/// is dropped (disconnect) or the peer stops accepting frames; closing the
/// channel is what makes a dead client visible to the next broadcast.
async fn writer_task(
    mut sink: SplitSink<WebSocket, WsMessage>,
    mut rx: mpsc::UnboundedReceiver<LiveMessage>,
) {
    while let Some(message) = rx.recv().await {
        if sink.send(WsMessage::Text(message.to_frame())).await.is_err() {
            break;
        }
    }
    let _ = sink.close().await;
}
