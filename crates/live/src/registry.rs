use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

use crate::message::LiveMessage;

/// Identity of one registered client, used for removal.
pub type ClientId = u64;

/// Sender half of a client's outbound channel. The WebSocket writer task
/// owns the receiving half; a closed channel means the client is gone.
pub type ClientSender = mpsc::UnboundedSender<LiveMessage>;

struct Client {
    id: ClientId,
    sender: ClientSender,
}

/// Registry of live WebSocket clients. Constructed once at startup and
/// shared as `Arc<ConnectionRegistry>`; connect, disconnect, and broadcast
/// may run concurrently from different connection tasks.
///
/// The lock is held only to add, remove, or snapshot members — never across
/// a send, so one slow or dead client cannot serialize the others' I/O.
pub struct ConnectionRegistry {
    clients: RwLock<Vec<Client>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a newly accepted client and return its id. Broadcasts
    /// already in flight may or may not include it.
    pub async fn connect(&self, sender: ClientSender) -> ClientId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut clients = self.clients.write().await;
        clients.push(Client { id, sender });
        debug!(client_id = id, connections = clients.len(), "client connected");
        id
    }

    /// Remove a client. Idempotent: removing an id already evicted by a
    /// broadcast is a no-op. Dropping the stored sender closes the client's
    /// outbound channel, which lets its writer task shut the socket down.
    pub async fn disconnect(&self, id: ClientId) {
        let mut clients = self.clients.write().await;
        let before = clients.len();
        clients.retain(|client| client.id != id);
        if clients.len() < before {
            debug!(client_id = id, connections = clients.len(), "client disconnected");
        }
    }

    /// Broadcast a structured (JSON) payload to every registered client.
    pub async fn broadcast_json(&self, value: Value) {
        self.broadcast(LiveMessage::Json(value)).await;
    }

    /// Broadcast a plain-text payload to every registered client.
    pub async fn broadcast_text(&self, text: impl Into<String>) {
        self.broadcast(LiveMessage::Text(text.into())).await;
    }

    /// Deliver `message` to every member, best effort. Members whose channel
    /// is closed are evicted afterwards; one dead member never blocks
    /// delivery to the rest, and no failure reaches the caller.
    async fn broadcast(&self, message: LiveMessage) {
        let snapshot: Vec<(ClientId, ClientSender)> = {
            let clients = self.clients.read().await;
            clients
                .iter()
                .map(|client| (client.id, client.sender.clone()))
                .collect()
        };

        let mut dead = Vec::new();
        for (id, sender) in snapshot {
            if sender.is_closed() {
                warn!(client_id = id, "client not ready, evicting");
                dead.push(id);
                continue;
            }
            if sender.send(message.clone()).is_err() {
                warn!(client_id = id, "send to client failed, evicting");
                dead.push(id);
            }
        }

        if !dead.is_empty() {
            let mut clients = self.clients.write().await;
            clients.retain(|client| !dead.contains(&client.id));
            debug!(evicted = dead.len(), connections = clients.len(), "evicted dead clients");
        }
    }

    /// Number of currently registered clients. A point-in-time snapshot that
    /// may be stale by the time the caller acts on it.
    pub async fn connection_count(&self) -> usize {
        self.clients.read().await.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_connect_and_disconnect_track_count() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.connection_count().await, 0);

        let (tx_a, _rx_a) = mpsc::unbounded_channel();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        let a = registry.connect(tx_a).await;
        let b = registry.connect(tx_b).await;
        assert_ne!(a, b);
        assert_eq!(registry.connection_count().await, 2);

        registry.disconnect(a).await;
        assert_eq!(registry.connection_count().await, 1);

        // Removing an absent id is a no-op.
        registry.disconnect(a).await;
        assert_eq!(registry.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_live_clients() {
        let registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        registry.connect(tx_a).await;
        registry.connect(tx_b).await;

        registry.broadcast_json(json!({"orders_pending": []})).await;

        let expected = LiveMessage::Json(json!({"orders_pending": []}));
        assert_eq!(rx_a.recv().await.unwrap(), expected);
        assert_eq!(rx_b.recv().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_dead_client_is_evicted_without_aborting_broadcast() {
        let registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, rx_b) = mpsc::unbounded_channel();
        let (tx_c, mut rx_c) = mpsc::unbounded_channel();
        registry.connect(tx_a).await;
        let b = registry.connect(tx_b).await;
        registry.connect(tx_c).await;

        // Dropping the receiver closes b's channel: the liveness check fails.
        drop(rx_b);

        registry.broadcast_text("order up").await;

        assert_eq!(rx_a.recv().await.unwrap(), LiveMessage::Text("order up".to_string()));
        assert_eq!(rx_c.recv().await.unwrap(), LiveMessage::Text("order up".to_string()));
        assert_eq!(registry.connection_count().await, 2);

        // Disconnecting the already-evicted client changes nothing.
        registry.disconnect(b).await;
        assert_eq!(registry.connection_count().await, 2);
    }

    #[tokio::test]
    async fn test_back_to_back_broadcasts_preserve_order() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.connect(tx).await;

        registry.broadcast_text("first").await;
        registry.broadcast_text("second").await;

        assert_eq!(rx.recv().await.unwrap(), LiveMessage::Text("first".to_string()));
        assert_eq!(rx.recv().await.unwrap(), LiveMessage::Text("second".to_string()));
    }

    #[tokio::test]
    async fn test_concurrent_connects_all_register() {
        let registry = std::sync::Arc::new(ConnectionRegistry::new());

        let mut handles = Vec::new();
        let mut receivers = Vec::new();
        for _ in 0..32 {
            let (tx, rx) = mpsc::unbounded_channel();
            receivers.push(rx);
            let registry = registry.clone();
            handles.push(tokio::spawn(async move { registry.connect(tx).await }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 32);
        assert_eq!(registry.connection_count().await, 32);
    }
}
