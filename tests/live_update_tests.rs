// End-to-end behavior of the live-update fan-out: registration, broadcast
// delivery, eviction of dead clients, and bookkeeping across interleavings.

use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;

use pizzeria_live::{ConnectionRegistry, LiveMessage};

#[tokio::test]
async fn test_live_update_lifecycle() {
    let registry = ConnectionRegistry::new();
    assert_eq!(registry.connection_count().await, 0);

    // Connect client A
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let a = registry.connect(tx_a).await;
    assert_eq!(registry.connection_count().await, 1);

    // A receives exactly the broadcast payload
    registry.broadcast_json(json!({"orders_pending": []})).await;
    assert_eq!(
        rx_a.recv().await.unwrap(),
        LiveMessage::Json(json!({"orders_pending": []}))
    );

    // A goes away: the next broadcast evicts it without surfacing an error
    drop(rx_a);
    registry.broadcast_json(json!({"orders_pending": []})).await;
    assert_eq!(registry.connection_count().await, 0);

    // Disconnecting the evicted client is a no-op
    registry.disconnect(a).await;
    assert_eq!(registry.connection_count().await, 0);
}

#[tokio::test]
async fn test_membership_bookkeeping_across_interleavings() {
    let registry = ConnectionRegistry::new();

    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    let (tx_b, rx_b) = mpsc::unbounded_channel();
    let (tx_c, _rx_c) = mpsc::unbounded_channel();

    let a = registry.connect(tx_a).await;
    registry.connect(tx_b).await;
    registry.broadcast_text("one").await;
    registry.connect(tx_c).await;
    registry.disconnect(a).await;
    assert_eq!(registry.connection_count().await, 2);

    // b dies; the broadcast evicts exactly one member
    drop(rx_b);
    registry.broadcast_text("two").await;
    assert_eq!(registry.connection_count().await, 1);
}

#[tokio::test]
async fn test_broadcast_interleaved_with_concurrent_connects() {
    let registry = Arc::new(ConnectionRegistry::new());

    let mut receivers = Vec::new();
    for _ in 0..8 {
        let (tx, rx) = mpsc::unbounded_channel();
        registry.connect(tx).await;
        receivers.push(rx);
    }

    // Broadcasts racing with new connections must not corrupt the set
    let broadcaster = {
        let registry = registry.clone();
        tokio::spawn(async move {
            for i in 0..16 {
                registry.broadcast_json(json!({"seq": i})).await;
            }
        })
    };

    let mut connectors = Vec::new();
    let mut late_receivers = Vec::new();
    for _ in 0..8 {
        let (tx, rx) = mpsc::unbounded_channel();
        late_receivers.push(rx);
        let registry = registry.clone();
        connectors.push(tokio::spawn(async move { registry.connect(tx).await }));
    }

    broadcaster.await.unwrap();
    for handle in connectors {
        handle.await.unwrap();
    }

    assert_eq!(registry.connection_count().await, 16);

    // The original members saw every broadcast, in order
    for rx in &mut receivers {
        for i in 0..16 {
            assert_eq!(rx.recv().await.unwrap(), LiveMessage::Json(json!({"seq": i})));
        }
    }
}

#[tokio::test]
async fn test_structured_and_text_encodings() {
    let registry = ConnectionRegistry::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    registry.connect(tx).await;

    registry
        .broadcast_json(json!({"orders_pending": [{"order_id": 1}]}))
        .await;
    registry.broadcast_text("oven preheated").await;

    let first = rx.recv().await.unwrap();
    assert_eq!(first.to_frame(), r#"{"orders_pending":[{"order_id":1}]}"#);

    let second = rx.recv().await.unwrap();
    assert_eq!(second, LiveMessage::Text("oven preheated".to_string()));
}
