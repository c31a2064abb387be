use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use pizzeria_live::ConnectionRegistry;
use pizzeria_models::Result;

use crate::orders::OrderService;

/// Pushes the freshly recomputed pending-order list to every connected
/// client after any order-affecting mutation. Recomputation failures
/// propagate to the caller of the triggering operation; delivery failures
/// are handled inside the registry and never roll anything back.
#[derive(Clone)]
pub struct OrderNotifier {
    orders: OrderService,
    registry: Arc<ConnectionRegistry>,
}

impl OrderNotifier {
    pub fn new(orders: OrderService, registry: Arc<ConnectionRegistry>) -> Self {
        Self { orders, registry }
    }

    /// The broadcast payload: the current pending-order view.
    pub async fn pending_payload(&self) -> Result<Value> {
        let pending = self.orders.pending_orders().await?;
        Ok(json!({ "orders_pending": pending }))
    }

    /// Recompute the pending-order view and broadcast it.
    pub async fn notify_order_update(&self) -> Result<()> {
        debug!("notifying clients about order update");
        let payload = self.pending_payload().await?;
        self.registry.broadcast_json(payload).await;
        Ok(())
    }
}
