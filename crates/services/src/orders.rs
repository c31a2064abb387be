use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

use pizzeria_db::OrderRepository;
use pizzeria_models::{Item, Order, OrderCreate, OrderInfo, OrderStatus, PizzeriaError, Result};

/// Order business logic on top of the repository: price computation,
/// creation, and status transitions.
#[derive(Clone)]
pub struct OrderService {
    repo: Arc<OrderRepository>,
}

impl OrderService {
    pub fn new(repo: Arc<OrderRepository>) -> Self {
        Self { repo }
    }

    /// The pending-order view, the payload most broadcasts carry.
    pub async fn pending_orders(&self) -> Result<Vec<OrderInfo>> {
        self.orders_with_status(OrderStatus::Pending).await
    }

    pub async fn orders_with_status(&self, status: OrderStatus) -> Result<Vec<OrderInfo>> {
        self.repo.orders_with_status(status).await
    }

    /// Price the order, persist it together with its toppings, and return
    /// the stored row.
    pub async fn create_order(&self, order: OrderCreate) -> Result<Order> {
        let order = OrderCreate {
            order_name: order.order_name.trim().to_string(),
            phone_number: order.phone_number.trim().to_string(),
            ..order
        };

        let price = self
            .order_price(order.size_id, order.style_id, &order.toppings)
            .await?;

        let created = self
            .repo
            .insert_order(&order, price)
            .await?
            .ok_or(PizzeriaError::OrderCreateFailed)?;

        info!(order_id = created.order_id, %price, "order created");
        Ok(created)
    }

    /// Transition an order's status; an unknown id is a not-found error.
    pub async fn update_status(&self, order_id: i32, status: OrderStatus) -> Result<()> {
        let touched = self.repo.update_order_status(order_id, status).await?;
        if touched == 0 {
            return Err(PizzeriaError::OrderNotFound { order_id });
        }
        info!(order_id, status = status.as_str(), "order status updated");
        Ok(())
    }

    /// Size + style + toppings price sum. An absent size/style combination
    /// prices to zero rather than failing the quote.
    pub async fn order_price(
        &self,
        size_id: i32,
        style_id: i32,
        toppings: &[i32],
    ) -> Result<Decimal> {
        let price = self.repo.order_price(size_id, style_id, toppings).await?;
        Ok(price.unwrap_or(Decimal::ZERO))
    }

    pub async fn sizes(&self) -> Result<Vec<Item>> {
        self.repo.sizes().await
    }

    pub async fn styles(&self) -> Result<Vec<Item>> {
        self.repo.styles().await
    }

    pub async fn toppings(&self) -> Result<Vec<Item>> {
        self.repo.toppings().await
    }
}
