use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
    Router,
};
use serde::Deserialize;
use std::env;
use std::sync::Arc;

use pizzeria_live::ConnectionRegistry;
use pizzeria_models::{
    Count, Item, Message, Order, OrderCreate, OrderInfo, OrderStatus, PizzeriaError, Price,
};
use pizzeria_services::{OrderNotifier, OrderService};

use crate::error::ApiError;
use crate::ws;

/// Shared application state: constructed once at startup, cloned per
/// request. No lazily-initialized globals anywhere.
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService,
    pub notifier: OrderNotifier,
    pub registry: Arc<ConnectionRegistry>,
}

#[derive(Deserialize)]
pub struct ListOrdersParams {
    pub order_status: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateOrderParams {
    pub order_status: String,
}

#[derive(Deserialize)]
pub struct PriceParams {
    pub size_id: i32,
    pub style_id: i32,
    /// Comma-separated topping ids, e.g. `toppings=1,4,7`.
    pub toppings: Option<String>,
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/version", get(get_version))
        .route("/api/connection-count", get(get_connection_count))
        .route("/api/orders", get(get_orders).post(create_order))
        .route("/api/orders/:order_id", patch(update_order))
        .route("/api/sizes", get(get_sizes))
        .route("/api/styles", get(get_styles))
        .route("/api/toppings", get(get_toppings))
        .route("/api/price", get(calculate_price))
        .route("/ws/orders", get(ws::orders_ws))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn get_version() -> Json<String> {
    Json(env::var("APP_VERSION").unwrap_or_else(|_| "0.0.0".to_string()))
}

async fn get_connection_count(State(state): State<AppState>) -> Json<Count> {
    Json(Count {
        count: state.registry.connection_count().await,
    })
}

async fn get_orders(
    Query(params): Query<ListOrdersParams>,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderInfo>>, ApiError> {
    let status = match params.order_status.as_deref() {
        Some(raw) => raw.parse::<OrderStatus>()?,
        None => OrderStatus::Pending,
    };
    let orders = state.orders.orders_with_status(status).await?;
    Ok(Json(orders))
}

async fn get_sizes(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ApiError> {
    Ok(Json(state.orders.sizes().await?))
}

async fn get_styles(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ApiError> {
    Ok(Json(state.orders.styles().await?))
}

async fn get_toppings(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ApiError> {
    Ok(Json(state.orders.toppings().await?))
}

async fn create_order(
    State(state): State<AppState>,
    Json(order): Json<OrderCreate>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let created = state.orders.create_order(order).await?;
    state.notifier.notify_order_update().await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_order(
    Path(order_id): Path<i32>,
    Query(params): Query<UpdateOrderParams>,
    State(state): State<AppState>,
) -> Result<Json<Message>, ApiError> {
    let status = params.order_status.parse::<OrderStatus>()?;
    state.orders.update_status(order_id, status).await?;
    state.notifier.notify_order_update().await?;
    Ok(Json(Message {
        message: format!("Order #{} {}", order_id, status),
    }))
}

async fn calculate_price(
    Query(params): Query<PriceParams>,
    State(state): State<AppState>,
) -> Result<Json<Price>, ApiError> {
    let toppings = parse_toppings(params.toppings.as_deref())?;
    let price = state
        .orders
        .order_price(params.size_id, params.style_id, &toppings)
        .await?;
    Ok(Json(Price { price }))
}

/// Parse the comma-separated `toppings` query parameter.
fn parse_toppings(raw: Option<&str>) -> Result<Vec<i32>, PizzeriaError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>()
                .map_err(|_| PizzeriaError::InvalidQuery(format!("toppings: {part}")))
        })
        .collect()
}
