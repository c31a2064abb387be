use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalog row: pizza size, pizza style, or topping.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
}

/// Price quote envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Price {
    pub price: Decimal,
}

/// Connection-count envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Count {
    pub count: usize,
}

/// Plain confirmation message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}
