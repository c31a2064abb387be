use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::error::PizzeriaError;

/// Lifecycle of an order. Stored lowercase in the `orders.status` column
/// and rendered lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = PizzeriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "canceled" => Ok(Self::Canceled),
            other => Err(PizzeriaError::InvalidStatus(other.to_string())),
        }
    }
}

/// Request body for placing a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub order_name: String,
    pub phone_number: String,
    pub size_id: i32,
    pub style_id: i32,
    #[serde(default)]
    pub toppings: Vec<i32>,
}

/// A persisted order row as returned by `INSERT ... RETURNING *`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i32,
    pub order_name: String,
    pub phone_number: String,
    pub size_id: i32,
    pub style_id: i32,
    pub price: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Denormalized order view used for listings and the live broadcast
/// payload: joins in the size and style names plus the topping names.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderInfo {
    pub order_id: i32,
    pub order_name: String,
    pub phone_number: String,
    pub size_name: String,
    pub style_name: String,
    pub toppings: Vec<String>,
    pub price: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
