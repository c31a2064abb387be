use thiserror::Error;

#[derive(Error, Debug)]
pub enum PizzeriaError {
    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: i32 },

    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),

    #[error("Failed to create order")]
    OrderCreateFailed,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PizzeriaError>;
