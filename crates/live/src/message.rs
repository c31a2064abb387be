use serde_json::Value;

/// Payload delivered to registered clients. Structured broadcasts carry
/// JSON, text broadcasts carry a raw string.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveMessage {
    Json(Value),
    Text(String),
}

impl LiveMessage {
    /// Render the payload as the text of one outbound WebSocket frame.
    pub fn to_frame(&self) -> String {
        match self {
            Self::Json(value) => value.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}
