use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use pizzeria_models::PizzeriaError;

/// Maps service errors onto HTTP responses with a `{"detail": ...}` body.
pub struct ApiError(PizzeriaError);

impl From<PizzeriaError> for ApiError {
    fn from(error: PizzeriaError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PizzeriaError::OrderNotFound { .. } => StatusCode::NOT_FOUND,
            PizzeriaError::InvalidStatus(_) | PizzeriaError::InvalidQuery(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = ApiError(PizzeriaError::OrderNotFound { order_id: 42 }).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_status_maps_to_422() {
        let response =
            ApiError(PizzeriaError::InvalidStatus("delivered".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_other_errors_map_to_500() {
        let response = ApiError(PizzeriaError::OrderCreateFailed).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
