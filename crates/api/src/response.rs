//! Error-to-response mapping. Every engine error carries a stable code; the
//! body shape is `{"error": {"code", "message"}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tutorhub_types::BookingError;

/// Wrapper so engine errors can be returned straight from handlers.
pub struct ApiError(pub BookingError);

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        // Business rejections are expected traffic; only infrastructure
        // faults page anyone.
        if err.is_infrastructure() {
            tracing::error!(code = err.code(), error = %err, "request failed");
        } else {
            tracing::debug!(code = err.code(), error = %err, "request rejected");
        }

        let status = StatusCode::from_u16(err.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = if err.is_infrastructure() {
            // Do not leak database details to clients.
            "Internal server error".to_string()
        } else {
            err.to_string()
        };
        let body = Json(json!({
            "error": {
                "code": err.code(),
                "message": message,
            }
        }));
        (status, body).into_response()
    }
}

/// Bad-request rejection for malformed inputs caught at the HTTP boundary.
pub fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError(BookingError::InvalidInput(message.into()))
}
