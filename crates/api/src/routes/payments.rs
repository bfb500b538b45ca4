use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::middleware::AppState;
use crate::response::{self, ApiError};

/// Payment gateway webhook endpoint. Success is only returned once the
/// event has been committed; any error makes the gateway redeliver.
pub async fn gateway_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| response::bad_request("Missing stripe-signature header"))?;

    state.engine.handle_webhook(&body, signature).await?;

    Ok(StatusCode::OK)
}
