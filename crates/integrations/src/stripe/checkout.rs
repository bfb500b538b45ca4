//! Checkout-session and refund calls against the Stripe REST API.
//!
//! Form-encoded requests with basic auth; the booking id travels in the
//! session and payment-intent metadata so webhooks can find their booking.

use serde::Deserialize;
use tutorhub_core::gateway::{CheckoutDetails, CheckoutSession, GatewayError};
use uuid::Uuid;

use super::StripeGateway;

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
    status: Option<String>,
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::Request(e.to_string()))?;
    if !status.is_success() {
        return Err(GatewayError::Response(format!("{status}: {body}")));
    }
    serde_json::from_str(&body).map_err(|e| GatewayError::Response(e.to_string()))
}

/// Create a checkout session for the booking, reusing an existing open one.
pub async fn create_or_refresh_session(
    gateway: &StripeGateway,
    details: &CheckoutDetails,
) -> Result<CheckoutSession, GatewayError> {
    if let Some(existing_id) = &details.existing_session_id {
        if let Some(open) = fetch_open_session(gateway, existing_id).await? {
            tracing::debug!(session_id = %open.session_id, "reusing open checkout session");
            return Ok(open);
        }
    }

    let booking_id = details.booking_id.to_string();
    let price = details.price_cents.to_string();
    let success_url = format!("{}/bookings?payment=success", gateway.config.frontend_url);
    let cancel_url = format!("{}/bookings?payment=canceled", gateway.config.frontend_url);
    let params: Vec<(&str, &str)> = vec![
        ("mode", "payment"),
        ("line_items[0][price_data][currency]", "usd"),
        ("line_items[0][price_data][unit_amount]", &price),
        ("line_items[0][price_data][product_data][name]", &details.title),
        ("line_items[0][quantity]", "1"),
        ("metadata[booking_id]", &booking_id),
        ("payment_intent_data[metadata][booking_id]", &booking_id),
        ("success_url", &success_url),
        ("cancel_url", &cancel_url),
    ];

    let response = gateway
        .http
        .post(format!("{}/v1/checkout/sessions", gateway.config.api_base_url))
        .basic_auth(&gateway.config.secret_key, Option::<&str>::None)
        .form(&params)
        .send()
        .await
        .map_err(|e| GatewayError::Request(e.to_string()))?;

    let session: SessionResponse = read_json(response).await?;
    let url = session
        .url
        .ok_or_else(|| GatewayError::Response("checkout session has no url".to_string()))?;
    Ok(CheckoutSession {
        session_id: session.id,
        session_url: url,
    })
}

/// Look up a previously stored session; `Some` only while it is still open.
async fn fetch_open_session(
    gateway: &StripeGateway,
    session_id: &str,
) -> Result<Option<CheckoutSession>, GatewayError> {
    let response = gateway
        .http
        .get(format!(
            "{}/v1/checkout/sessions/{session_id}",
            gateway.config.api_base_url
        ))
        .basic_auth(&gateway.config.secret_key, Option::<&str>::None)
        .send()
        .await
        .map_err(|e| GatewayError::Request(e.to_string()))?;

    // A missing or expired session simply means a fresh one is needed.
    if !response.status().is_success() {
        return Ok(None);
    }
    let session: SessionResponse = read_json(response).await?;
    match (session.status.as_deref(), session.url) {
        (Some("open"), Some(url)) => Ok(Some(CheckoutSession {
            session_id: session.id,
            session_url: url,
        })),
        _ => Ok(None),
    }
}

/// Expire an open checkout session so it can no longer be paid.
pub async fn expire_session(gateway: &StripeGateway, session_id: &str) -> Result<(), GatewayError> {
    let response = gateway
        .http
        .post(format!(
            "{}/v1/checkout/sessions/{session_id}/expire",
            gateway.config.api_base_url
        ))
        .basic_auth(&gateway.config.secret_key, Option::<&str>::None)
        .send()
        .await
        .map_err(|e| GatewayError::Request(e.to_string()))?;

    let _: SessionResponse = read_json(response).await?;
    Ok(())
}

/// Create a refund for a captured payment intent.
pub async fn create_refund(
    gateway: &StripeGateway,
    payment_intent_id: &str,
    booking_id: Uuid,
) -> Result<(), GatewayError> {
    #[derive(Debug, Deserialize)]
    struct RefundResponse {
        #[allow(dead_code)]
        id: String,
    }

    let booking_id = booking_id.to_string();
    let params: Vec<(&str, &str)> = vec![
        ("payment_intent", payment_intent_id),
        ("metadata[booking_id]", &booking_id),
    ];

    let response = gateway
        .http
        .post(format!("{}/v1/refunds", gateway.config.api_base_url))
        .basic_auth(&gateway.config.secret_key, Option::<&str>::None)
        .form(&params)
        .send()
        .await
        .map_err(|e| GatewayError::Request(e.to_string()))?;

    let _: RefundResponse = read_json(response).await?;
    Ok(())
}
