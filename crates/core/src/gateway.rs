//! Outbound port to the payment gateway. The engine sequences these calls
//! against its own transactions; implementations live in the integrations
//! crate and must be idempotent where the method docs say so.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("webhook signature verification failed")]
    InvalidSignature,
    #[error("gateway request failed: {0}")]
    Request(String),
    #[error("unexpected gateway response: {0}")]
    Response(String),
}

/// What the gateway needs to build a checkout session for a booking.
#[derive(Debug, Clone)]
pub struct CheckoutDetails {
    pub booking_id: Uuid,
    pub title: String,
    pub price_cents: i64,
    /// Session from an earlier confirm attempt, reused when still open.
    pub existing_session_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub session_id: String,
    pub session_url: String,
}

/// Payload shared by all webhook events the engine consumes.
#[derive(Debug, Clone, Default)]
pub struct EventData {
    /// Our booking id, carried in the gateway metadata.
    pub booking_id: Option<Uuid>,
    pub payment_intent_id: Option<String>,
    pub charge_id: Option<String>,
    pub failure_reason: Option<String>,
}

/// A verified, typed webhook event.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    PaymentSucceeded(EventData),
    PaymentFailed(EventData),
    ChargeRefunded(EventData),
    RefundCreated(EventData),
    RefundFailed(EventData),
    /// Event types the engine does not consume; acknowledged untouched.
    Unrecognized { event_type: String },
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a checkout session for the booking, or refresh the existing
    /// one. Idempotent: an open session for the same booking is reused.
    async fn create_or_refresh_checkout_session(
        &self,
        details: &CheckoutDetails,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Expire an open checkout session so the student can no longer pay.
    async fn expire_checkout_session(&self, session_id: &str) -> Result<(), GatewayError>;

    /// Create a refund for a captured payment. The refund lifecycle is
    /// reported back through webhooks.
    async fn create_refund(
        &self,
        payment_intent_id: &str,
        booking_id: Uuid,
    ) -> Result<(), GatewayError>;

    /// Verify the webhook signature over the raw body and parse the event.
    fn verify_and_parse_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<GatewayEvent, GatewayError>;
}
