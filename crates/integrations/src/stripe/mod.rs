pub mod checkout;
pub mod webhooks;

use async_trait::async_trait;
use tutorhub_core::gateway::{
    CheckoutDetails, CheckoutSession, GatewayError, GatewayEvent, PaymentGateway,
};
use uuid::Uuid;

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_live_... or sk_test_...).
    pub(crate) secret_key: String,
    /// Webhook signing secret (whsec_...).
    pub(crate) webhook_secret: String,
    /// Base for the success/cancel redirect URLs.
    pub(crate) frontend_url: String,
    /// Overridable for tests against a stub server.
    pub(crate) api_base_url: String,
}

impl StripeConfig {
    pub fn new(
        secret_key: impl Into<String>,
        webhook_secret: impl Into<String>,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            secret_key: secret_key.into(),
            webhook_secret: webhook_secret.into(),
            frontend_url: frontend_url.into(),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Stripe implementation of the engine's payment gateway port.
pub struct StripeGateway {
    pub(crate) config: StripeConfig,
    pub(crate) http: reqwest::Client,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_or_refresh_checkout_session(
        &self,
        details: &CheckoutDetails,
    ) -> Result<CheckoutSession, GatewayError> {
        checkout::create_or_refresh_session(self, details).await
    }

    async fn expire_checkout_session(&self, session_id: &str) -> Result<(), GatewayError> {
        checkout::expire_session(self, session_id).await
    }

    async fn create_refund(
        &self,
        payment_intent_id: &str,
        booking_id: Uuid,
    ) -> Result<(), GatewayError> {
        checkout::create_refund(self, payment_intent_id, booking_id).await
    }

    fn verify_and_parse_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<GatewayEvent, GatewayError> {
        webhooks::verify_and_parse(&self.config.webhook_secret, payload, signature)
    }
}
