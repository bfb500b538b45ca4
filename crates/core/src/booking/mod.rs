pub mod cancel;
pub mod confirm;
pub mod conflict;
pub mod create;
pub mod get;
pub mod refund;
pub mod reschedule;
pub mod state;

use crate::clock::Clock;
use crate::gateway::PaymentGateway;
use sqlx::PgPool;
use std::sync::Arc;

/// Flat price handed to the payment gateway for a lesson. Pricing proper
/// lives in the service catalog, outside the engine.
pub const DEFAULT_LESSON_PRICE_CENTS: i64 = 5_000;

/// The booking engine. Owns its collaborators; constructed once at startup
/// and shared across requests. Every mutating command runs inside a single
/// repository transaction with a row lock on the booking it touches.
#[derive(Clone)]
pub struct BookingEngine {
    pub(crate) pool: PgPool,
    pub(crate) gateway: Arc<dyn PaymentGateway>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl BookingEngine {
    pub fn new(pool: PgPool, gateway: Arc<dyn PaymentGateway>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            gateway,
            clock,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
