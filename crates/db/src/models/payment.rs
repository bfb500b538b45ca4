use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Payment state owned by a booking (1-to-1). Gateway identifiers arrive
/// piecemeal: the session at confirmation, intent and charge via webhooks.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub session_id: Option<String>,
    pub session_url: Option<String>,
    pub payment_intent_id: Option<String>,
    pub charge_id: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
