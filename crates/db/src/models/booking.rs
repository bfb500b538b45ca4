use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tutorhub_types::{BookingStatus, BookingType};
use uuid::Uuid;

/// A booking row together with its participant set. Every booking query
/// selects the participants via an `ARRAY(...)` subquery so the engine can
/// authorize actors without a second round trip.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[sqlx(rename = "type")]
    pub booking_type: BookingType,
    pub status: BookingStatus,
    pub host_id: Uuid,
    pub service_id: Option<Uuid>,
    pub recurring_template_id: Option<Uuid>,
    pub price_cents: i64,
    pub participant_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.participant_ids.contains(&user_id)
    }

    /// Host or participant.
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.host_id == user_id || self.is_participant(user_id)
    }

    /// Half-open interval overlap against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && self.end_time > start
    }
}

/// Insert payload for a new booking.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub booking_type: BookingType,
    pub status: BookingStatus,
    pub host_id: Uuid,
    pub participant_ids: Vec<Uuid>,
    pub service_id: Option<Uuid>,
    pub recurring_template_id: Option<Uuid>,
    pub price_cents: i64,
}
