//! Conversion implementations from DB models to API response types.
//!
//! These From implementations centralize the conversion logic that was
//! previously duplicated across multiple route handlers.

use crate::models::{Booking, Payment, User};
use tutorhub_types::api::{BookingResponse, ParticipantInfo, PaymentInfo};

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            title: b.title,
            description: b.description,
            start_time: b.start_time,
            end_time: b.end_time,
            booking_type: b.booking_type,
            status: b.status,
            host_id: b.host_id,
            participant_ids: b.participant_ids,
            service_id: b.service_id,
            recurring_template_id: b.recurring_template_id,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

impl From<&User> for ParticipantInfo {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            image: u.image.clone(),
        }
    }
}

impl From<User> for ParticipantInfo {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            image: u.image,
        }
    }
}

impl From<Payment> for PaymentInfo {
    fn from(p: Payment) -> Self {
        Self {
            session_id: p.session_id,
            session_url: p.session_url,
            payment_intent_id: p.payment_intent_id,
            charge_id: p.charge_id,
            metadata: p.metadata,
        }
    }
}
