use tutorhub_db::{
    models::User,
    queries::{bookings, payments},
};
use tutorhub_types::{BookingError, BookingStatus};
use uuid::Uuid;

use super::BookingEngine;

impl BookingEngine {
    /// Request a refund for a scheduled, paid lesson. The refund is created
    /// at the gateway before AWAITING_REFUND commits; the rest of the refund
    /// lifecycle arrives through webhooks.
    pub async fn request_refund(&self, actor: &User, booking_id: Uuid) -> Result<(), BookingError> {
        let mut tx = self.pool.begin().await?;

        let booking = bookings::find_by_id_for_update(&mut tx, booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound)?;

        if !booking.involves(actor.id) {
            return Err(BookingError::Unauthorized);
        }
        if booking.status != BookingStatus::Scheduled {
            return Err(BookingError::InvalidStatus);
        }

        let payment = payments::find_by_booking_id(&mut tx, booking.id)
            .await?
            .ok_or(BookingError::NoPaymentInfo)?;
        let payment_intent_id = payment
            .payment_intent_id
            .ok_or(BookingError::NoPaymentInfo)?;

        self.gateway
            .create_refund(&payment_intent_id, booking.id)
            .await
            .map_err(|e| BookingError::RefundProcessingFailed(e.to_string()))?;

        bookings::update_status(&mut tx, booking.id, BookingStatus::AwaitingRefund).await?;
        tx.commit().await?;

        tracing::debug!(booking_id = %booking_id, "refund requested");
        Ok(())
    }
}
