use tutorhub_db::{
    models::User,
    queries::{bookings, payments},
};
use tutorhub_types::{BookingError, BookingStatus};
use uuid::Uuid;

use super::{state, BookingEngine};

impl BookingEngine {
    /// Cancel a booking as host or participant.
    ///
    /// When the booking sits in AWAITING_PAYMENT its checkout session is
    /// expired at the gateway before the status change commits; if expiry
    /// fails, nothing is written and the booking stays payable.
    pub async fn cancel_booking(&self, actor: &User, booking_id: Uuid) -> Result<(), BookingError> {
        let mut tx = self.pool.begin().await?;

        let booking = bookings::find_by_id_for_update(&mut tx, booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound)?;

        if !booking.involves(actor.id) {
            return Err(BookingError::Unauthorized);
        }
        if !state::can_cancel(booking.status) {
            return Err(BookingError::InvalidStatus);
        }

        if booking.status == BookingStatus::AwaitingPayment {
            let payment = payments::find_by_booking_id(&mut tx, booking.id)
                .await?
                .ok_or(BookingError::NoPaymentInfo)?;
            let session_id = payment.session_id.ok_or(BookingError::NoPaymentInfo)?;

            self.gateway
                .expire_checkout_session(&session_id)
                .await
                .map_err(|e| BookingError::PaymentCancellationFailed(e.to_string()))?;
        }

        bookings::update_status(&mut tx, booking.id, BookingStatus::Canceled).await?;
        tx.commit().await?;

        tracing::debug!(booking_id = %booking_id, "booking canceled");
        Ok(())
    }
}
