use tutorhub_db::{
    models::User,
    queries::{bookings, payments},
};
use tutorhub_types::{BookingError, BookingType};
use uuid::Uuid;

use super::{state, BookingEngine};
use crate::gateway::CheckoutDetails;

impl BookingEngine {
    /// Confirm a pending booking. Free meetings go straight to SCHEDULED; a
    /// lesson moves to AWAITING_PAYMENT with its checkout session stored in
    /// the same commit, so a gateway failure leaves the booking untouched.
    pub async fn confirm_booking(&self, actor: &User, booking_id: Uuid) -> Result<(), BookingError> {
        let mut tx = self.pool.begin().await?;

        let booking = bookings::find_by_id_for_update(&mut tx, booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound)?;

        if !booking.involves(actor.id) {
            return Err(BookingError::Unauthorized);
        }
        state::check_confirm(booking.status, actor.id == booking.host_id)?;

        let target = state::confirm_target(booking.booking_type);

        if booking.booking_type == BookingType::Lesson {
            let existing = payments::find_by_booking_id(&mut tx, booking.id).await?;
            let details = CheckoutDetails {
                booking_id: booking.id,
                title: booking.title.clone(),
                price_cents: booking.price_cents,
                existing_session_id: existing.and_then(|p| p.session_id),
            };
            let session = self
                .gateway
                .create_or_refresh_checkout_session(&details)
                .await
                .map_err(|e| BookingError::PaymentSessionCreationFailed(e.to_string()))?;

            payments::upsert_checkout_session(
                &mut tx,
                booking.id,
                &session.session_id,
                &session.session_url,
            )
            .await?;
        }

        bookings::update_status(&mut tx, booking.id, target).await?;
        tx.commit().await?;

        tracing::debug!(
            booking_id = %booking_id,
            status = target.as_str(),
            "booking confirmed"
        );
        Ok(())
    }
}
