use tutorhub_db::{models::User, queries::bookings};
use tutorhub_types::{api::RescheduleBookingRequest, parse_utc, BookingError};
use uuid::Uuid;

use super::{state, BookingEngine};

impl BookingEngine {
    /// Move a pending booking to a new start time and hand the confirmation
    /// back to the other side.
    pub async fn reschedule_booking(
        &self,
        actor: &User,
        booking_id: Uuid,
        req: &RescheduleBookingRequest,
    ) -> Result<(), BookingError> {
        let start_time = parse_utc(&req.start_time).ok_or(BookingError::InvalidDate)?;
        if start_time < self.clock.now() {
            return Err(BookingError::PastTime);
        }

        let mut tx = self.pool.begin().await?;

        let booking = bookings::find_by_id_for_update(&mut tx, booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound)?;

        if !booking.involves(actor.id) {
            return Err(BookingError::Unauthorized);
        }
        if start_time == booking.start_time {
            return Err(BookingError::SameTime);
        }

        let next_status = state::reschedule_transition(booking.status, actor.id == booking.host_id)?;

        let end_time = start_time + booking.booking_type.duration();
        let conflicts = bookings::find_conflicts(
            &mut tx,
            booking.host_id,
            None,
            &[(start_time, end_time)],
            Some(booking.id),
        )
        .await?;
        if !conflicts.is_empty() {
            return Err(BookingError::BookingConflict);
        }

        bookings::reschedule(&mut tx, booking.id, start_time, end_time, next_status).await?;
        tx.commit().await?;

        tracing::debug!(
            booking_id = %booking_id,
            status = next_status.as_str(),
            "booking rescheduled"
        );
        Ok(())
    }
}
