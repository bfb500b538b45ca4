use chrono::{DateTime, Duration, Months, Utc};
use tutorhub_db::{
    models::{Booking, NewBooking, User},
    queries::{bookings, users},
};
use tutorhub_types::{api::CreateBookingRequest, parse_utc, BookingError, BookingStatus, BookingType};
use uuid::Uuid;

use super::{state, BookingEngine, DEFAULT_LESSON_PRICE_CENTS};

/// The candidate window loaded for rule checks is always the lesson length;
/// the 15-minute free-meeting interval is contained in it.
const CANDIDATE_WINDOW_MINUTES: i64 = 60;

impl BookingEngine {
    /// Create a booking between the acting user and `to_user_id`.
    ///
    /// The invariant checks and the insert share one transaction, so two
    /// racing creates cannot both observe a free calendar and both commit.
    pub async fn create_booking(
        &self,
        actor: &User,
        req: &CreateBookingRequest,
    ) -> Result<Uuid, BookingError> {
        let start_time = parse_utc(&req.start_time).ok_or(BookingError::InvalidDate)?;

        let now = self.clock.now();
        if start_time < now {
            return Err(BookingError::PastBooking);
        }
        let advance_limit = now
            .checked_add_months(Months::new(1))
            .ok_or_else(|| BookingError::Internal("advance limit overflow".into()))?;
        if start_time > advance_limit {
            return Err(BookingError::AdvanceBookingLimit);
        }

        if actor.id == req.to_user_id {
            return Err(BookingError::YourselfBooking);
        }

        let mut tx = self.pool.begin().await?;

        let to_user = users::find_by_id_in_tx(&mut tx, req.to_user_id)
            .await?
            .ok_or(BookingError::UserNotFound)?;

        let actor_is_tutor = actor.is_tutor();
        if actor_is_tutor && to_user.is_tutor() {
            return Err(BookingError::InvalidBookingCombination);
        }

        let (tutor, student) = if actor_is_tutor {
            (actor, &to_user)
        } else {
            (&to_user, actor)
        };
        if !tutor.is_tutor() {
            return Err(BookingError::InvalidHost);
        }

        let window_end = start_time + Duration::minutes(CANDIDATE_WINDOW_MINUTES);
        let pair_bookings =
            bookings::find_between_pair(&mut tx, tutor.id, student.id, start_time, window_end)
                .await?;

        if pair_has_active_overlap(&pair_bookings, start_time, window_end) {
            return Err(BookingError::BookingConflict);
        }
        if has_active_free_meeting(&pair_bookings) {
            return Err(BookingError::OngoingFreeMeeting);
        }
        if actor_is_tutor && !has_prior_meeting(&pair_bookings) {
            return Err(BookingError::NoPreviousMeeting);
        }

        let booking_type = booking_type_for_pair(&pair_bookings);
        if booking_type == BookingType::FreeMeeting && actor_is_tutor {
            return Err(BookingError::FreeMeetingTutor);
        }

        let end_time = start_time + booking_type.duration();
        let status = state::initial_status(actor_is_tutor);

        // The pair query only covers this student; the host's whole calendar
        // must still be free over the actual interval.
        let host_conflicts = bookings::find_conflicts(
            &mut tx,
            tutor.id,
            None,
            &[(start_time, end_time)],
            None,
        )
        .await?;
        if !host_conflicts.is_empty() {
            return Err(BookingError::BookingConflict);
        }

        let new = NewBooking {
            title: default_title(booking_type, &tutor.name),
            description: None,
            start_time,
            end_time,
            booking_type,
            status,
            host_id: tutor.id,
            participant_ids: vec![student.id],
            service_id: req.service_id,
            recurring_template_id: None,
            price_cents: match booking_type {
                BookingType::FreeMeeting => 0,
                BookingType::Lesson => DEFAULT_LESSON_PRICE_CENTS,
            },
        };
        let booking = bookings::insert(&mut tx, &new).await?;

        tx.commit().await?;

        tracing::debug!(
            booking_id = %booking.id,
            booking_type = booking_type.as_str(),
            status = status.as_str(),
            "booking created"
        );
        Ok(booking.id)
    }
}

fn default_title(booking_type: BookingType, tutor_name: &str) -> String {
    match booking_type {
        BookingType::FreeMeeting => format!("Free meeting with {tutor_name}"),
        BookingType::Lesson => format!("Lesson with {tutor_name}"),
    }
}

/// Any pair booking with an active status overlapping the candidate window.
fn pair_has_active_overlap(
    pair: &[Booking],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> bool {
    pair.iter()
        .any(|b| b.status.is_active() && b.overlaps(start, end))
}

/// An active free meeting already pending between the pair.
fn has_active_free_meeting(pair: &[Booking]) -> bool {
    pair.iter()
        .any(|b| b.booking_type == BookingType::FreeMeeting && b.status.is_active())
}

/// Whether the pair ever met (COMPLETED) or is about to (SCHEDULED).
fn has_prior_meeting(pair: &[Booking]) -> bool {
    pair.iter().any(|b| {
        matches!(
            b.status,
            BookingStatus::Completed | BookingStatus::Scheduled
        )
    })
}

/// Paid lessons unlock once the pair has a completed free meeting.
fn booking_type_for_pair(pair: &[Booking]) -> BookingType {
    let trial_completed = pair.iter().any(|b| {
        b.booking_type == BookingType::FreeMeeting && b.status == BookingStatus::Completed
    });
    if trial_completed {
        BookingType::Lesson
    } else {
        BookingType::FreeMeeting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn booking_at(
        booking_type: BookingType,
        status: BookingStatus,
        start: DateTime<Utc>,
    ) -> Booking {
        let end = start + booking_type.duration();
        Booking {
            id: Uuid::new_v4(),
            title: "test".into(),
            description: None,
            start_time: start,
            end_time: end,
            booking_type,
            status,
            host_id: Uuid::new_v4(),
            service_id: None,
            recurring_template_id: None,
            price_cents: 0,
            participant_ids: vec![Uuid::new_v4()],
            created_at: start,
            updated_at: start,
        }
    }

    fn instant(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 15, h, m, 0).unwrap()
    }

    #[test]
    fn first_booking_between_a_pair_is_a_free_meeting() {
        assert_eq!(booking_type_for_pair(&[]), BookingType::FreeMeeting);
        let pending = booking_at(
            BookingType::FreeMeeting,
            BookingStatus::Scheduled,
            instant(9, 0),
        );
        assert_eq!(booking_type_for_pair(&[pending]), BookingType::FreeMeeting);
    }

    #[test]
    fn completed_trial_unlocks_lessons() {
        let done = booking_at(
            BookingType::FreeMeeting,
            BookingStatus::Completed,
            instant(9, 0),
        );
        assert_eq!(booking_type_for_pair(&[done]), BookingType::Lesson);
    }

    #[test]
    fn canceled_trial_does_not_unlock_lessons() {
        let canceled = booking_at(
            BookingType::FreeMeeting,
            BookingStatus::Canceled,
            instant(9, 0),
        );
        assert_eq!(
            booking_type_for_pair(&[canceled]),
            BookingType::FreeMeeting
        );
    }

    #[test]
    fn active_overlap_detection_uses_half_open_intervals() {
        let existing = booking_at(
            BookingType::Lesson,
            BookingStatus::Scheduled,
            instant(10, 0),
        );
        // Back-to-back bookings do not overlap.
        assert!(!pair_has_active_overlap(
            std::slice::from_ref(&existing),
            instant(11, 0),
            instant(12, 0)
        ));
        assert!(pair_has_active_overlap(
            std::slice::from_ref(&existing),
            instant(10, 30),
            instant(11, 30)
        ));
        // Canceled bookings hold no slot.
        let canceled = booking_at(
            BookingType::Lesson,
            BookingStatus::Canceled,
            instant(10, 0),
        );
        assert!(!pair_has_active_overlap(
            &[canceled],
            instant(10, 0),
            instant(11, 0)
        ));
    }

    #[test]
    fn pending_free_meeting_blocks_a_second_one() {
        let pending = booking_at(
            BookingType::FreeMeeting,
            BookingStatus::AwaitingTutorConfirmation,
            instant(9, 0),
        );
        assert!(has_active_free_meeting(std::slice::from_ref(&pending)));
        let done = booking_at(
            BookingType::FreeMeeting,
            BookingStatus::Completed,
            instant(9, 0),
        );
        assert!(!has_active_free_meeting(&[done]));
    }

    #[test]
    fn prior_meeting_means_completed_or_scheduled() {
        let scheduled = booking_at(
            BookingType::FreeMeeting,
            BookingStatus::Scheduled,
            instant(9, 0),
        );
        assert!(has_prior_meeting(std::slice::from_ref(&scheduled)));
        let awaiting = booking_at(
            BookingType::Lesson,
            BookingStatus::AwaitingPayment,
            instant(9, 0),
        );
        assert!(!has_prior_meeting(&[awaiting]));
    }
}
