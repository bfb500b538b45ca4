//! Status transition rules. Each command asks this module whether its
//! transition is legal for the acting side; everything else is rejected.

use tutorhub_types::{BookingError, BookingStatus, BookingType};

/// Statuses from which the host or a participant may cancel.
pub const CANCELABLE_STATUSES: [BookingStatus; 5] = [
    BookingStatus::AwaitingTutorConfirmation,
    BookingStatus::AwaitingStudentConfirmation,
    BookingStatus::Scheduled,
    BookingStatus::AwaitingPayment,
    BookingStatus::PaymentFailed,
];

pub fn can_cancel(status: BookingStatus) -> bool {
    CANCELABLE_STATUSES.contains(&status)
}

/// Status a new booking starts in. The side that did not initiate has to
/// confirm.
pub fn initial_status(tutor_initiated: bool) -> BookingStatus {
    if tutor_initiated {
        BookingStatus::AwaitingStudentConfirmation
    } else {
        BookingStatus::AwaitingTutorConfirmation
    }
}

/// Where a confirmation lands: free meetings are scheduled outright,
/// lessons first collect payment.
pub fn confirm_target(booking_type: BookingType) -> BookingStatus {
    match booking_type {
        BookingType::FreeMeeting => BookingStatus::Scheduled,
        BookingType::Lesson => BookingStatus::AwaitingPayment,
    }
}

/// Validate a confirm attempt: only the awaited side may confirm, and only
/// from the two awaiting statuses.
pub fn check_confirm(status: BookingStatus, actor_is_host: bool) -> Result<(), BookingError> {
    match status {
        BookingStatus::AwaitingTutorConfirmation if actor_is_host => Ok(()),
        BookingStatus::AwaitingStudentConfirmation if !actor_is_host => Ok(()),
        _ => Err(BookingError::InvalidStatus),
    }
}

/// Validate a reschedule attempt and return the flipped awaiting status.
///
/// Rescheduling hands the decision to the other side: a tutor rescheduling
/// a booking that awaited them puts it back on the student, and vice versa.
pub fn reschedule_transition(
    status: BookingStatus,
    actor_is_host: bool,
) -> Result<BookingStatus, BookingError> {
    match status {
        BookingStatus::Completed
        | BookingStatus::Canceled
        | BookingStatus::AwaitingRefund
        | BookingStatus::RefundFailed
        | BookingStatus::Refunded => Err(BookingError::InvalidStatus),
        BookingStatus::AwaitingTutorConfirmation if actor_is_host => {
            Ok(BookingStatus::AwaitingStudentConfirmation)
        }
        BookingStatus::AwaitingStudentConfirmation if !actor_is_host => {
            Ok(BookingStatus::AwaitingTutorConfirmation)
        }
        _ if actor_is_host => Err(BookingError::InvalidStatusTutor),
        _ => Err(BookingError::InvalidStatusStudent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutorhub_types::BookingStatus::*;

    #[test]
    fn cancel_only_from_live_statuses() {
        assert!(can_cancel(AwaitingTutorConfirmation));
        assert!(can_cancel(AwaitingStudentConfirmation));
        assert!(can_cancel(Scheduled));
        assert!(can_cancel(AwaitingPayment));
        assert!(can_cancel(PaymentFailed));

        assert!(!can_cancel(Completed));
        assert!(!can_cancel(Canceled));
        assert!(!can_cancel(AwaitingRefund));
        assert!(!can_cancel(RefundFailed));
        assert!(!can_cancel(Refunded));
    }

    #[test]
    fn initiator_waits_for_the_other_side() {
        assert_eq!(initial_status(true), AwaitingStudentConfirmation);
        assert_eq!(initial_status(false), AwaitingTutorConfirmation);
    }

    #[test]
    fn confirm_targets_by_type() {
        assert_eq!(
            confirm_target(tutorhub_types::BookingType::FreeMeeting),
            Scheduled
        );
        assert_eq!(
            confirm_target(tutorhub_types::BookingType::Lesson),
            AwaitingPayment
        );
    }

    #[test]
    fn only_the_awaited_side_confirms() {
        assert!(check_confirm(AwaitingTutorConfirmation, true).is_ok());
        assert!(check_confirm(AwaitingStudentConfirmation, false).is_ok());
        assert!(matches!(
            check_confirm(AwaitingTutorConfirmation, false),
            Err(BookingError::InvalidStatus)
        ));
        assert!(matches!(
            check_confirm(Scheduled, true),
            Err(BookingError::InvalidStatus)
        ));
    }

    #[test]
    fn reschedule_flips_the_awaiting_direction() {
        assert_eq!(
            reschedule_transition(AwaitingTutorConfirmation, true).unwrap(),
            AwaitingStudentConfirmation
        );
        assert_eq!(
            reschedule_transition(AwaitingStudentConfirmation, false).unwrap(),
            AwaitingTutorConfirmation
        );
    }

    #[test]
    fn reschedule_rejects_the_wrong_side_with_role_specific_codes() {
        assert!(matches!(
            reschedule_transition(AwaitingStudentConfirmation, true),
            Err(BookingError::InvalidStatusTutor)
        ));
        assert!(matches!(
            reschedule_transition(AwaitingTutorConfirmation, false),
            Err(BookingError::InvalidStatusStudent)
        ));
        assert!(matches!(
            reschedule_transition(Scheduled, true),
            Err(BookingError::InvalidStatusTutor)
        ));
        assert!(matches!(
            reschedule_transition(AwaitingPayment, false),
            Err(BookingError::InvalidStatusStudent)
        ));
    }

    #[test]
    fn reschedule_rejects_settled_statuses_outright() {
        for status in [Completed, Canceled, AwaitingRefund, RefundFailed, Refunded] {
            assert!(matches!(
                reschedule_transition(status, true),
                Err(BookingError::InvalidStatus)
            ));
            assert!(matches!(
                reschedule_transition(status, false),
                Err(BookingError::InvalidStatus)
            ));
        }
    }
}
