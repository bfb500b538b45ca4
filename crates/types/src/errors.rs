use thiserror::Error;

pub type Result<T> = std::result::Result<T, BookingError>;

/// Engine error surfaced to callers. Every variant carries a stable
/// machine-readable code; the human message is the Display output.
#[derive(Debug, Error)]
pub enum BookingError {
    // Validation
    #[error("Start time is not a valid ISO-8601 UTC instant")]
    InvalidDate,
    #[error("Time slot must be on a 15-minute grid and fit within the day")]
    InvalidTimeSlot,
    #[error("Requested time slots overlap each other")]
    OverlappingTimeSlots,
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Business rules
    #[error("Bookings cannot start in the past")]
    PastBooking,
    #[error("New start time is in the past")]
    PastTime,
    #[error("New start time equals the current start time")]
    SameTime,
    #[error("Bookings cannot start more than one month ahead")]
    AdvanceBookingLimit,
    #[error("You cannot book a meeting with yourself")]
    YourselfBooking,
    #[error("A booking requires exactly one tutor and one student")]
    InvalidBookingCombination,
    #[error("Tutors cannot initiate free meetings")]
    FreeMeetingTutor,
    #[error("A lesson requires a previous meeting between tutor and student")]
    NoPreviousMeeting,
    #[error("There is already an ongoing free meeting between these users")]
    OngoingFreeMeeting,
    #[error("Recurring lessons require a prior booking with this tutor")]
    NoPriorBooking,
    #[error("The requested time overlaps an existing booking")]
    BookingConflict,
    #[error("The requested slots overlap an active recurring template")]
    RecurringTemplateConflict,
    #[error("An override still conflicts with an existing booking")]
    OverrideConflict,
    #[error("Override time must be on a 15-minute grid within the same day")]
    InvalidOverrideTime,

    // State
    #[error("Booking status does not allow this operation")]
    InvalidStatus,
    #[error("A tutor cannot perform this while awaiting the student")]
    InvalidStatusTutor,
    #[error("A student cannot perform this while awaiting the tutor")]
    InvalidStatusStudent,

    // Authorization / lookup
    #[error("You are not a participant of this booking")]
    Unauthorized,
    #[error("User not found")]
    UserNotFound,
    #[error("Booking not found")]
    BookingNotFound,
    #[error("Host must be a tutor")]
    InvalidHost,
    #[error("Participant is not eligible for this booking")]
    InvalidParticipant,

    // Payment
    #[error("Booking has no payment information")]
    NoPaymentInfo,
    #[error("Payment session creation failed: {0}")]
    PaymentSessionCreationFailed(String),
    #[error("Could not expire the payment session: {0}")]
    PaymentCancellationFailed(String),
    #[error("Refund could not be created: {0}")]
    RefundProcessingFailed(String),
    #[error("Webhook event carries no usable booking metadata")]
    InvalidMetadata,
    #[error("Webhook signature verification failed")]
    InvalidSignature,

    // Infrastructure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl BookingError {
    /// Stable machine-readable code returned to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDate => "INVALID_DATE",
            Self::InvalidTimeSlot => "INVALID_TIME_SLOT",
            Self::OverlappingTimeSlots => "OVERLAPPING_TIME_SLOTS",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::PastBooking => "PAST_BOOKING",
            Self::PastTime => "PAST_TIME",
            Self::SameTime => "SAME_TIME",
            Self::AdvanceBookingLimit => "ADVANCE_BOOKING_LIMIT",
            Self::YourselfBooking => "YOURSELF_BOOKING",
            Self::InvalidBookingCombination => "INVALID_BOOKING_COMBINATION",
            Self::FreeMeetingTutor => "FREE_MEETING_TUTOR",
            Self::NoPreviousMeeting => "NO_PREVIOUS_MEETING",
            Self::OngoingFreeMeeting => "ONGOING_FREE_MEETING",
            Self::NoPriorBooking => "NO_PRIOR_BOOKING",
            Self::BookingConflict => "BOOKING_CONFLICT",
            Self::RecurringTemplateConflict => "RECURRING_TEMPLATE_CONFLICT",
            Self::OverrideConflict => "OVERRIDE_CONFLICT",
            Self::InvalidOverrideTime => "INVALID_OVERRIDE_TIME",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::InvalidStatusTutor => "INVALID_STATUS_TUTOR",
            Self::InvalidStatusStudent => "INVALID_STATUS_STUDENT",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::BookingNotFound => "BOOKING_NOT_FOUND",
            Self::InvalidHost => "INVALID_HOST",
            Self::InvalidParticipant => "INVALID_PARTICIPANT",
            Self::NoPaymentInfo => "NO_PAYMENT_INFO",
            Self::PaymentSessionCreationFailed(_) => "PAYMENT_SESSION_CREATION_FAILED",
            Self::PaymentCancellationFailed(_) => "PAYMENT_CANCELLATION_FAILED",
            Self::RefundProcessingFailed(_) => "REFUND_PROCESSING_FAILED",
            Self::InvalidMetadata => "INVALID_METADATA",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::Database(_) | Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Database(_) | Self::Internal(_) => 500,
            Self::UserNotFound | Self::BookingNotFound => 404,
            Self::Unauthorized => 403,
            Self::InvalidSignature => 401,
            Self::BookingConflict
            | Self::RecurringTemplateConflict
            | Self::OverrideConflict
            | Self::OngoingFreeMeeting => 409,
            Self::PaymentSessionCreationFailed(_)
            | Self::PaymentCancellationFailed(_)
            | Self::RefundProcessingFailed(_) => 502,
            _ => 400,
        }
    }

    /// Validation and business-rule rejections are expected traffic and are
    /// never logged at error severity; infrastructure faults are.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(BookingError::InvalidDate.code(), "INVALID_DATE");
        assert_eq!(BookingError::BookingConflict.code(), "BOOKING_CONFLICT");
        assert_eq!(
            BookingError::PaymentSessionCreationFailed("boom".into()).code(),
            "PAYMENT_SESSION_CREATION_FAILED"
        );
        assert_eq!(BookingError::Internal("x".into()).code(), "INTERNAL_SERVER_ERROR");
    }

    #[test]
    fn infrastructure_errors_map_to_5xx() {
        assert_eq!(BookingError::Internal("x".into()).status_code(), 500);
        assert!(BookingError::Internal("x".into()).is_infrastructure());
        assert!(!BookingError::BookingConflict.is_infrastructure());
        assert_eq!(BookingError::BookingConflict.status_code(), 409);
        assert_eq!(BookingError::PastBooking.status_code(), 400);
    }
}
