use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    Tutor,
    Student,
    Admin,
    Moderator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tutor => "TUTOR",
            Self::Student => "STUDENT",
            Self::Admin => "ADMIN",
            Self::Moderator => "MODERATOR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "booking_type", rename_all = "snake_case")]
pub enum BookingType {
    FreeMeeting,
    Lesson,
}

impl BookingType {
    /// Fixed duration for each booking type: 15 minutes for the initial free
    /// consultation, 60 minutes for a paid lesson.
    pub fn duration_minutes(&self) -> i64 {
        match self {
            Self::FreeMeeting => 15,
            Self::Lesson => 60,
        }
    }

    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.duration_minutes())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FreeMeeting => "FREE_MEETING",
            Self::Lesson => "LESSON",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
pub enum BookingStatus {
    AwaitingTutorConfirmation,
    AwaitingStudentConfirmation,
    AwaitingPayment,
    PaymentFailed,
    Scheduled,
    Canceled,
    Completed,
    AwaitingRefund,
    RefundFailed,
    Refunded,
}

/// Statuses that hold a slot on the host's calendar. Two bookings of the
/// same host whose statuses are both in this set must never overlap.
pub const ACTIVE_STATUSES: [BookingStatus; 4] = [
    BookingStatus::AwaitingTutorConfirmation,
    BookingStatus::AwaitingStudentConfirmation,
    BookingStatus::AwaitingPayment,
    BookingStatus::Scheduled,
];

impl BookingStatus {
    pub fn is_active(&self) -> bool {
        ACTIVE_STATUSES.contains(self)
    }

    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Canceled | Self::Refunded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingTutorConfirmation => "AWAITING_TUTOR_CONFIRMATION",
            Self::AwaitingStudentConfirmation => "AWAITING_STUDENT_CONFIRMATION",
            Self::AwaitingPayment => "AWAITING_PAYMENT",
            Self::PaymentFailed => "PAYMENT_FAILED",
            Self::Scheduled => "SCHEDULED",
            Self::Canceled => "CANCELED",
            Self::Completed => "COMPLETED",
            Self::AwaitingRefund => "AWAITING_REFUND",
            Self::RefundFailed => "REFUND_FAILED",
            Self::Refunded => "REFUNDED",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AWAITING_TUTOR_CONFIRMATION" => Ok(Self::AwaitingTutorConfirmation),
            "AWAITING_STUDENT_CONFIRMATION" => Ok(Self::AwaitingStudentConfirmation),
            "AWAITING_PAYMENT" => Ok(Self::AwaitingPayment),
            "PAYMENT_FAILED" => Ok(Self::PaymentFailed),
            "SCHEDULED" => Ok(Self::Scheduled),
            "CANCELED" => Ok(Self::Canceled),
            "COMPLETED" => Ok(Self::Completed),
            "AWAITING_REFUND" => Ok(Self::AwaitingRefund),
            "REFUND_FAILED" => Ok(Self::RefundFailed),
            "REFUNDED" => Ok(Self::Refunded),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "recurrence_pattern", rename_all = "snake_case")]
pub enum RecurrencePattern {
    Weekly,
    Biweekly,
    Monthly,
}

impl RecurrencePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "WEEKLY",
            Self::Biweekly => "BIWEEKLY",
            Self::Monthly => "MONTHLY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "template_status", rename_all = "snake_case")]
pub enum TemplateStatus {
    #[default]
    Active,
    Inactive,
}

/// Day of week for recurring time slots. Stored as days since Monday so the
/// database ordering matches the ISO week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum Weekday {
    Monday = 0,
    Tuesday = 1,
    Wednesday = 2,
    Thursday = 3,
    Friday = 4,
    Saturday = 5,
    Sunday = 6,
}

impl Weekday {
    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            Self::Monday => chrono::Weekday::Mon,
            Self::Tuesday => chrono::Weekday::Tue,
            Self::Wednesday => chrono::Weekday::Wed,
            Self::Thursday => chrono::Weekday::Thu,
            Self::Friday => chrono::Weekday::Fri,
            Self::Saturday => chrono::Weekday::Sat,
            Self::Sunday => chrono::Weekday::Sun,
        }
    }

    pub fn from_chrono(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortField {
    #[default]
    StartTime,
    CreatedAt,
}

impl SortField {
    /// Column name used when building the ORDER BY clause.
    pub fn column(&self) -> &'static str {
        match self {
            Self::StartTime => "start_time",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
