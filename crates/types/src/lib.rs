pub mod api;
pub mod enums;
pub mod errors;
pub mod time;
pub mod validation;

pub use enums::{
    BookingStatus, BookingType, RecurrencePattern, SortDirection, SortField, TemplateStatus,
    UserRole, Weekday, ACTIVE_STATUSES,
};
pub use errors::{BookingError, Result};
pub use time::{format_utc_millis, parse_utc, TimeOfDay};
