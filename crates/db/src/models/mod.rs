pub mod booking;
pub mod payment;
pub mod recurring;
pub mod user;

pub use booking::{Booking, NewBooking};
pub use payment::Payment;
pub use recurring::{RecurringTemplate, RecurringTimeSlot};
pub use user::User;
