pub mod bookings;
pub mod recurring;

pub use bookings::*;
pub use recurring::*;
