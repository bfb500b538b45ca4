pub mod complete_finished;

pub use complete_finished::complete_finished_bookings;
