//! Data models for the booking server

pub mod booking;
pub mod equipment;
pub mod user;

// Re-export commonly used types
pub use booking::{Availability, BookingRecord, NewBooking, Period, PeriodSet, SlotKey};
pub use equipment::Equipment;
pub use user::{RequestContext, User};
