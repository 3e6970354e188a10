// hostel_app/src/models/mod.rs

//! Contains data structures representing database entities.

pub mod booking;
pub mod room;
pub mod user;

pub use booking::{Booking, NewBooking};
pub use room::Room;
pub use user::{NewUser, User};
