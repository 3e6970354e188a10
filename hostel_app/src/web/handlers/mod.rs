// hostel_app/src/web/handlers/mod.rs

pub mod auth_handlers;
pub mod booking_handlers;
pub mod debug_handlers;
pub mod payment_handlers;
pub mod room_handlers;
