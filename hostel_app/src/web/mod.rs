// hostel_app/src/web/mod.rs

pub mod handlers;
pub mod routes;
pub mod session;

pub use routes::configure_app_routes;
pub use session::{SessionCookies, SessionIdentity};
