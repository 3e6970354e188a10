// hostel_app/src/web/routes.rs

use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::web::handlers::{auth_handlers, booking_handlers, debug_handlers, payment_handlers, room_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Malformed bodies get the same `{success:false, error}` shape as every other failure.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid request body: {}", err)).into()
}

/// Mounts every `/api` route. Diagnostic routes are added only when `debug_routes` is set.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig, debug_routes: bool) {
  let mut api = web::scope("/api")
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .route("/health", web::get().to(health_check_handler))
    .service(
      web::scope("/auth")
        .route("/register", web::post().to(auth_handlers::register_handler))
        .route("/login", web::post().to(auth_handlers::login_handler))
        .route("/logout", web::post().to(auth_handlers::logout_handler))
        .route("/me", web::get().to(auth_handlers::me_handler)),
    )
    .service(
      web::scope("/rooms")
        .route("", web::get().to(room_handlers::list_rooms_handler))
        .route("/{room_id}", web::get().to(room_handlers::get_room_handler)),
    )
    .service(
      web::scope("/bookings")
        .route("", web::post().to(booking_handlers::create_booking_handler))
        .route("", web::get().to(booking_handlers::list_my_bookings_handler))
        .route("/{booking_id}", web::get().to(booking_handlers::get_booking_handler)),
    )
    .service(
      web::scope("/payments")
        .route("/gcash", web::post().to(payment_handlers::create_gcash_payment_handler))
        .route("/verify", web::post().to(payment_handlers::verify_payment_handler)),
    );

  if debug_routes {
    tracing::warn!("Diagnostic routes are enabled.");
    api = api.configure(configure_debug_routes);
  }

  cfg.service(api);
}

fn configure_debug_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/auth-debug", web::get().to(debug_handlers::auth_debug_handler))
    .route("/debug", web::get().to(debug_handlers::debug_handler))
    .route("/debug-booking", web::get().to(debug_handlers::debug_booking_handler))
    .route("/debug-database", web::get().to(debug_handlers::debug_database_handler))
    .service(
      web::resource("/booking-test")
        .route(web::get().to(debug_handlers::list_test_bookings_handler))
        .route(web::post().to(debug_handlers::create_test_booking_handler))
        .route(web::delete().to(debug_handlers::delete_test_bookings_handler)),
    )
    .route("/test-auth", web::get().to(debug_handlers::test_auth_handler))
    .route("/test-room-decrement", web::post().to(debug_handlers::test_room_decrement_handler))
    .route("/reset-room-count", web::post().to(debug_handlers::reset_room_count_handler))
    .route("/create-demo-user", web::post().to(debug_handlers::create_demo_user_handler));
}
