// hostel_app/src/web/handlers/booking_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::room_handlers::RoomView;
use crate::errors::AppError;
use crate::pipelines::contexts::BookingCtxData;
use crate::pipelines::{ContextData, PipelineResult};
use crate::state::AppState;
use crate::web::session::SessionIdentity;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequestPayload {
  pub room_id: Uuid,
  pub check_in: DateTime<Utc>,
  pub check_out: DateTime<Utc>,
  #[serde(default = "default_guests")]
  pub guests: i32,
  #[serde(default)]
  pub special_requests: Option<String>,
}

fn default_guests() -> i32 {
  1
}

#[instrument(
    name = "handler::create_booking",
    skip(app_state, session, req_payload),
    fields(email = %session.email, room_id = %req_payload.room_id)
)]
pub async fn create_booking_handler(
  app_state: web::Data<AppState>,
  session: SessionIdentity,
  req_payload: web::Json<CreateBookingRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let booking_ctx = ContextData::new(BookingCtxData::new(
    app_state.get_ref().clone(),
    session.email.clone(),
    payload.room_id,
    payload.check_in,
    payload.check_out,
    payload.guests,
    payload.special_requests.filter(|text| !text.trim().is_empty()),
  ));

  match app_state.pipelines.booking.run(booking_ctx.clone()).await? {
    PipelineResult::Completed => {
      let guard = booking_ctx.read();
      let booking = guard.booking.clone().ok_or_else(|| {
        warn!("Booking pipeline completed but no booking was recorded in context.");
        AppError::Internal("Booking completed, but its details are unavailable.".to_string())
      })?;
      info!(booking_id = %booking.id, "Booking created for {}.", session.email);

      Ok(HttpResponse::Created().json(json!({
          "success": true,
          "booking": booking,
          "nights": guard.nights,
          "room": guard.room.clone().map(RoomView::from),
      })))
    }
    PipelineResult::Stopped => Err(AppError::Internal("Booking process was halted.".to_string())),
  }
}

#[instrument(name = "handler::list_my_bookings", skip(app_state, session), fields(email = %session.email))]
pub async fn list_my_bookings_handler(
  app_state: web::Data<AppState>,
  session: SessionIdentity,
) -> Result<HttpResponse, AppError> {
  let bookings = app_state.store.list_bookings_for_user(&session.email).await?;
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "count": bookings.len(),
      "bookings": bookings,
  })))
}

#[instrument(name = "handler::get_booking", skip(app_state, path), fields(booking_id = %path.as_ref()))]
pub async fn get_booking_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let booking_id = path.into_inner();
  let booking = app_state
    .store
    .find_booking(booking_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Booking with ID {} not found.", booking_id)))?;
  let room = app_state.store.find_room(booking.room_id).await?;

  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "booking": booking,
      "room": room.map(RoomView::from),
  })))
}
