// hostel_app/src/web/handlers/debug_handlers.rs

//! Diagnostic routes, mounted only when debug routes are enabled.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::auth_handlers::register_user;
use super::room_handlers::RoomView;
use crate::db::HostelStore;
use crate::errors::{expose_error_details, AppError};
use crate::models::booking::BOOKING_STATUS_TEST;
use crate::models::room::availability_label;
use crate::models::NewBooking;
use crate::state::AppState;
use crate::web::session::{SessionCookies, SessionIdentity};

const SAMPLE_ROOM_LIMIT: i64 = 10;
const RECENT_BOOKING_LIMIT: i64 = 5;

/// Connectivity reported as data; a failed probe is not an HTTP error.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseProbe {
  pub connected: bool,
  pub latency_ms: Option<u64>,
  pub error: Option<String>,
}

pub(crate) async fn probe_database(store: &dyn HostelStore) -> DatabaseProbe {
  let started = Instant::now();
  match store.ping().await {
    Ok(()) => DatabaseProbe {
      connected: true,
      latency_ms: Some(started.elapsed().as_millis() as u64),
      error: None,
    },
    Err(err) => {
      warn!(error = %err, "Database probe failed.");
      DatabaseProbe {
        connected: false,
        latency_ms: None,
        error: Some(if expose_error_details() {
          err.to_string()
        } else {
          "Database unreachable".to_string()
        }),
      }
    }
  }
}

#[instrument(name = "handler::auth_debug", skip(app_state, req))]
pub async fn auth_debug_handler(app_state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
  let cookies = SessionCookies::from_request(&req);

  let (user, lookup_error) = match &cookies.user_email {
    Some(email) => match app_state.store.find_user_by_email(email).await {
      Ok(user) => (user, None),
      Err(err) => {
        warn!(error = %err, "User lookup failed during auth debug.");
        (None, Some(err.to_string()))
      }
    },
    None => (None, None),
  };

  // userId and userEmail are independent client values.
  let user_id_matches_email = match cookies.user_id.as_deref().map(Uuid::parse_str) {
    Some(Ok(user_id)) => match app_state.store.find_user_by_id(user_id).await {
      Ok(by_id) => Some(by_id.is_some() && by_id.map(|u| u.email) == cookies.user_email),
      Err(err) => {
        warn!(error = %err, "User lookup by id failed during auth debug.");
        None
      }
    },
    Some(Err(_)) => Some(false),
    None => None,
  };

  HttpResponse::Ok().json(json!({
      "success": true,
      "hasSession": cookies.has_session(),
      "cookies": cookies,
      "userFound": user.is_some(),
      "userIdMatchesEmail": user_id_matches_email,
      "user": user,
      "lookupError": lookup_error,
  }))
}

#[instrument(name = "handler::debug", skip(app_state, req))]
pub async fn debug_handler(app_state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
  let cookies = SessionCookies::from_request(&req);
  let database = probe_database(app_state.store.as_ref()).await;

  HttpResponse::Ok().json(json!({
      "success": true,
      "environment": app_state.config.environment.as_str(),
      "timestamp": Utc::now(),
      "database": database,
      "cookies": {
          "userId": cookies.user_id.is_some(),
          "userEmail": cookies.user_email.is_some(),
          "userName": cookies.user_name.is_some(),
      },
      "gateway": {
          "configured": app_state.gateway.is_configured(),
          "currency": app_state.config.payment_currency,
      },
  }))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DebugBookingQuery {
  pub booking_id: Option<String>,
}

#[instrument(name = "handler::debug_booking", skip(app_state, req, query), fields(booking_id = ?query.booking_id))]
pub async fn debug_booking_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  query: web::Query<DebugBookingQuery>,
) -> Result<HttpResponse, AppError> {
  let raw_id = query
    .booking_id
    .as_deref()
    .map(str::trim)
    .filter(|id| !id.is_empty())
    .ok_or_else(|| AppError::Validation("bookingId query parameter is required.".to_string()))?;
  let booking_id = Uuid::parse_str(raw_id)
    .map_err(|_| AppError::Validation(format!("'{}' is not a valid booking ID.", raw_id)))?;

  let booking = app_state
    .store
    .find_booking(booking_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Booking with ID {} not found.", booking_id)))?;
  let room = app_state.store.find_room(booking.room_id).await?;
  let user = app_state.store.find_user_by_email(&booking.user_email).await?;
  let session_email = SessionCookies::from_request(&req).user_email;

  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "checks": {
          "roomExists": room.is_some(),
          "userExists": user.is_some(),
          "sessionMatchesBooking": session_email.map(|email| email == booking.user_email),
      },
      "booking": booking,
      "room": room.map(RoomView::from),
      "user": user,
  })))
}

#[instrument(name = "handler::debug_database", skip(app_state))]
pub async fn debug_database_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let database = probe_database(app_state.store.as_ref()).await;
  if !database.connected {
    return Ok(HttpResponse::Ok().json(json!({
        "success": false,
        "database": database,
    })));
  }

  let store = &app_state.store;
  let rooms: Vec<RoomView> = store
    .list_rooms(SAMPLE_ROOM_LIMIT)
    .await?
    .into_iter()
    .map(RoomView::from)
    .collect();

  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "database": database,
      "counts": {
          "rooms": store.count_rooms().await?,
          "bookings": store.count_bookings().await?,
          "users": store.count_users().await?,
      },
      "rooms": rooms,
      "recentBookings": store.list_recent_bookings(RECENT_BOOKING_LIMIT).await?,
  })))
}

#[instrument(name = "handler::list_test_bookings", skip(app_state, session), fields(email = %session.email))]
pub async fn list_test_bookings_handler(
  app_state: web::Data<AppState>,
  session: SessionIdentity,
) -> Result<HttpResponse, AppError> {
  let bookings = app_state.store.list_bookings_for_user(&session.email).await?;
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "userEmail": session.email,
      "count": bookings.len(),
      "bookings": bookings,
  })))
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestBookingPayload {
  pub room_id: Option<Uuid>,
  pub nights: Option<i64>,
}

/// Writes a `TEST` booking directly, bypassing the booking flow and the inventory count.
#[instrument(name = "handler::create_test_booking", skip(app_state, session, req_payload), fields(email = %session.email))]
pub async fn create_test_booking_handler(
  app_state: web::Data<AppState>,
  session: SessionIdentity,
  req_payload: Option<web::Json<CreateTestBookingPayload>>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.map(web::Json::into_inner).unwrap_or_default();
  let nights = payload.nights.unwrap_or(1);
  if !(1..=30).contains(&nights) {
    return Err(AppError::Validation("nights must be between 1 and 30.".to_string()));
  }

  let room = match payload.room_id {
    Some(room_id) => app_state.store.find_room(room_id).await?,
    None => app_state.store.list_active_rooms().await?.into_iter().next(),
  }
  .ok_or_else(|| AppError::NotFound("No room available for a test booking.".to_string()))?;

  let check_in = Utc::now() + Duration::days(1);
  let booking = app_state
    .store
    .create_booking(NewBooking {
      user_email: session.email.clone(),
      room_id: room.id,
      check_in,
      check_out: check_in + Duration::days(nights),
      guests: 1,
      total_amount_cents: room.price_cents * nights,
      status: BOOKING_STATUS_TEST.to_string(),
      special_requests: Some("Created by the booking-test route".to_string()),
    })
    .await?;
  info!(booking_id = %booking.id, "Test booking created.");

  Ok(HttpResponse::Created().json(json!({
      "success": true,
      "booking": booking,
  })))
}

#[instrument(name = "handler::delete_test_bookings", skip(app_state, session), fields(email = %session.email))]
pub async fn delete_test_bookings_handler(
  app_state: web::Data<AppState>,
  session: SessionIdentity,
) -> Result<HttpResponse, AppError> {
  let deleted = app_state
    .store
    .delete_bookings_with_status(&session.email, BOOKING_STATUS_TEST)
    .await?;
  info!(deleted, "Test bookings deleted.");
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "deleted": deleted,
  })))
}

#[instrument(name = "handler::test_auth", skip(app_state, session), fields(email = %session.email))]
pub async fn test_auth_handler(
  app_state: web::Data<AppState>,
  session: SessionIdentity,
) -> Result<HttpResponse, AppError> {
  let user_exists = app_state.store.find_user_by_email(&session.email).await?.is_some();
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "authenticated": true,
      "session": session,
      "userExists": user_exists,
  })))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RoomDecrementPayload {
  pub room_id: Option<Uuid>,
}

#[instrument(name = "handler::test_room_decrement", skip(app_state, req_payload), fields(room_id = ?req_payload.room_id))]
pub async fn test_room_decrement_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RoomDecrementPayload>,
) -> Result<HttpResponse, AppError> {
  let room_id = req_payload
    .room_id
    .ok_or_else(|| AppError::Validation("roomId is required.".to_string()))?;

  let room = app_state.store.decrement_available(room_id).await?;
  let new_count = room.available_count;
  info!(new_count, "Room inventory decremented.");

  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "roomId": room.id,
      "roomName": room.name,
      "previousCount": new_count + 1,
      "newCount": new_count,
      "status": availability_label(new_count),
  })))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResetRoomCountPayload {
  pub room_id: Option<Uuid>,
  pub count: Option<i32>,
}

#[instrument(
    name = "handler::reset_room_count",
    skip(app_state, req_payload),
    fields(room_id = ?req_payload.room_id, count = ?req_payload.count)
)]
pub async fn reset_room_count_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<ResetRoomCountPayload>,
) -> Result<HttpResponse, AppError> {
  let (room_id, count) = match (req_payload.room_id, req_payload.count) {
    (Some(room_id), Some(count)) => (room_id, count),
    _ => return Err(AppError::Validation("roomId and count are required.".to_string())),
  };

  let room = app_state.store.set_available(room_id, count).await?;
  info!(new_count = room.available_count, "Room inventory overwritten.");

  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "roomId": room.id,
      "roomName": room.name,
      "newCount": room.available_count,
      "status": availability_label(room.available_count),
  })))
}

#[instrument(name = "handler::create_demo_user", skip(app_state))]
pub async fn create_demo_user_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let config = &app_state.config;
  let email = config.demo_user_email.trim().to_ascii_lowercase();

  if let Some(existing) = app_state.store.find_user_by_email(&email).await? {
    info!(user_id = %existing.id, "Demo user already present.");
    return Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "created": false,
        "user": existing,
    })));
  }

  let user = register_user(
    app_state.get_ref(),
    email,
    config.demo_user_password.clone(),
    "Demo".to_string(),
    "Guest".to_string(),
  )
  .await?;

  Ok(HttpResponse::Created().json(json!({
      "success": true,
      "created": true,
      "user": user,
  })))
}
