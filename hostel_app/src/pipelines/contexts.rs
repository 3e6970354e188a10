// hostel_app/src/pipelines/contexts.rs

//! Underlying data structs used by the pipelines.
//! Handlers receive these wrapped in `ContextData`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Booking, Room, User};
use crate::state::AppState;

pub struct BookingCtxData {
  pub app_state: AppState,
  // Request
  pub user_email: String,
  pub room_id: Uuid,
  pub check_in: DateTime<Utc>,
  pub check_out: DateTime<Utc>,
  pub guests: i32,
  pub special_requests: Option<String>,
  // Filled in by the pipeline
  pub room: Option<Room>,
  pub nights: i64,
  pub total_amount_cents: i64,
  pub remaining_after_reservation: Option<i32>,
  pub booking: Option<Booking>,
}

impl BookingCtxData {
  pub fn new(
    app_state: AppState,
    user_email: String,
    room_id: Uuid,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    guests: i32,
    special_requests: Option<String>,
  ) -> Self {
    Self {
      app_state,
      user_email,
      room_id,
      check_in,
      check_out,
      guests,
      special_requests,
      room: None,
      nights: 0,
      total_amount_cents: 0,
      remaining_after_reservation: None,
      booking: None,
    }
  }
}

pub struct SignupCtxData {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  pub first_name: String,
  pub last_name: String,
  pub created_user: Option<User>,
}
