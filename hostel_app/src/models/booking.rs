// hostel_app/src/models/booking.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const BOOKING_STATUS_PENDING: &str = "PENDING";
/// Sentinel written by the booking-test diagnostics route.
pub const BOOKING_STATUS_TEST: &str = "TEST";

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
  pub id: Uuid,
  /// References `users.email`, not `users.id`.
  pub user_email: String,
  pub room_id: Uuid,
  pub check_in: DateTime<Utc>,
  pub check_out: DateTime<Utc>,
  pub guests: i32,
  pub total_amount_cents: i64,
  pub status: String,
  pub special_requests: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Insert payload for a booking row.
#[derive(Debug, Clone)]
pub struct NewBooking {
  pub user_email: String,
  pub room_id: Uuid,
  pub check_in: DateTime<Utc>,
  pub check_out: DateTime<Utc>,
  pub guests: i32,
  pub total_amount_cents: i64,
  pub status: String,
  pub special_requests: Option<String>,
}

/// Whole nights between check-in and check-out, at least one.
pub fn nights_between(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> i64 {
  let hours = (check_out - check_in).num_hours();
  let nights = (hours + 23) / 24;
  nights.max(1)
}
