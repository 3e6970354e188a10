// hostel_app/src/models/room.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_AVAILABLE: &str = "Available";
pub const STATUS_FULLY_BOOKED: &str = "Fully Booked";

/// Availability label for a remaining-inventory count.
pub fn availability_label(available_count: i32) -> &'static str {
  if available_count > 0 {
    STATUS_AVAILABLE
  } else {
    STATUS_FULLY_BOOKED
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Room {
  pub id: Uuid,
  pub name: String,
  pub description: Option<String>,
  /// Maximum guests per booking.
  pub capacity: i32,
  pub total_count: i32,
  /// Remaining inventory. Not bounded below by the schema: the reset route can write anything.
  pub available_count: i32,
  /// Nightly price in minor units (centavos).
  pub price_cents: i64,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Room {
  pub fn availability_status(&self) -> &'static str {
    availability_label(self.available_count)
  }

  pub fn is_bookable(&self) -> bool {
    self.is_active && self.available_count > 0
  }
}
