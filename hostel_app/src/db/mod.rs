// hostel_app/src/db/mod.rs

//! Persistence ports used by handlers and pipelines, plus the Postgres adapter.
//!
//! Handlers only see `dyn HostelStore`; `PgStore` is the production
//! implementation and the integration tests plug in an in-memory one.

pub mod postgres;
pub mod seed;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result as AppResult;
use crate::models::{Booking, NewBooking, NewUser, Room, User};

pub use postgres::PgStore;

#[async_trait]
pub trait RoomRepository: Send + Sync {
  async fn list_active_rooms(&self) -> AppResult<Vec<Room>>;

  /// All rooms, active or not, up to `limit`.
  async fn list_rooms(&self, limit: i64) -> AppResult<Vec<Room>>;

  async fn find_room(&self, room_id: Uuid) -> AppResult<Option<Room>>;

  /// Removes one unit of inventory in a single conditional write.
  ///
  /// Fails with `NotFound` when the room does not exist and with `Conflict`
  /// when its count is already zero; the count is left unchanged in both cases.
  async fn decrement_available(&self, room_id: Uuid) -> AppResult<Room>;

  /// Overwrites the remaining count with `count`, whatever it is.
  async fn set_available(&self, room_id: Uuid, count: i32) -> AppResult<Room>;

  async fn count_rooms(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
  async fn create_booking(&self, booking: NewBooking) -> AppResult<Booking>;

  async fn find_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>>;

  /// Newest first.
  async fn list_bookings_for_user(&self, user_email: &str) -> AppResult<Vec<Booking>>;

  async fn list_recent_bookings(&self, limit: i64) -> AppResult<Vec<Booking>>;

  /// Returns the number of deleted rows.
  async fn delete_bookings_with_status(&self, user_email: &str, status: &str) -> AppResult<u64>;

  async fn count_bookings(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
  async fn find_user_by_id(&self, user_id: Uuid) -> AppResult<Option<User>>;

  async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

  /// Fails with `Validation` when the email is taken.
  async fn create_user(&self, user: NewUser) -> AppResult<User>;

  async fn count_users(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
  async fn ping(&self) -> AppResult<()>;
}

/// Everything the application needs from storage.
pub trait HostelStore: RoomRepository + BookingRepository + UserRepository + StoreHealth {}

impl<T> HostelStore for T where T: RoomRepository + BookingRepository + UserRepository + StoreHealth {}
