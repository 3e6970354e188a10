// hostel_app/src/db/postgres.rs

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{BookingRepository, RoomRepository, StoreHealth, UserRepository};
use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult};
use crate::models::{Booking, NewBooking, NewUser, Room, User};

const ROOM_COLUMNS: &str =
  "id, name, description, capacity, total_count, available_count, price_cents, is_active, created_at, updated_at";
const BOOKING_COLUMNS: &str = "id, user_email, room_id, check_in, check_out, guests, total_amount_cents, status, special_requests, created_at";
const USER_COLUMNS: &str = "id, email, first_name, last_name, password_hash, created_at, updated_at";

/// Opens the connection pool and applies pending migrations.
pub async fn connect(config: &AppConfig) -> AppResult<PgPool> {
  let pool = PgPoolOptions::new()
    .max_connections(config.database_max_connections)
    .connect(&config.database_url)
    .await?;
  info!("Successfully connected to the database.");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to run migrations: {}", e)))?;
  info!("Database migrations applied.");
  Ok(pool)
}

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }
}

#[async_trait]
impl RoomRepository for PgStore {
  async fn list_active_rooms(&self) -> AppResult<Vec<Room>> {
    let rooms = sqlx::query_as::<_, Room>(&format!(
      "SELECT {} FROM rooms WHERE is_active = TRUE ORDER BY price_cents ASC, name ASC",
      ROOM_COLUMNS
    ))
    .fetch_all(&self.pool)
    .await?;
    Ok(rooms)
  }

  async fn list_rooms(&self, limit: i64) -> AppResult<Vec<Room>> {
    let rooms = sqlx::query_as::<_, Room>(&format!("SELECT {} FROM rooms ORDER BY name ASC LIMIT $1", ROOM_COLUMNS))
      .bind(limit)
      .fetch_all(&self.pool)
      .await?;
    Ok(rooms)
  }

  async fn find_room(&self, room_id: Uuid) -> AppResult<Option<Room>> {
    let room = sqlx::query_as::<_, Room>(&format!("SELECT {} FROM rooms WHERE id = $1", ROOM_COLUMNS))
      .bind(room_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(room)
  }

  #[instrument(name = "pg_store::decrement_available", skip(self), err(Display))]
  async fn decrement_available(&self, room_id: Uuid) -> AppResult<Room> {
    // Check and write happen in one statement, so concurrent callers cannot both take the last unit.
    let updated = sqlx::query_as::<_, Room>(&format!(
      "UPDATE rooms SET available_count = available_count - 1, updated_at = NOW() \
       WHERE id = $1 AND available_count > 0 RETURNING {}",
      ROOM_COLUMNS
    ))
    .bind(room_id)
    .fetch_optional(&self.pool)
    .await?;

    match updated {
      Some(room) => Ok(room),
      None => match self.find_room(room_id).await? {
        Some(room) => {
          warn!(available_count = room.available_count, "Room has no remaining inventory.");
          Err(AppError::Conflict(format!("Room '{}' is fully booked.", room.name)))
        }
        None => Err(AppError::NotFound(format!("Room with ID {} not found.", room_id))),
      },
    }
  }

  #[instrument(name = "pg_store::set_available", skip(self), err(Display))]
  async fn set_available(&self, room_id: Uuid, count: i32) -> AppResult<Room> {
    if count < 0 {
      warn!(count, "Writing a negative remaining count.");
    }
    sqlx::query_as::<_, Room>(&format!(
      "UPDATE rooms SET available_count = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
      ROOM_COLUMNS
    ))
    .bind(room_id)
    .bind(count)
    .fetch_optional(&self.pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Room with ID {} not found.", room_id)))
  }

  async fn count_rooms(&self) -> AppResult<i64> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rooms").fetch_one(&self.pool).await?)
  }
}

#[async_trait]
impl BookingRepository for PgStore {
  #[instrument(name = "pg_store::create_booking", skip(self, booking), fields(room_id = %booking.room_id), err(Display))]
  async fn create_booking(&self, booking: NewBooking) -> AppResult<Booking> {
    let result = sqlx::query_as::<_, Booking>(&format!(
      "INSERT INTO bookings (id, user_email, room_id, check_in, check_out, guests, total_amount_cents, status, special_requests) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
      BOOKING_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&booking.user_email)
    .bind(booking.room_id)
    .bind(booking.check_in)
    .bind(booking.check_out)
    .bind(booking.guests)
    .bind(booking.total_amount_cents)
    .bind(&booking.status)
    .bind(&booking.special_requests)
    .fetch_one(&self.pool)
    .await;

    match result {
      Ok(row) => Ok(row),
      Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
        error!(constraint = ?db_err.constraint(), "Booking references a missing user or room.");
        Err(AppError::NotFound(
          "Booking references a user or room that does not exist.".to_string(),
        ))
      }
      Err(e) => Err(AppError::Sqlx(e)),
    }
  }

  async fn find_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(&format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS))
      .bind(booking_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(booking)
  }

  async fn list_bookings_for_user(&self, user_email: &str) -> AppResult<Vec<Booking>> {
    let bookings = sqlx::query_as::<_, Booking>(&format!(
      "SELECT {} FROM bookings WHERE user_email = $1 ORDER BY created_at DESC",
      BOOKING_COLUMNS
    ))
    .bind(user_email)
    .fetch_all(&self.pool)
    .await?;
    Ok(bookings)
  }

  async fn list_recent_bookings(&self, limit: i64) -> AppResult<Vec<Booking>> {
    let bookings = sqlx::query_as::<_, Booking>(&format!(
      "SELECT {} FROM bookings ORDER BY created_at DESC LIMIT $1",
      BOOKING_COLUMNS
    ))
    .bind(limit)
    .fetch_all(&self.pool)
    .await?;
    Ok(bookings)
  }

  async fn delete_bookings_with_status(&self, user_email: &str, status: &str) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM bookings WHERE user_email = $1 AND status = $2")
      .bind(user_email)
      .bind(status)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected())
  }

  async fn count_bookings(&self) -> AppResult<i64> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings").fetch_one(&self.pool).await?)
  }
}

#[async_trait]
impl UserRepository for PgStore {
  async fn find_user_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
      .bind(user_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
      .bind(email)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  #[instrument(name = "pg_store::create_user", skip(self, user), fields(email = %user.email), err(Display))]
  async fn create_user(&self, user: NewUser) -> AppResult<User> {
    let result = sqlx::query_as::<_, User>(&format!(
      "INSERT INTO users (id, email, first_name, last_name, password_hash) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
      USER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.password_hash)
    .fetch_one(&self.pool)
    .await;

    match result {
      Ok(row) => Ok(row),
      Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(AppError::Validation(
        "An account with this email already exists.".to_string(),
      )),
      Err(e) => Err(AppError::Sqlx(e)),
    }
  }

  async fn count_users(&self) -> AppResult<i64> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(&self.pool).await?)
  }
}

#[async_trait]
impl StoreHealth for PgStore {
  async fn ping(&self) -> AppResult<()> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool).await?;
    Ok(())
  }
}
