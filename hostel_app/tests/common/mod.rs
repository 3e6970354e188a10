// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset

use actix_web::cookie::Cookie;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use async_trait::async_trait;
use chrono::Utc;
use hostel_app::config::AppConfig;
use hostel_app::db::{BookingRepository, RoomRepository, StoreHealth, UserRepository};
use hostel_app::errors::{AppError, Result as AppResult};
use hostel_app::models::{Booking, NewBooking, NewUser, Room, User};
use hostel_app::services::auth_service;
use hostel_app::services::payment_gateway::{
  CheckoutSession, CreatePaymentIntent, PaymentGateway, PaymentStatus, PaymentVerification,
};
use hostel_app::state::AppState;
use hostel_app::web::configure_app_routes;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

// --- Tracing ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
    .with_test_writer()
    .try_init();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- In-memory store ---
#[derive(Default)]
pub struct InMemoryStore {
  rooms: Mutex<HashMap<Uuid, Room>>,
  bookings: Mutex<Vec<Booking>>,
  users: Mutex<Vec<User>>,
  pub fail_ping: AtomicBool,
  pub fail_booking_insert: AtomicBool,
}

impl InMemoryStore {
  pub fn add_room(&self, name: &str, capacity: i32, available_count: i32, price_cents: i64) -> Room {
    let now = Utc::now();
    let room = Room {
      id: Uuid::new_v4(),
      name: name.to_string(),
      description: Some(format!("{} for tests", name)),
      capacity,
      total_count: available_count.max(0),
      available_count,
      price_cents,
      is_active: true,
      created_at: now,
      updated_at: now,
    };
    self.rooms.lock().insert(room.id, room.clone());
    room
  }

  pub fn deactivate_room(&self, room_id: Uuid) {
    if let Some(room) = self.rooms.lock().get_mut(&room_id) {
      room.is_active = false;
    }
  }

  pub fn available(&self, room_id: Uuid) -> i32 {
    self.rooms.lock().get(&room_id).map(|r| r.available_count).unwrap_or(i32::MIN)
  }

  pub fn booking_count(&self) -> usize {
    self.bookings.lock().len()
  }

  /// Inserts a user with an argon2-hashed password.
  pub fn add_user(&self, email: &str, password: &str) -> User {
    let now = Utc::now();
    let user = User {
      id: Uuid::new_v4(),
      email: email.to_string(),
      first_name: "Test".to_string(),
      last_name: "Guest".to_string(),
      password_hash: auth_service::hash_password(password).expect("hash"),
      created_at: now,
      updated_at: now,
    };
    self.users.lock().push(user.clone());
    user
  }
}

#[async_trait]
impl RoomRepository for InMemoryStore {
  async fn list_active_rooms(&self) -> AppResult<Vec<Room>> {
    let mut rooms: Vec<Room> = self.rooms.lock().values().filter(|r| r.is_active).cloned().collect();
    rooms.sort_by(|a, b| a.price_cents.cmp(&b.price_cents).then_with(|| a.name.cmp(&b.name)));
    Ok(rooms)
  }

  async fn list_rooms(&self, limit: i64) -> AppResult<Vec<Room>> {
    let mut rooms: Vec<Room> = self.rooms.lock().values().cloned().collect();
    rooms.sort_by(|a, b| a.name.cmp(&b.name));
    rooms.truncate(limit.max(0) as usize);
    Ok(rooms)
  }

  async fn find_room(&self, room_id: Uuid) -> AppResult<Option<Room>> {
    Ok(self.rooms.lock().get(&room_id).cloned())
  }

  async fn decrement_available(&self, room_id: Uuid) -> AppResult<Room> {
    // Check and write under one lock, like the conditional UPDATE.
    let mut rooms = self.rooms.lock();
    let room = rooms
      .get_mut(&room_id)
      .ok_or_else(|| AppError::NotFound(format!("Room with ID {} not found.", room_id)))?;
    if room.available_count <= 0 {
      return Err(AppError::Conflict(format!("Room '{}' is fully booked.", room.name)));
    }
    room.available_count -= 1;
    room.updated_at = Utc::now();
    Ok(room.clone())
  }

  async fn set_available(&self, room_id: Uuid, count: i32) -> AppResult<Room> {
    let mut rooms = self.rooms.lock();
    let room = rooms
      .get_mut(&room_id)
      .ok_or_else(|| AppError::NotFound(format!("Room with ID {} not found.", room_id)))?;
    room.available_count = count;
    Ok(room.clone())
  }

  async fn count_rooms(&self) -> AppResult<i64> {
    Ok(self.rooms.lock().len() as i64)
  }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
  async fn create_booking(&self, booking: NewBooking) -> AppResult<Booking> {
    if self.fail_booking_insert.load(Ordering::SeqCst) {
      return Err(AppError::Internal("simulated insert failure".to_string()));
    }
    let user_exists = self.users.lock().iter().any(|u| u.email == booking.user_email);
    let room_exists = self.rooms.lock().contains_key(&booking.room_id);
    if !user_exists || !room_exists {
      return Err(AppError::NotFound(
        "Booking references a user or room that does not exist.".to_string(),
      ));
    }

    let row = Booking {
      id: Uuid::new_v4(),
      user_email: booking.user_email,
      room_id: booking.room_id,
      check_in: booking.check_in,
      check_out: booking.check_out,
      guests: booking.guests,
      total_amount_cents: booking.total_amount_cents,
      status: booking.status,
      special_requests: booking.special_requests,
      created_at: Utc::now(),
    };
    self.bookings.lock().push(row.clone());
    Ok(row)
  }

  async fn find_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
    Ok(self.bookings.lock().iter().find(|b| b.id == booking_id).cloned())
  }

  async fn list_bookings_for_user(&self, user_email: &str) -> AppResult<Vec<Booking>> {
    let mut bookings: Vec<Booking> = self
      .bookings
      .lock()
      .iter()
      .filter(|b| b.user_email == user_email)
      .cloned()
      .collect();
    bookings.reverse();
    Ok(bookings)
  }

  async fn list_recent_bookings(&self, limit: i64) -> AppResult<Vec<Booking>> {
    Ok(self.bookings.lock().iter().rev().take(limit.max(0) as usize).cloned().collect())
  }

  async fn delete_bookings_with_status(&self, user_email: &str, status: &str) -> AppResult<u64> {
    let mut bookings = self.bookings.lock();
    let before = bookings.len();
    bookings.retain(|b| !(b.user_email == user_email && b.status == status));
    Ok((before - bookings.len()) as u64)
  }

  async fn count_bookings(&self) -> AppResult<i64> {
    Ok(self.bookings.lock().len() as i64)
  }
}

#[async_trait]
impl UserRepository for InMemoryStore {
  async fn find_user_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
    Ok(self.users.lock().iter().find(|u| u.id == user_id).cloned())
  }

  async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
    Ok(self.users.lock().iter().find(|u| u.email == email).cloned())
  }

  async fn create_user(&self, user: NewUser) -> AppResult<User> {
    let mut users = self.users.lock();
    if users.iter().any(|u| u.email == user.email) {
      return Err(AppError::Validation("An account with this email already exists.".to_string()));
    }
    let now = Utc::now();
    let row = User {
      id: Uuid::new_v4(),
      email: user.email,
      first_name: user.first_name,
      last_name: user.last_name,
      password_hash: user.password_hash,
      created_at: now,
      updated_at: now,
    };
    users.push(row.clone());
    Ok(row)
  }

  async fn count_users(&self) -> AppResult<i64> {
    Ok(self.users.lock().len() as i64)
  }
}

#[async_trait]
impl StoreHealth for InMemoryStore {
  async fn ping(&self) -> AppResult<()> {
    if self.fail_ping.load(Ordering::SeqCst) {
      return Err(AppError::Internal("connection refused".to_string()));
    }
    Ok(())
  }
}

// --- Fake payment gateway ---
pub struct FakeGateway {
  pub created: Mutex<Vec<CreatePaymentIntent>>,
  pub verification: Mutex<Option<PaymentVerification>>,
  pub verified_ids: Mutex<Vec<String>>,
}

impl Default for FakeGateway {
  fn default() -> Self {
    Self {
      created: Mutex::new(Vec::new()),
      verification: Mutex::new(Some(PaymentVerification {
        status: PaymentStatus::Succeeded,
        amount: 1000.0,
        currency: "PHP".to_string(),
        reference_number: Some("BK-test-1".to_string()),
        paid_at: Some(Utc::now()),
      })),
      verified_ids: Mutex::new(Vec::new()),
    }
  }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
  async fn create_payment_intent(&self, request: CreatePaymentIntent) -> AppResult<CheckoutSession> {
    let session = CheckoutSession {
      checkout_id: "cs_fake_1".to_string(),
      redirect_url: "https://checkout.example.test/cs_fake_1".to_string(),
      reference_number: request.reference_number.clone(),
      payment_intent_id: Some("pi_fake_1".to_string()),
    };
    self.created.lock().push(request);
    Ok(session)
  }

  async fn verify_payment(&self, payment_intent_id: &str) -> AppResult<PaymentVerification> {
    self.verified_ids.lock().push(payment_intent_id.to_string());
    self
      .verification
      .lock()
      .clone()
      .ok_or_else(|| AppError::Gateway("resource_not_found: payment intent not found".to_string()))
  }

  fn is_configured(&self) -> bool {
    true
  }
}

// --- App wiring ---
pub fn test_config() -> AppConfig {
  let vars: HashMap<&str, &str> = HashMap::from([
    ("DATABASE_URL", "postgres://unused/unused"),
    ("APP_BASE_URL", "http://hostel.test"),
    ("PAYMONGO_SECRET_KEY", "sk_test_fake"),
    ("DEMO_USER_EMAIL", "demo@hostel.test"),
    ("DEMO_USER_PASSWORD", "demo-password"),
  ]);
  AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).expect("test config")
}

pub struct TestHarness {
  pub store: Arc<InMemoryStore>,
  pub gateway: Arc<FakeGateway>,
  pub state: AppState,
}

pub fn harness() -> TestHarness {
  setup_tracing();
  let store = Arc::new(InMemoryStore::default());
  let gateway = Arc::new(FakeGateway::default());
  let state = AppState::new(store.clone(), gateway.clone(), Arc::new(test_config()));
  TestHarness { store, gateway, state }
}

/// App with every route mounted, ready for `test::init_service`.
pub fn test_app(
  state: &AppState,
  debug_routes: bool,
) -> App<
  impl ServiceFactory<ServiceRequest, Config = (), Response = ServiceResponse, Error = actix_web::Error, InitError = ()>,
> {
  App::new()
    .app_data(web::Data::new(state.clone()))
    .configure(move |cfg| configure_app_routes(cfg, debug_routes))
}

pub fn session_cookie(email: &str) -> Cookie<'static> {
  Cookie::new("userEmail", email.to_string())
}
