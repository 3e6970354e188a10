// hostel_app/src/db/seed.rs

use tracing::{info, instrument};
use uuid::Uuid;

use super::{PgStore, RoomRepository};
use crate::errors::Result as AppResult;

/// (name, description, capacity, total_count, nightly price in centavos)
const DEMO_ROOMS: &[(&str, &str, i32, i32, i64)] = &[
  ("Mixed Dorm (8 beds)", "Bunk bed in an air-conditioned eight-bed dorm.", 1, 8, 55_000),
  ("Female Dorm (6 beds)", "Bunk bed in a female-only six-bed dorm with lockers.", 1, 6, 65_000),
  ("Private Double", "Private room with a double bed and shared bathroom.", 2, 4, 180_000),
  ("Family Room", "Private room for four with an ensuite bathroom.", 4, 2, 320_000),
];

/// Inserts the demo rooms when the room table is empty. Returns how many were inserted.
#[instrument(name = "seed::demo_rooms", skip(store), err(Display))]
pub async fn seed_demo_rooms(store: &PgStore) -> AppResult<usize> {
  let existing = store.count_rooms().await?;
  if existing > 0 {
    info!(existing, "Rooms already present, skipping seed.");
    return Ok(0);
  }

  for &(name, description, capacity, total_count, price_cents) in DEMO_ROOMS {
    sqlx::query(
      "INSERT INTO rooms (id, name, description, capacity, total_count, available_count, price_cents, is_active) \
       VALUES ($1, $2, $3, $4, $5, $5, $6, TRUE)",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .bind(capacity)
    .bind(total_count)
    .bind(price_cents)
    .execute(store.pool())
    .await?;
  }

  info!(inserted = DEMO_ROOMS.len(), "Seeded demo rooms.");
  Ok(DEMO_ROOMS.len())
}
