// hostel_app/src/pipelines/booking_pipeline.rs

//! Booking creation: availability check → inventory reservation → booking row.
//!
//! The decrement and the insert are two independent writes. If the insert
//! fails after the decrement succeeded, the unit stays taken; the failure is
//! logged with the room id so the count can be restored by hand.

use tracing::{error, info, warn};

use crate::errors::{AppError, Result as AppResult};
use crate::models::booking::{nights_between, BOOKING_STATUS_PENDING};
use crate::models::NewBooking;
use crate::pipelines::contexts::BookingCtxData;
use crate::pipelines::engine::{ContextData, Pipeline, PipelineControl};

const MAX_SPECIAL_REQUEST_LEN: usize = 1000;

pub fn build_booking_pipeline() -> Pipeline<BookingCtxData> {
  let mut p = Pipeline::<BookingCtxData>::new(
    "booking",
    &[
      ("validate_booking_request", false),
      ("load_room", false),
      ("reserve_room_inventory", false),
      ("create_booking_record", false),
      ("log_booking_summary", true),
    ],
  );

  p.on_root("validate_booking_request", validate_booking_request);
  p.on_root("load_room", load_room);
  p.on_root("reserve_room_inventory", reserve_room_inventory);
  p.on_root("create_booking_record", create_booking_record);
  p.on_root("log_booking_summary", |ctx_data: ContextData<BookingCtxData>| async move {
    let guard = ctx_data.read();
    if let Some(booking) = &guard.booking {
      info!(
        booking_id = %booking.id,
        room_id = %booking.room_id,
        nights = guard.nights,
        total_amount_cents = booking.total_amount_cents,
        remaining = ?guard.remaining_after_reservation,
        "Booking created."
      );
    }
    Ok(PipelineControl::Continue)
  });

  p
}

async fn validate_booking_request(ctx_data: ContextData<BookingCtxData>) -> AppResult<PipelineControl> {
  let mut guard = ctx_data.write();

  if guard.user_email.trim().is_empty() {
    return Err(AppError::Auth("Sign in to make a booking.".to_string()));
  }
  if guard.check_out <= guard.check_in {
    return Err(AppError::Validation("Check-out must be after check-in.".to_string()));
  }
  if guard.guests < 1 {
    return Err(AppError::Validation("At least one guest is required.".to_string()));
  }
  if let Some(text) = &guard.special_requests {
    if text.chars().count() > MAX_SPECIAL_REQUEST_LEN {
      return Err(AppError::Validation(format!(
        "Special requests are limited to {} characters.",
        MAX_SPECIAL_REQUEST_LEN
      )));
    }
  }

  guard.nights = nights_between(guard.check_in, guard.check_out);
  Ok(PipelineControl::Continue)
}

async fn load_room(ctx_data: ContextData<BookingCtxData>) -> AppResult<PipelineControl> {
  let (room_id, guests, store) = {
    let guard = ctx_data.read();
    (guard.room_id, guard.guests, guard.app_state.store.clone())
  };

  let room = store
    .find_room(room_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Room with ID {} not found.", room_id)))?;

  if !room.is_active {
    return Err(AppError::Validation(format!("Room '{}' is not open for booking.", room.name)));
  }
  if guests > room.capacity {
    return Err(AppError::Validation(format!(
      "Room '{}' fits at most {} guest(s).",
      room.name, room.capacity
    )));
  }
  if room.available_count <= 0 {
    warn!(%room_id, "Availability check failed, room is fully booked.");
    return Err(AppError::Conflict(format!("Room '{}' is fully booked.", room.name)));
  }

  ctx_data.write().room = Some(room);
  Ok(PipelineControl::Continue)
}

async fn reserve_room_inventory(ctx_data: ContextData<BookingCtxData>) -> AppResult<PipelineControl> {
  let (room_id, store) = {
    let guard = ctx_data.read();
    (guard.room_id, guard.app_state.store.clone())
  };

  // The availability check above is advisory; this conditional write is what prevents oversell.
  let updated_room = store.decrement_available(room_id).await?;

  let mut guard = ctx_data.write();
  guard.remaining_after_reservation = Some(updated_room.available_count);
  guard.room = Some(updated_room);
  Ok(PipelineControl::Continue)
}

async fn create_booking_record(ctx_data: ContextData<BookingCtxData>) -> AppResult<PipelineControl> {
  let (new_booking, store) = {
    let mut guard = ctx_data.write();
    let price_cents = guard
      .room
      .as_ref()
      .map(|room| room.price_cents)
      .ok_or_else(|| AppError::Workflow("Room must be loaded before the booking is written.".to_string()))?;
    guard.total_amount_cents = price_cents * guard.nights;

    let new_booking = NewBooking {
      user_email: guard.user_email.clone(),
      room_id: guard.room_id,
      check_in: guard.check_in,
      check_out: guard.check_out,
      guests: guard.guests,
      total_amount_cents: guard.total_amount_cents,
      status: BOOKING_STATUS_PENDING.to_string(),
      special_requests: guard.special_requests.clone(),
    };
    (new_booking, guard.app_state.store.clone())
  };

  let room_id = new_booking.room_id;
  match store.create_booking(new_booking).await {
    Ok(booking) => {
      ctx_data.write().booking = Some(booking);
      Ok(PipelineControl::Continue)
    }
    Err(err) => {
      error!(
        %room_id,
        error = %err,
        "Booking insert failed after inventory was decremented; the count was not restored."
      );
      Err(err)
    }
  }
}
