// hostel_app/src/web/handlers/room_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Room;
use crate::state::AppState;

/// A room plus its availability label, as the UI shows it.
#[derive(Debug, Serialize)]
pub struct RoomView {
  #[serde(flatten)]
  pub room: Room,
  pub status: &'static str,
  pub bookable: bool,
}

impl From<Room> for RoomView {
  fn from(room: Room) -> Self {
    let status = room.availability_status();
    let bookable = room.is_bookable();
    Self { room, status, bookable }
  }
}

#[instrument(name = "handler::list_rooms", skip(app_state))]
pub async fn list_rooms_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let rooms: Vec<RoomView> = app_state
    .store
    .list_active_rooms()
    .await?
    .into_iter()
    .map(RoomView::from)
    .collect();
  info!("Fetched {} active rooms.", rooms.len());

  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "rooms": rooms,
  })))
}

#[instrument(name = "handler::get_room", skip(app_state, path), fields(room_id = %path.as_ref()))]
pub async fn get_room_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  let room_id = path.into_inner();
  let room = app_state
    .store
    .find_room(room_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Room with ID {} not found.", room_id)))?;

  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "room": RoomView::from(room),
  })))
}
