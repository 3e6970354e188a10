// hostel_app/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: Uuid,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl User {
  pub fn display_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name).trim().to_string()
  }
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  pub password_hash: String,
}
