// hostel_app/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

// Set once at startup from `AppConfig::expose_error_details`.
static EXPOSE_ERROR_DETAILS: AtomicBool = AtomicBool::new(false);

/// Controls whether error bodies carry a `details` field.
pub fn set_expose_error_details(expose: bool) {
  EXPOSE_ERROR_DETAILS.store(expose, Ordering::Relaxed);
}

pub fn expose_error_details() -> bool {
  EXPOSE_ERROR_DETAILS.load(Ordering::Relaxed)
}

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  /// A business rule refused the request, e.g. a fully booked room.
  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Payment Gateway Error: {0}")]
  Gateway(String),

  #[error("Workflow Error: {0}")]
  Workflow(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl From<reqwest::Error> for AppError {
  fn from(err: reqwest::Error) -> Self {
    AppError::Gateway(err.to_string())
  }
}

impl AppError {
  /// Message safe to show to any client.
  fn public_message(&self) -> String {
    match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::NotFound(m) | AppError::Conflict(m) => m.clone(),
      AppError::Config(_) => "Configuration issue".to_string(),
      AppError::Sqlx(_) => "Database operation failed".to_string(),
      AppError::Gateway(_) => "Payment gateway request failed".to_string(),
      AppError::Workflow(_) => "Workflow processing error".to_string(),
      AppError::Internal(_) => "An internal error occurred".to_string(),
    }
  }

  /// Underlying detail, only sent outside production.
  fn detail(&self) -> Option<String> {
    match self {
      AppError::Validation(_) | AppError::Auth(_) | AppError::NotFound(_) | AppError::Conflict(_) => None,
      AppError::Config(m) | AppError::Gateway(m) | AppError::Workflow(m) | AppError::Internal(m) => Some(m.clone()),
      AppError::Sqlx(e) => Some(e.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Gateway(_)
      | AppError::Workflow(_)
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    let mut body = json!({ "success": false, "error": self.public_message() });
    if expose_error_details() {
      if let Some(detail) = self.detail() {
        body["details"] = json!(detail);
      }
    }
    HttpResponse::build(self.status_code()).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
