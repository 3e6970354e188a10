// hostel_app/src/services/payment_gateway.rs

//! Application-side view of the payment gateway: request/response types and
//! the `PaymentGateway` port implemented by the PayMongo client.
//!
//! Payment intents are never persisted; the gateway is the only record of them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{AppError, Result as AppResult};

/// Input for a new GCash checkout.
#[derive(Debug, Clone)]
pub struct CreatePaymentIntent {
  /// Amount in minor units (centavos).
  pub amount_minor: i64,
  pub currency: String,
  pub description: String,
  pub success_url: String,
  pub cancel_url: String,
  /// Caller-generated; echoed back unchanged.
  pub reference_number: String,
  pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
  pub checkout_id: String,
  pub redirect_url: String,
  pub reference_number: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub payment_intent_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
  AwaitingPaymentMethod,
  AwaitingNextAction,
  Processing,
  Succeeded,
  Unknown,
}

impl PaymentStatus {
  pub fn from_gateway(raw: &str) -> Self {
    match raw {
      "awaiting_payment_method" => PaymentStatus::AwaitingPaymentMethod,
      "awaiting_next_action" => PaymentStatus::AwaitingNextAction,
      "processing" => PaymentStatus::Processing,
      "succeeded" => PaymentStatus::Succeeded,
      _ => PaymentStatus::Unknown,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerification {
  pub status: PaymentStatus,
  /// Major units.
  pub amount: f64,
  pub currency: String,
  pub reference_number: Option<String>,
  pub paid_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  async fn create_payment_intent(&self, request: CreatePaymentIntent) -> AppResult<CheckoutSession>;

  async fn verify_payment(&self, payment_intent_id: &str) -> AppResult<PaymentVerification>;

  /// False when no credentials are configured.
  fn is_configured(&self) -> bool;
}

/// Converts a major-unit amount to centavos, rounding to the nearest unit.
pub fn to_minor_units(amount: f64) -> AppResult<i64> {
  if !amount.is_finite() || amount <= 0.0 {
    return Err(AppError::Validation("Amount must be a positive number.".to_string()));
  }
  let minor = (amount * 100.0).round();
  if minor < 1.0 || minor > i64::MAX as f64 / 2.0 {
    return Err(AppError::Validation("Amount is out of range.".to_string()));
  }
  Ok(minor as i64)
}

/// The gateway reports centavos; the application speaks pesos.
pub fn from_minor_units(amount_minor: i64) -> f64 {
  amount_minor as f64 / 100.0
}

const PAYMENT_INTENT_PREFIX: &str = "pi_";
const MAX_PAYMENT_INTENT_ID_LEN: usize = 64;

/// Accepts only gateway-shaped intent ids: `pi_` followed by ASCII letters, digits or `_`.
/// The id is used as a path segment of an authenticated gateway request.
pub fn validate_payment_intent_id(raw: &str) -> AppResult<&str> {
  let id = raw.trim();
  if id.is_empty() {
    return Err(AppError::Validation("paymentIntentId is required.".to_string()));
  }
  let well_formed = id.len() <= MAX_PAYMENT_INTENT_ID_LEN
    && id
      .strip_prefix(PAYMENT_INTENT_PREFIX)
      .map_or(false, |rest| {
        !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
      });
  if !well_formed {
    return Err(AppError::Validation("paymentIntentId is not a valid payment intent id.".to_string()));
  }
  Ok(id)
}

pub fn generate_reference_number(booking_id: &str, now: DateTime<Utc>) -> String {
  format!("BK-{}-{}", booking_id, now.timestamp_millis())
}
