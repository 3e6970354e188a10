// hostel_app/src/services/paymongo.rs

//! Reqwest-backed PayMongo client for GCash checkouts.
//!
//! Two calls only: create a checkout session and read a payment intent back.
//! There is no retry and no idempotency key; a failed call surfaces as
//! `AppError::Gateway` and the caller answers 500.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use super::payment_gateway::{
  from_minor_units, validate_payment_intent_id, CheckoutSession, CreatePaymentIntent, PaymentGateway, PaymentStatus,
  PaymentVerification,
};
use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult};

const GCASH_METHOD: &str = "gcash";

// --- Wire DTOs ---

#[derive(Serialize)]
struct CheckoutSessionRequest<'a> {
  data: CheckoutSessionRequestData<'a>,
}

#[derive(Serialize)]
struct CheckoutSessionRequestData<'a> {
  attributes: CheckoutSessionRequestAttributes<'a>,
}

#[derive(Serialize)]
struct CheckoutSessionRequestAttributes<'a> {
  line_items: Vec<LineItem<'a>>,
  payment_method_types: [&'a str; 1],
  description: &'a str,
  reference_number: &'a str,
  success_url: &'a str,
  cancel_url: &'a str,
  metadata: &'a Map<String, Value>,
  send_email_receipt: bool,
  show_description: bool,
  show_line_items: bool,
}

#[derive(Serialize)]
struct LineItem<'a> {
  name: &'a str,
  amount: i64,
  currency: &'a str,
  quantity: u32,
}

#[derive(Deserialize)]
struct Envelope<T> {
  data: Resource<T>,
}

#[derive(Deserialize)]
struct Resource<T> {
  id: String,
  attributes: T,
}

#[derive(Deserialize)]
struct CheckoutSessionAttributes {
  checkout_url: String,
  #[serde(default)]
  payment_intent: Option<PaymentIntentRef>,
}

#[derive(Deserialize)]
struct PaymentIntentRef {
  id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaymentIntentAttributes {
  pub amount: i64,
  pub currency: String,
  pub status: String,
  #[serde(default)]
  pub metadata: Option<Map<String, Value>>,
  #[serde(default)]
  pub payments: Vec<PaymentResource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaymentResource {
  pub attributes: PaymentAttributes,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaymentAttributes {
  #[serde(default)]
  pub paid_at: Option<i64>,
}

#[derive(Deserialize)]
struct GatewayErrorBody {
  #[serde(default)]
  errors: Vec<GatewayErrorItem>,
}

#[derive(Deserialize)]
struct GatewayErrorItem {
  #[serde(default)]
  code: Option<String>,
  #[serde(default)]
  detail: Option<String>,
}

/// Normalises a payment intent into application terms.
///
/// `paid_at` comes from the first payment when the gateway reports one; a
/// succeeded intent without it is stamped with `now`.
pub(crate) fn verification_from_intent(attributes: PaymentIntentAttributes, now: DateTime<Utc>) -> PaymentVerification {
  let status = PaymentStatus::from_gateway(&attributes.status);
  let reference_number = attributes.metadata.as_ref().and_then(|metadata| {
    ["referenceNumber", "reference_number"]
      .iter()
      .find_map(|key| metadata.get(*key).and_then(Value::as_str))
      .map(str::to_string)
  });
  let gateway_paid_at = attributes
    .payments
    .iter()
    .find_map(|payment| payment.attributes.paid_at)
    .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
  let paid_at = match (gateway_paid_at, status) {
    (Some(at), _) => Some(at),
    (None, PaymentStatus::Succeeded) => Some(now),
    (None, _) => None,
  };

  PaymentVerification {
    status,
    amount: from_minor_units(attributes.amount),
    currency: attributes.currency,
    reference_number,
    paid_at,
  }
}

pub struct PayMongoGateway {
  client: Client,
  api_base: String,
  secret_key: String,
}

impl PayMongoGateway {
  pub fn new(config: &AppConfig) -> AppResult<Self> {
    Self::with_base(&config.paymongo_api_base, &config.paymongo_secret_key, config.gateway_timeout)
  }

  pub fn with_base(api_base: &str, secret_key: &str, timeout: std::time::Duration) -> AppResult<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| AppError::Config(format!("Failed to build payment gateway HTTP client: {}", e)))?;
    Ok(Self {
      client,
      api_base: api_base.trim_end_matches('/').to_string(),
      secret_key: secret_key.to_string(),
    })
  }

  fn ensure_configured(&self) -> AppResult<()> {
    if self.secret_key.is_empty() {
      return Err(AppError::Config("Payment gateway secret key is not configured.".to_string()));
    }
    Ok(())
  }

  async fn read_json<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> AppResult<T> {
    let status = response.status();
    if status.is_success() {
      return response
        .json::<T>()
        .await
        .map_err(|e| AppError::Gateway(format!("Unexpected gateway response: {}", e)));
    }

    let body = response.text().await.unwrap_or_default();
    Err(gateway_error(status, &body))
  }
}

fn gateway_error(status: StatusCode, body: &str) -> AppError {
  let detail = serde_json::from_str::<GatewayErrorBody>(body)
    .ok()
    .and_then(|parsed| parsed.errors.into_iter().next())
    .map(|item| match (item.code, item.detail) {
      (Some(code), Some(detail)) => format!("{}: {}", code, detail),
      (None, Some(detail)) => detail,
      (Some(code), None) => code,
      (None, None) => "unspecified gateway error".to_string(),
    })
    .unwrap_or_else(|| format!("gateway answered {}", status));
  warn!(%status, %detail, "Payment gateway rejected the request.");
  AppError::Gateway(detail)
}

#[async_trait]
impl PaymentGateway for PayMongoGateway {
  #[instrument(
    name = "paymongo::create_payment_intent",
    skip(self, request),
    fields(reference_number = %request.reference_number, amount_minor = request.amount_minor),
    err(Display)
  )]
  async fn create_payment_intent(&self, request: CreatePaymentIntent) -> AppResult<CheckoutSession> {
    self.ensure_configured()?;

    let payload = CheckoutSessionRequest {
      data: CheckoutSessionRequestData {
        attributes: CheckoutSessionRequestAttributes {
          line_items: vec![LineItem {
            name: &request.description,
            amount: request.amount_minor,
            currency: &request.currency,
            quantity: 1,
          }],
          payment_method_types: [GCASH_METHOD],
          description: &request.description,
          reference_number: &request.reference_number,
          success_url: &request.success_url,
          cancel_url: &request.cancel_url,
          metadata: &request.metadata,
          send_email_receipt: false,
          show_description: true,
          show_line_items: true,
        },
      },
    };

    let response = self
      .client
      .post(format!("{}/checkout_sessions", self.api_base))
      .basic_auth(&self.secret_key, None::<&str>)
      .json(&payload)
      .send()
      .await?;
    let envelope: Envelope<CheckoutSessionAttributes> = Self::read_json(response).await?;

    info!(checkout_id = %envelope.data.id, "Checkout session created.");
    Ok(CheckoutSession {
      checkout_id: envelope.data.id,
      redirect_url: envelope.data.attributes.checkout_url,
      reference_number: request.reference_number,
      payment_intent_id: envelope.data.attributes.payment_intent.map(|intent| intent.id),
    })
  }

  #[instrument(name = "paymongo::verify_payment", skip(self), err(Display))]
  async fn verify_payment(&self, payment_intent_id: &str) -> AppResult<PaymentVerification> {
    self.ensure_configured()?;
    let payment_intent_id = validate_payment_intent_id(payment_intent_id)?;

    let response = self
      .client
      .get(format!("{}/payment_intents/{}", self.api_base, payment_intent_id))
      .basic_auth(&self.secret_key, None::<&str>)
      .send()
      .await?;
    let envelope: Envelope<PaymentIntentAttributes> = Self::read_json(response).await?;

    let verification = verification_from_intent(envelope.data.attributes, Utc::now());
    info!(status = ?verification.status, "Payment intent verified.");
    Ok(verification)
  }

  fn is_configured(&self) -> bool {
    !self.secret_key.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn intent(value: Value) -> PaymentIntentAttributes {
    serde_json::from_value(value).expect("valid intent attributes")
  }

  #[test]
  fn succeeded_intent_converts_amount_and_stamps_paid_at() {
    let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    let verification = verification_from_intent(
      intent(json!({
        "amount": 100000,
        "currency": "PHP",
        "status": "succeeded",
        "metadata": { "referenceNumber": "BK-b1-1" }
      })),
      now,
    );
    assert_eq!(verification.status, PaymentStatus::Succeeded);
    assert_eq!(verification.amount, 1000.0);
    assert_eq!(verification.currency, "PHP");
    assert_eq!(verification.reference_number.as_deref(), Some("BK-b1-1"));
    assert_eq!(verification.paid_at, Some(now));
  }

  #[test]
  fn gateway_paid_at_wins_over_now() {
    let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    let verification = verification_from_intent(
      intent(json!({
        "amount": 65050,
        "currency": "PHP",
        "status": "succeeded",
        "payments": [{ "attributes": { "paid_at": 1_700_000_000 } }]
      })),
      now,
    );
    assert_eq!(verification.amount, 650.5);
    assert_eq!(verification.paid_at, Utc.timestamp_opt(1_700_000_000, 0).single());
  }

  #[test]
  fn pending_intent_has_no_paid_at() {
    let verification = verification_from_intent(
      intent(json!({ "amount": 5000, "currency": "PHP", "status": "awaiting_next_action" })),
      Utc::now(),
    );
    assert_eq!(verification.status, PaymentStatus::AwaitingNextAction);
    assert!(verification.paid_at.is_none());
    assert!(verification.reference_number.is_none());
  }

  #[test]
  fn gateway_error_prefers_first_detail() {
    let body = r#"{"errors":[{"code":"parameter_invalid","detail":"amount is too low"},{"detail":"ignored"}]}"#;
    let err = gateway_error(StatusCode::BAD_REQUEST, body);
    assert!(matches!(err, AppError::Gateway(m) if m == "parameter_invalid: amount is too low"));

    let opaque = gateway_error(StatusCode::BAD_GATEWAY, "<html>");
    assert!(matches!(opaque, AppError::Gateway(m) if m.contains("502")));
  }
}
