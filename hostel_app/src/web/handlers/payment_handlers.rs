// hostel_app/src/web/handlers/payment_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::services::payment_gateway::{
  generate_reference_number, to_minor_units, validate_payment_intent_id, CreatePaymentIntent,
};
use crate::state::AppState;
use crate::web::session::SessionIdentity;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GcashPaymentRequestPayload {
  pub amount: f64,
  pub description: String,
  pub booking_id: String,
  pub success_url: Option<String>,
  pub failure_url: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequestPayload {
  pub payment_intent_id: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

#[instrument(
    name = "handler::create_gcash_payment",
    skip(app_state, session, req_payload),
    fields(booking_id = %req_payload.booking_id)
)]
pub async fn create_gcash_payment_handler(
  app_state: web::Data<AppState>,
  session: Option<SessionIdentity>,
  req_payload: web::Json<GcashPaymentRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();

  let amount_minor = to_minor_units(payload.amount)?;
  let description = payload.description.trim().to_string();
  if description.is_empty() {
    return Err(AppError::Validation("Description is required.".to_string()));
  }
  let booking_id = payload.booking_id.trim().to_string();
  if booking_id.is_empty() {
    return Err(AppError::Validation("bookingId is required.".to_string()));
  }

  let reference_number = generate_reference_number(&booking_id, Utc::now());
  let base_url = &app_state.config.app_base_url;
  let success_url = non_blank(payload.success_url)
    .unwrap_or_else(|| format!("{}/payment/success?bookingId={}", base_url, booking_id));
  let cancel_url = non_blank(payload.failure_url)
    .unwrap_or_else(|| format!("{}/payment/failed?bookingId={}", base_url, booking_id));

  let mut metadata = Map::new();
  metadata.insert("bookingId".to_string(), Value::String(booking_id.clone()));
  metadata.insert("referenceNumber".to_string(), Value::String(reference_number.clone()));
  if let Some(identity) = &session {
    metadata.insert("userEmail".to_string(), Value::String(identity.email.clone()));
  }

  let checkout = app_state
    .gateway
    .create_payment_intent(CreatePaymentIntent {
      amount_minor,
      currency: app_state.config.payment_currency.clone(),
      description,
      success_url,
      cancel_url,
      reference_number,
      metadata,
    })
    .await?;

  info!(
    checkout_id = %checkout.checkout_id,
    payment_intent_id = ?checkout.payment_intent_id,
    reference_number = %checkout.reference_number,
    amount_minor,
    "GCash checkout created."
  );

  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "data": {
          "checkoutId": checkout.checkout_id,
          "redirectUrl": checkout.redirect_url,
          "referenceNumber": checkout.reference_number,
          "paymentIntentId": checkout.payment_intent_id,
      },
  })))
}

#[instrument(name = "handler::verify_payment", skip(app_state, req_payload), fields(payment_intent_id = %req_payload.payment_intent_id))]
pub async fn verify_payment_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<VerifyPaymentRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payment_intent_id = validate_payment_intent_id(&req_payload.payment_intent_id)?;

  let verification = app_state.gateway.verify_payment(payment_intent_id).await?;
  warn!(
    status = ?verification.status,
    reference_number = ?verification.reference_number,
    "Payment verified; outcome is not recorded against the booking."
  );

  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "data": verification,
  })))
}
