// hostel_app/src/web/handlers/auth_handlers.rs

use actix_web::cookie::Cookie;
use actix_web::{web, HttpResponse, HttpResponseBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::User;
use crate::pipelines::contexts::SignupCtxData;
use crate::pipelines::{ContextData, PipelineResult};
use crate::services::auth_service;
use crate::state::AppState;
use crate::web::session::{cleared_session_cookies, session_cookies_for, SessionIdentity};

// --- Request DTOs ---
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestPayload {
  pub email: String,
  pub password: String,
  pub first_name: String,
  #[serde(default)]
  pub last_name: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequestPayload {
  pub email: String,
  pub password: String,
}

fn with_cookies(mut builder: HttpResponseBuilder, cookies: Vec<Cookie<'static>>) -> HttpResponseBuilder {
  for cookie in cookies {
    builder.cookie(cookie);
  }
  builder
}

/// Runs the signup pipeline and returns the created user.
pub(crate) async fn register_user(
  app_state: &AppState,
  email: String,
  password: String,
  first_name: String,
  last_name: String,
) -> Result<User, AppError> {
  let signup_ctx = ContextData::new(SignupCtxData {
    app_state: app_state.clone(),
    email,
    password,
    first_name,
    last_name,
    created_user: None,
  });

  match app_state.pipelines.signup.run(signup_ctx.clone()).await? {
    PipelineResult::Completed => signup_ctx.read().created_user.clone().ok_or_else(|| {
      warn!("Signup pipeline completed but no user was recorded in context.");
      AppError::Internal("Signup completed without creating a user.".to_string())
    }),
    PipelineResult::Stopped => Err(AppError::Internal(
      "Signup process was halted by an internal step.".to_string(),
    )),
  }
}

#[instrument(name = "handler::register", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let user = register_user(
    app_state.get_ref(),
    payload.email,
    payload.password,
    payload.first_name,
    payload.last_name,
  )
  .await?;

  info!(user_id = %user.id, "Registration successful.");
  Ok(with_cookies(HttpResponse::Created(), session_cookies_for(&user)).json(json!({
      "success": true,
      "message": "Account created.",
      "user": user,
  })))
}

#[instrument(name = "handler::login", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let email = req_payload.email.trim().to_ascii_lowercase();
  let invalid = || AppError::Auth("Invalid email or password.".to_string());

  let user = app_state.store.find_user_by_email(&email).await?.ok_or_else(invalid)?;
  if !auth_service::verify_password(&user.password_hash, &req_payload.password)? {
    warn!("Password mismatch on login.");
    return Err(invalid());
  }

  info!(user_id = %user.id, "Login successful.");
  Ok(with_cookies(HttpResponse::Ok(), session_cookies_for(&user)).json(json!({
      "success": true,
      "user": user,
  })))
}

pub async fn logout_handler() -> HttpResponse {
  with_cookies(HttpResponse::Ok(), cleared_session_cookies()).json(json!({
      "success": true,
      "message": "Signed out.",
  }))
}

#[instrument(name = "handler::me", skip(app_state, session), fields(email = %session.email))]
pub async fn me_handler(app_state: web::Data<AppState>, session: SessionIdentity) -> Result<HttpResponse, AppError> {
  let user = app_state.store.find_user_by_email(&session.email).await?;
  Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "session": session,
      "user": user,
  })))
}
