// hostel_app/src/pipelines/signup_pipeline.rs

use tracing::{event, info, warn, Level};

use crate::errors::{AppError, Result as AppResult};
use crate::models::NewUser;
use crate::pipelines::contexts::SignupCtxData;
use crate::pipelines::engine::{ContextData, Pipeline, PipelineControl};
use crate::services::auth_service;

const MIN_PASSWORD_LEN: usize = 8;

/// Email and names are echoed into session cookies, so they must be valid cookie values.
fn fits_in_cookie(value: &str) -> bool {
  !value.chars().any(|c| c.is_control() || c == ';' || c == '"' || c == '\\')
}

/// Builds the registration pipeline, shared by `/auth/register` and the demo-user route.
pub fn build_signup_pipeline() -> Pipeline<SignupCtxData> {
  let mut signup_p = Pipeline::<SignupCtxData>::new(
    "signup",
    &[
      ("validate_signup_input", false),
      ("check_existing_user_signup", false),
      ("create_user_in_db", false),
    ],
  );

  // Step 1: Validate input
  signup_p.on_root("validate_signup_input", |ctx_data: ContextData<SignupCtxData>| async move {
    let mut guard = ctx_data.write();
    guard.email = guard.email.trim().to_ascii_lowercase();

    event!(Level::DEBUG, email = %guard.email, "Validating signup input.");
    if guard.email.is_empty()
      || !guard.email.contains('@')
      || guard.email.chars().any(|c| c.is_whitespace() || c == ',')
      || !fits_in_cookie(&guard.email)
    {
      warn!("Invalid email format provided for signup.");
      return Err(AppError::Validation("Valid email is required.".to_string()));
    }
    if guard.password.len() < MIN_PASSWORD_LEN {
      return Err(AppError::Validation(format!(
        "Password must be at least {} characters long.",
        MIN_PASSWORD_LEN
      )));
    }
    if guard.first_name.trim().is_empty() {
      return Err(AppError::Validation("First name is required.".to_string()));
    }
    if !fits_in_cookie(&guard.first_name) || !fits_in_cookie(&guard.last_name) {
      warn!("Signup name contains control or separator characters.");
      return Err(AppError::Validation(
        "Names may not contain control characters, quotes, backslashes or ';'.".to_string(),
      ));
    }
    Ok(PipelineControl::Continue)
  });

  // Step 2: Check if user with this email already exists
  signup_p.on_root("check_existing_user_signup", |ctx_data: ContextData<SignupCtxData>| async move {
    let (email_val, store) = {
      let guard = ctx_data.read();
      (guard.email.clone(), guard.app_state.store.clone())
    };

    if store.find_user_by_email(&email_val).await?.is_some() {
      warn!("Attempt to signup with existing email: {}", email_val);
      return Err(AppError::Validation("An account with this email already exists.".to_string()));
    }
    Ok(PipelineControl::Continue)
  });

  // Step 3: Hash the password and create the user row
  signup_p.on_root("create_user_in_db", create_user_in_db);

  signup_p
}

async fn create_user_in_db(ctx_data: ContextData<SignupCtxData>) -> AppResult<PipelineControl> {
  let (new_user, store) = {
    let guard = ctx_data.read();
    let password_hash = auth_service::hash_password(&guard.password)?;
    (
      NewUser {
        email: guard.email.clone(),
        first_name: guard.first_name.trim().to_string(),
        last_name: guard.last_name.trim().to_string(),
        password_hash,
      },
      guard.app_state.store.clone(),
    )
  };

  let user = store.create_user(new_user).await?;
  info!(user_id = %user.id, "User created.");
  ctx_data.write().created_user = Some(user);
  Ok(PipelineControl::Continue)
}
