// hostel_app/src/web/session.rs

//! Cookie-carried identity. The cookies are plain values set at login; nothing
//! here verifies them, so any handler reading a `SessionIdentity` is trusting
//! the client.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;
use crate::models::User;

pub const USER_ID_COOKIE: &str = "userId";
pub const USER_EMAIL_COOKIE: &str = "userEmail";
pub const USER_NAME_COOKIE: &str = "userName";

const SESSION_COOKIES: [&str; 3] = [USER_ID_COOKIE, USER_EMAIL_COOKIE, USER_NAME_COOKIE];

/// Raw cookie values, whatever is present.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookies {
  pub user_id: Option<String>,
  pub user_email: Option<String>,
  pub user_name: Option<String>,
}

impl SessionCookies {
  pub fn from_request(req: &HttpRequest) -> Self {
    let value = |name: &str| {
      req
        .cookie(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.trim().is_empty())
    };
    Self {
      user_id: value(USER_ID_COOKIE),
      user_email: value(USER_EMAIL_COOKIE),
      user_name: value(USER_NAME_COOKIE),
    }
  }

  pub fn has_session(&self) -> bool {
    self.user_email.is_some()
  }
}

/// Identity claimed by the session cookies. `userEmail` is the one required cookie.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
  pub user_id: Option<String>,
  pub email: String,
  pub name: Option<String>,
}

impl FromRequest for SessionIdentity {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let cookies = SessionCookies::from_request(req);
    match cookies.user_email {
      Some(email) => ready(Ok(SessionIdentity {
        user_id: cookies.user_id,
        email,
        name: cookies.user_name,
      })),
      None => {
        debug!("SessionIdentity extractor: no userEmail cookie.");
        ready(Err(AppError::Auth("Not signed in.".to_string())))
      }
    }
  }
}

/// Cookies written on login and registration.
pub fn session_cookies_for(user: &User) -> Vec<Cookie<'static>> {
  [
    (USER_ID_COOKIE, user.id.to_string()),
    (USER_EMAIL_COOKIE, user.email.clone()),
    (USER_NAME_COOKIE, user.display_name()),
  ]
  .into_iter()
  .map(|(name, value)| {
    Cookie::build(name, value)
      .path("/")
      .http_only(true)
      .same_site(SameSite::Lax)
      .finish()
  })
  .collect()
}

/// Expired copies of every session cookie, for logout.
pub fn cleared_session_cookies() -> Vec<Cookie<'static>> {
  SESSION_COOKIES
    .into_iter()
    .map(|name| {
      let mut cookie = Cookie::build(name, "").path("/").finish();
      cookie.make_removal();
      cookie
    })
    .collect()
}
