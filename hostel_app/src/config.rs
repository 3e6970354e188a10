// hostel_app/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Deployment environment, drives error-detail exposure and debug routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
  Development,
  Production,
}

impl AppEnvironment {
  pub fn as_str(&self) -> &'static str {
    match self {
      AppEnvironment::Development => "development",
      AppEnvironment::Production => "production",
    }
  }
}

impl FromStr for AppEnvironment {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "development" | "dev" => Ok(AppEnvironment::Development),
      "production" | "prod" => Ok(AppEnvironment::Production),
      other => Err(AppError::Config(format!("Invalid APP_ENV value: '{}'", other))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,
  pub app_base_url: String,
  pub environment: AppEnvironment,
  pub enable_debug_routes: bool,

  // Payment gateway
  pub paymongo_secret_key: String,
  pub paymongo_api_base: String,
  pub payment_currency: String,
  pub gateway_timeout: Duration,

  // Demo-seed account
  pub demo_user_email: String,
  pub demo_user_password: String,

  pub seed_db: bool,
  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; `from_env` passes the process environment.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

    let server_host = get_or("SERVER_HOST", "127.0.0.1");
    let server_port = get_or("SERVER_PORT", "8080")
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url =
      lookup("DATABASE_URL").ok_or_else(|| AppError::Config("Missing environment variable 'DATABASE_URL'".to_string()))?;
    let database_max_connections = get_or("DATABASE_MAX_CONNECTIONS", "5")
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;
    let app_base_url = lookup("APP_BASE_URL").unwrap_or_else(|| format!("http://{}:{}", server_host, server_port));

    let environment = get_or("APP_ENV", "development").parse::<AppEnvironment>()?;
    let enable_debug_routes = match lookup("ENABLE_DEBUG_ROUTES") {
      Some(raw) => raw
        .parse::<bool>()
        .map_err(|e| AppError::Config(format!("Invalid ENABLE_DEBUG_ROUTES value: {}", e)))?,
      None => environment != AppEnvironment::Production,
    };

    let paymongo_secret_key = get_or("PAYMONGO_SECRET_KEY", "");
    let paymongo_api_base = get_or("PAYMONGO_API_BASE", "https://api.paymongo.com/v1")
      .trim_end_matches('/')
      .to_string();
    let payment_currency = get_or("PAYMENT_CURRENCY", "PHP").to_ascii_uppercase();
    let gateway_timeout = match get_or("GATEWAY_TIMEOUT_SECS", "30").parse::<u64>() {
      Ok(0) => return Err(AppError::Config("GATEWAY_TIMEOUT_SECS must be at least 1".to_string())),
      Ok(secs) => Duration::from_secs(secs),
      Err(e) => return Err(AppError::Config(format!("Invalid GATEWAY_TIMEOUT_SECS: {}", e))),
    };

    let demo_user_email = get_or("DEMO_USER_EMAIL", "demo@hostel.local");
    let demo_user_password = get_or("DEMO_USER_PASSWORD", "demo12345");

    let seed_db = get_or("SEED_DB", "false")
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_DB value: {}", e)))?;
    let log_format = match get_or("LOG_FORMAT", "pretty").to_ascii_lowercase().as_str() {
      "json" => LogFormat::Json,
      "pretty" | "text" => LogFormat::Pretty,
      other => return Err(AppError::Config(format!("Invalid LOG_FORMAT value: '{}'", other))),
    };

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      app_base_url,
      environment,
      enable_debug_routes,
      paymongo_secret_key,
      paymongo_api_base,
      payment_currency,
      gateway_timeout,
      demo_user_email,
      demo_user_password,
      seed_db,
      log_format,
    })
  }

  pub fn is_production(&self) -> bool {
    self.environment == AppEnvironment::Production
  }

  /// Error bodies include `details` only outside production.
  pub fn expose_error_details(&self) -> bool {
    !self.is_production()
  }

  pub fn gateway_configured(&self) -> bool {
    !self.paymongo_secret_key.is_empty()
  }
}
