// hostel_app/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;

use hostel_app::config::AppConfig;
use hostel_app::db::{self, PgStore};
use hostel_app::errors::set_expose_error_details;
use hostel_app::services::PayMongoGateway;
use hostel_app::state::AppState;
use hostel_app::telemetry;
use hostel_app::web::configure_app_routes;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = Arc::new(AppConfig::from_env().context("Failed to load application configuration")?);
  telemetry::init_tracing(app_config.log_format);

  tracing::info!(
    environment = app_config.environment.as_str(),
    "Starting hostel booking server..."
  );
  set_expose_error_details(app_config.expose_error_details());

  let db_pool = db::postgres::connect(&app_config)
    .await
    .context("Failed to initialise the database")?;
  let store = PgStore::new(db_pool);

  if app_config.seed_db {
    let inserted = db::seed::seed_demo_rooms(&store).await.context("Failed to seed demo rooms")?;
    tracing::info!(inserted, "Database seeding finished.");
  }

  if !app_config.gateway_configured() {
    tracing::warn!("PAYMONGO_SECRET_KEY is not set; payment routes will fail until it is configured.");
  }
  let gateway = PayMongoGateway::new(&app_config).context("Failed to build the payment gateway client")?;

  let app_state = AppState::new(Arc::new(store), Arc::new(gateway), app_config.clone());
  let debug_routes = app_config.enable_debug_routes;

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(|cfg| configure_app_routes(cfg, debug_routes))
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await
  .context("HTTP server terminated with an error")
}
