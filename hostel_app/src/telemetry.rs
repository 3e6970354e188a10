// hostel_app/src/telemetry.rs

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

/// Installs the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing(format: LogFormat) {
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  match format {
    LogFormat::Json => tracing_subscriber::fmt()
      .json()
      .with_env_filter(env_filter)
      .with_span_events(FmtSpan::CLOSE)
      .with_current_span(true)
      .init(),
    LogFormat::Pretty => tracing_subscriber::fmt()
      .with_env_filter(env_filter)
      .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
      .init(),
  }
}
