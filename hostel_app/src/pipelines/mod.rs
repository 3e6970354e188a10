// hostel_app/src/pipelines/mod.rs

//! Defines and builds the multi-step flows used by the hostel application.

pub mod booking_pipeline;
pub mod contexts;
pub mod engine;
pub mod signup_pipeline;

pub use engine::{ContextData, Pipeline, PipelineControl, PipelineResult};

use contexts::{BookingCtxData, SignupCtxData};

/// Every pipeline the application runs, built once at startup.
pub struct AppPipelines {
  pub booking: Pipeline<BookingCtxData>,
  pub signup: Pipeline<SignupCtxData>,
}

pub fn build_all_pipelines() -> AppPipelines {
  tracing::info!("Building application pipelines...");
  let pipelines = AppPipelines {
    booking: booking_pipeline::build_booking_pipeline(),
    signup: signup_pipeline::build_signup_pipeline(),
  };
  tracing::info!("All application pipelines built.");
  pipelines
}
