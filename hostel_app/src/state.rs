// hostel_app/src/state.rs
use crate::config::AppConfig;
use crate::db::HostelStore;
use crate::pipelines::{self, AppPipelines};
use crate::services::PaymentGateway;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn HostelStore>,
  pub gateway: Arc<dyn PaymentGateway>,
  pub pipelines: Arc<AppPipelines>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  pub fn new(store: Arc<dyn HostelStore>, gateway: Arc<dyn PaymentGateway>, config: Arc<AppConfig>) -> Self {
    Self {
      store,
      gateway,
      pipelines: Arc::new(pipelines::build_all_pipelines()),
      config,
    }
  }
}
