// hostel_app/src/pipelines/engine.rs

//! A small step runner for the multi-step flows (booking creation, registration).
//!
//! A `Pipeline<T>` is an ordered list of named steps. Each step has zero or more
//! async handlers that share one `ContextData<T>`. A handler either lets the
//! pipeline continue or stops it; an error from a required step aborts the run,
//! an error from an optional step is logged and the run moves on.

use futures_util::future::BoxFuture;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, info_span, instrument, warn, Instrument};

use crate::errors::{AppError, Result as AppResult};

/// Shared, lockable context passed to every handler of a run.
///
/// Lock guards are blocking and MUST be dropped before any `.await`.
#[derive(Debug)]
pub struct ContextData<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> ContextData<T> {
  pub fn new(data: T) -> Self {
    ContextData(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }
}

impl<T: Send + Sync + 'static> Clone for ContextData<T> {
  fn clone(&self) -> Self {
    ContextData(Arc::clone(&self.0))
  }
}

/// Signal from a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt the pipeline; no further handlers or steps run.
  Stop,
}

/// Outcome of a full run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  Completed,
  Stopped,
}

pub type Handler<T> = Box<dyn Fn(ContextData<T>) -> BoxFuture<'static, AppResult<PipelineControl>> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct StepDef {
  pub name: String,
  pub optional: bool,
}

pub struct Pipeline<T: Send + Sync + 'static> {
  name: &'static str,
  steps: Vec<StepDef>,
  handlers: HashMap<String, Vec<Handler<T>>>,
}

impl<T: Send + Sync + 'static> Pipeline<T> {
  /// `step_defs` is `(step name, optional)` in execution order.
  pub fn new(name: &'static str, step_defs: &[(&str, bool)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(step_name, optional)| StepDef {
        name: (*step_name).to_string(),
        optional: *optional,
      })
      .collect();
    Self {
      name,
      steps,
      handlers: HashMap::new(),
    }
  }

  /// Registers a handler for `step_name`.
  ///
  /// # Panics
  /// When the step is not part of the pipeline definition. This is a wiring
  /// mistake caught at startup, not a runtime condition.
  pub fn on_root<F, Fut>(&mut self, step_name: &str, handler: F)
  where
    F: Fn(ContextData<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<PipelineControl>> + Send + 'static,
  {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!(
        "Pipeline '{}' setup error: step '{}' not found in definition.",
        self.name, step_name
      );
    }
    let boxed: Handler<T> = Box::new(move |ctx| Box::pin(handler(ctx)));
    self.handlers.entry(step_name.to_string()).or_default().push(boxed);
  }

  #[instrument(name = "Pipeline::run", skip_all, fields(pipeline = self.name, num_steps = self.steps.len()))]
  pub async fn run(&self, ctx_data: ContextData<T>) -> AppResult<PipelineResult> {
    for (step_index, step) in self.steps.iter().enumerate() {
      let handlers = match self.handlers.get(&step.name) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ if step.optional => {
          debug!(step = %step.name, "Optional step has no handlers, skipping.");
          continue;
        }
        _ => {
          return Err(AppError::Workflow(format!(
            "Handler missing for non-optional step '{}' in pipeline '{}'.",
            step.name, self.name
          )));
        }
      };

      let step_span = info_span!(
        "pipeline_step",
        step_name = %step.name,
        step_index,
        optional = step.optional
      );

      for handler in handlers {
        match handler(ctx_data.clone()).instrument(step_span.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            info!(step = %step.name, "Pipeline stopped by handler.");
            return Ok(PipelineResult::Stopped);
          }
          Err(err) if step.optional => {
            warn!(step = %step.name, error = %err, "Optional step failed, continuing.");
            break;
          }
          Err(err) => return Err(err),
        }
      }
    }
    Ok(PipelineResult::Completed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Default)]
  struct Trail {
    visited: Vec<&'static str>,
  }

  fn record(name: &'static str) -> impl Fn(ContextData<Trail>) -> BoxFuture<'static, AppResult<PipelineControl>> {
    move |ctx| {
      Box::pin(async move {
        ctx.write().visited.push(name);
        Ok(PipelineControl::Continue)
      })
    }
  }

  #[tokio::test]
  async fn runs_steps_in_declared_order() {
    let mut p = Pipeline::<Trail>::new("trail", &[("a", false), ("b", false), ("c", false)]);
    p.on_root("c", record("c"));
    p.on_root("a", record("a"));
    p.on_root("b", record("b"));

    let ctx = ContextData::new(Trail::default());
    assert_eq!(p.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
    assert_eq!(ctx.read().visited, vec!["a", "b", "c"]);
  }

  #[tokio::test]
  async fn stop_halts_remaining_steps() {
    let mut p = Pipeline::<Trail>::new("trail", &[("a", false), ("halt", false), ("c", false)]);
    p.on_root("a", record("a"));
    p.on_root("halt", |ctx: ContextData<Trail>| async move {
      ctx.write().visited.push("halt");
      Ok(PipelineControl::Stop)
    });
    p.on_root("c", record("c"));

    let ctx = ContextData::new(Trail::default());
    assert_eq!(p.run(ctx.clone()).await.unwrap(), PipelineResult::Stopped);
    assert_eq!(ctx.read().visited, vec!["a", "halt"]);
  }

  #[tokio::test]
  async fn required_step_error_aborts_and_optional_error_is_skipped() {
    let mut p = Pipeline::<Trail>::new("trail", &[("maybe", true), ("must", false), ("never", false)]);
    p.on_root("maybe", |_ctx: ContextData<Trail>| async move {
      Err(AppError::Internal("optional failure".to_string()))
    });
    p.on_root("must", |_ctx: ContextData<Trail>| async move {
      Err(AppError::Conflict("required failure".to_string()))
    });
    p.on_root("never", record("never"));

    let ctx = ContextData::new(Trail::default());
    let err = p.run(ctx.clone()).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(m) if m == "required failure"));
    assert!(ctx.read().visited.is_empty());
  }

  #[tokio::test]
  async fn missing_handler_on_required_step_is_a_workflow_error() {
    let mut p = Pipeline::<Trail>::new("trail", &[("skippable", true), ("missing", false)]);
    p.on_root("skippable", record("skippable"));
    let err = p.run(ContextData::new(Trail::default())).await.unwrap_err();
    assert!(matches!(err, AppError::Workflow(m) if m.contains("missing")));
  }

  #[test]
  #[should_panic(expected = "not found in definition")]
  fn registering_unknown_step_panics() {
    let mut p = Pipeline::<Trail>::new("trail", &[("a", false)]);
    p.on_root("typo", record("typo"));
  }
}
