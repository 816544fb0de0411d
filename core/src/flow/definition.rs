// core/src/flow/definition.rs

//! The `Flow<TData, Err>` type: an ordered list of named steps, the handlers registered
//! on them, and the `run` loop that drives a shared `ContextData<TData>` through them.

use super::context_data::ContextData;
use super::control::{FlowOutcome, StepControl};
use super::step::StepDef;
use crate::error::FlowError;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{event, info_span, instrument, Instrument, Level};

/// A step handler: takes a clone of the shared context and resolves to a control signal.
///
/// Handlers copy what they need out of the context, drop the guard, and only then await.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>>
    + Send
    + Sync,
>;

/// A named, ordered sequence of async steps over `TData`.
///
/// `Err` is what the handlers fail with; it must absorb engine errors (`From<FlowError>`)
/// so that a misconfigured flow surfaces through the same channel as a failing handler.
pub struct Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  name: &'static str,
  steps: Vec<StepDef<TData>>,
  handlers: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Creates a flow from `(step_name, optional)` pairs, run in the given order.
  pub fn new(name: &'static str, step_defs: &[(&str, bool)]) -> Self {
    Self {
      name,
      steps: step_defs
        .iter()
        .map(|(step_name, optional)| StepDef::new(step_name, *optional))
        .collect(),
      handlers: HashMap::new(),
    }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  fn step_mut(&mut self, step_name: &str) -> &mut StepDef<TData> {
    // Unknown step names are wiring mistakes, caught the first time the flow is built.
    let flow_name = self.name;
    self
      .steps
      .iter_mut()
      .find(|s| s.name == step_name)
      .unwrap_or_else(|| panic!("flow '{}' has no step named '{}'", flow_name, step_name))
  }

  /// Skips `step_name` whenever `condition` holds at the moment the step is reached.
  pub fn skip_step_if(
    &mut self,
    step_name: &str,
    condition: impl Fn(&ContextData<TData>) -> bool + Send + Sync + 'static,
  ) {
    self.step_mut(step_name).skip_if = Some(Arc::new(condition));
  }

  /// Registers a handler on `step_name`. Several handlers on one step run in registration order.
  pub fn on_step<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.step_mut(step_name);
    let handler: Handler<TData, Err> = Box::new(move |ctx_data| {
      let user_fut = handler_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    self.handlers.entry(step_name.to_string()).or_default().push(handler);
  }

  /// Drives `ctx_data` through every step.
  #[instrument(name = "Flow::run", skip_all, fields(flow = self.name, num_steps = self.steps.len()), err(Display))]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<FlowOutcome, Err> {
    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_span = info_span!("flow_step", step = step_def.name.as_str(), step_index = step_idx);

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(&ctx_data) {
          event!(parent: &step_span, Level::DEBUG, "Step skipped by its condition.");
          continue;
        }
      }

      let handlers = match self.handlers.get(&step_def.name) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ if step_def.optional => {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers, skipping.");
          continue;
        }
        _ => {
          event!(parent: &step_span, Level::ERROR, "Required step has no handlers.");
          return Err(Err::from(FlowError::HandlerMissing {
            flow: self.name.to_string(),
            step_name: step_def.name.clone(),
          }));
        }
      };

      for handler_fn in handlers {
        match handler_fn(ctx_data.clone()).instrument(step_span.clone()).await {
          Ok(StepControl::Continue) => {}
          Ok(StepControl::Stop) => {
            event!(parent: &step_span, Level::INFO, "Flow stopped by a handler.");
            return Ok(FlowOutcome::Stopped);
          }
          Err(e) => {
            event!(parent: &step_span, Level::DEBUG, error = %e, "Step handler failed.");
            return Err(e);
          }
        }
      }
    }

    event!(Level::DEBUG, "Flow completed.");
    Ok(FlowOutcome::Completed)
  }
}
