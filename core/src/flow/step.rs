// core/src/flow/step.rs

use super::ContextData;
use std::sync::Arc;

/// Predicate evaluated right before a step; `true` skips the step.
pub type SkipCondition<TData> = Arc<dyn Fn(&ContextData<TData>) -> bool + Send + Sync + 'static>;

/// One named step of a flow.
#[derive(Clone)]
pub struct StepDef<TData: Send + Sync + 'static> {
  pub name: String,
  pub optional: bool,
  pub skip_if: Option<SkipCondition<TData>>,
}

impl<TData: Send + Sync + 'static> StepDef<TData> {
  pub fn new(name: &str, optional: bool) -> Self {
    Self {
      name: name.to_string(),
      optional,
      skip_if: None,
    }
  }
}

// SkipCondition has no Debug of its own.
impl<TData: Send + Sync + 'static> std::fmt::Debug for StepDef<TData> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}
