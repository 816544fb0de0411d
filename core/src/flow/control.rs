// core/src/flow/control.rs

//! Signals for steering a flow and the outcome of a whole run.

/// Returned by every step handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// Run the remaining handlers of this step, then the next step.
  Continue,
  /// Halt the flow immediately; nothing after this handler runs.
  Stop,
}

/// Outcome of `Flow::run` when no handler failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  Completed,
  Stopped,
}
