// core/src/flow/mod.rs

//! A small named-step flow engine.
//!
//! Login, registration and order placement are each a `Flow` over their own context
//! struct. Steps run strictly in order; the first failing handler aborts the run and its
//! error is handed back to the caller untouched, so "validate everything, then write"
//! orderings are expressed simply by placing the write steps last.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod step;

pub use context_data::ContextData;
pub use control::{FlowOutcome, StepControl};
pub use definition::{Flow, Handler};
pub use step::{SkipCondition, StepDef};
