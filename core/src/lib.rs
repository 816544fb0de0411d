// core/src/lib.rs

//! Souq: the domain core of a digital-goods storefront.
//!
//! - [`auth::AuthGate`] decides who a request comes from and enforces the public /
//!   authenticated / admin tiers.
//! - [`checkout::OrderPlacement`] validates a cart, totals it and records the order and its
//!   items as one unit of work.
//! - [`ledger::OrderLedger`] and [`catalog::Catalog`] serve the read side and product admin.
//! - Storage and sessions are injected collaborators ([`store::Store`],
//!   [`session::SessionStore`]), each with an in-memory implementation.
//!
//! Multi-step operations are written as [`flow::Flow`]s of named async steps.

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod flow;
pub mod ledger;
pub mod models;
pub mod session;
pub mod store;

pub use crate::auth::{AuthGate, Caller, Registration, Session};
pub use crate::catalog::Catalog;
pub use crate::checkout::{OrderPlacement, PricingPolicy};
pub use crate::error::{FlowError, SouqError, SouqResult, StoreError, StoreResult, UniqueField};
pub use crate::flow::{ContextData, Flow, FlowOutcome, StepControl};
pub use crate::ledger::OrderLedger;
pub use crate::session::{MemorySessionStore, SessionId, SessionStore};
pub use crate::store::{MemoryStore, Store};
