// server/src/lib.rs

//! HTTP server for the Souq storefront: actix-web routes over the `souq` domain core,
//! backed by Postgres (sqlx) or the in-memory store.

pub mod config;
pub mod db;
pub mod errors;
pub mod seed;
pub mod state;
pub mod web;

pub use crate::config::{AppConfig, StoreBackend};
pub use crate::errors::{AppError, Result};
pub use crate::state::AppState;
