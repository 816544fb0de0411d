// server/src/db/mod.rs

//! Postgres implementation of the storefront's persistence traits.

mod pg_store;
mod rows;

pub use pg_store::PgStore;
