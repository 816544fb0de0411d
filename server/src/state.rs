// server/src/state.rs

use crate::config::{AppConfig, StoreBackend};
use crate::db::PgStore;
use crate::errors::{AppError, Result};
use souq::{AuthGate, Catalog, MemorySessionStore, MemoryStore, OrderLedger, OrderPlacement, SessionStore, Store};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

/// Everything a request handler needs, shared across workers.
#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub sessions: Arc<dyn SessionStore>,
  pub auth: Arc<AuthGate>,
  pub checkout: Arc<OrderPlacement>,
  pub ledger: OrderLedger,
  pub catalog: Catalog,
  pub config: Arc<AppConfig>,
}

impl AppState {
  pub fn new(store: Arc<dyn Store>, sessions: Arc<dyn SessionStore>, config: Arc<AppConfig>) -> Self {
    Self {
      auth: Arc::new(AuthGate::new(store.clone(), sessions.clone())),
      checkout: Arc::new(OrderPlacement::new(store.clone(), config.pricing_policy)),
      ledger: OrderLedger::new(store.clone()),
      catalog: Catalog::new(store.clone()),
      store,
      sessions,
      config,
    }
  }

  /// Connects the configured backend (running migrations for Postgres) and wires the services.
  pub async fn from_config(config: Arc<AppConfig>) -> Result<Self> {
    let store: Arc<dyn Store> = match config.store_backend {
      StoreBackend::Memory => {
        info!("Using the in-memory store; data will not survive a restart.");
        Arc::new(MemoryStore::new())
      }
      StoreBackend::Postgres => {
        let database_url = config
          .database_url
          .as_deref()
          .ok_or_else(|| AppError::Config("DATABASE_URL is not set".to_string()))?;
        let pool = PgPoolOptions::new()
          .max_connections(config.db_max_connections)
          .connect(database_url)
          .await?;
        info!("Successfully connected to the database.");
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied.");
        Arc::new(PgStore::new(pool))
      }
    };
    let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new(config.session_ttl()));
    Ok(Self::new(store, sessions, config))
  }
}
