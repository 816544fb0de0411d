// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use souq::PricingPolicy;
use std::env;
use std::time::Duration;

/// Which persistence engine backs the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres,
  Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  pub database_url: Option<String>,
  pub db_max_connections: u32,

  // Insert demo users, categories and products when the user table is empty.
  pub seed_db: bool,

  pub session_ttl_hours: i64,
  pub session_prune_interval: Duration,
  pub cookie_secure: bool,
  pub pricing_policy: PricingPolicy,
}

impl Default for AppConfig {
  /// In-memory settings, as used by the HTTP tests.
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 5000,
      store_backend: StoreBackend::Memory,
      database_url: None,
      db_max_connections: 5,
      seed_db: false,
      session_ttl_hours: 168,
      session_prune_interval: Duration::from_secs(86_400),
      cookie_secure: false,
      pricing_policy: PricingPolicy::Submitted,
    }
  }
}

fn parse_var<T>(var_name: &str, raw: Option<String>, default: T) -> Result<T>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    Some(value) => value
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, value, e))),
    None => Ok(default),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_vars(|var_name| env::var(var_name).ok())
  }

  /// Builds the configuration from any variable source; unset variables take their defaults.
  pub fn from_vars(get_var: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let defaults = Self::default();

    let server_host = get_var("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = parse_var("SERVER_PORT", get_var("SERVER_PORT"), defaults.server_port)?;

    let store_backend = match get_var("STORE_BACKEND").as_deref().map(str::trim) {
      None | Some("postgres") => StoreBackend::Postgres,
      Some("memory") => StoreBackend::Memory,
      Some(other) => {
        return Err(AppError::Config(format!(
          "Invalid STORE_BACKEND value '{}' (expected 'postgres' or 'memory')",
          other
        )))
      }
    };
    let database_url = get_var("DATABASE_URL");
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL' (required by the postgres backend)".to_string(),
      ));
    }
    let db_max_connections = parse_var("DB_MAX_CONNECTIONS", get_var("DB_MAX_CONNECTIONS"), defaults.db_max_connections)?;

    let seed_db = parse_var("SEED_DB", get_var("SEED_DB"), defaults.seed_db)?;

    let session_ttl_hours = parse_var("SESSION_TTL_HOURS", get_var("SESSION_TTL_HOURS"), defaults.session_ttl_hours)?;
    if session_ttl_hours <= 0 {
      return Err(AppError::Config("SESSION_TTL_HOURS must be positive".to_string()));
    }
    let prune_secs = parse_var(
      "SESSION_PRUNE_INTERVAL_SECS",
      get_var("SESSION_PRUNE_INTERVAL_SECS"),
      defaults.session_prune_interval.as_secs(),
    )?;
    if prune_secs == 0 {
      return Err(AppError::Config("SESSION_PRUNE_INTERVAL_SECS must be positive".to_string()));
    }
    let cookie_secure = parse_var("COOKIE_SECURE", get_var("COOKIE_SECURE"), defaults.cookie_secure)?;
    let pricing_policy = parse_var("PRICING_POLICY", get_var("PRICING_POLICY"), defaults.pricing_policy)?;

    tracing::info!(
      backend = ?store_backend,
      %pricing_policy,
      seed_db,
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      db_max_connections,
      seed_db,
      session_ttl_hours,
      session_prune_interval: Duration::from_secs(prune_secs),
      cookie_secure,
      pricing_policy,
    })
  }

  pub fn session_ttl(&self) -> chrono::Duration {
    chrono::Duration::hours(self.session_ttl_hours)
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}
