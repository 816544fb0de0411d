// server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use souq_server::web::configure_app_routes;
use souq_server::{seed, AppConfig, AppState};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting storefront server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };

  let app_state = match AppState::from_config(app_config.clone()).await {
    Ok(state) => state,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialise the store.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };

  if app_config.seed_db {
    if let Err(e) = seed::seed_if_empty(&app_state).await {
      tracing::error!(error = %e, "Failed to seed database.");
    }
  }

  // Expired sessions are dropped lazily on lookup; this sweep bounds memory for abandoned ones.
  let sessions = app_state.sessions.clone();
  let prune_every = app_config.session_prune_interval;
  actix_web::rt::spawn(async move {
    let mut ticker = tokio::time::interval(prune_every);
    ticker.tick().await; // The first tick completes immediately
    loop {
      ticker.tick().await;
      let removed = sessions.prune_expired();
      tracing::debug!(removed, "Pruned expired sessions.");
    }
  });

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
