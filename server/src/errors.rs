// server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use souq::SouqError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Domain(#[from] SouqError),

  #[error("Bad Request: {0}")]
  BadRequest(String),

  /// A 401 whose message differs from the generic `Unauthorized`.
  #[error("{0}")]
  NotAuthenticated(&'static str),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// The message sent to the client. Server-side failures never leak their cause.
  fn client_message(&self) -> String {
    match self {
      AppError::Domain(
        err @ (SouqError::Unauthorized
        | SouqError::Forbidden
        | SouqError::EmptyCart
        | SouqError::InvalidLineItem { .. }
        | SouqError::UsernameTaken
        | SouqError::EmailTaken
        | SouqError::InvalidCredentials
        | SouqError::NotFound(_)
        | SouqError::Validation(_)),
      ) => err.to_string(),
      AppError::BadRequest(m) => m.clone(),
      AppError::NotAuthenticated(m) => m.to_string(),
      _ => "Internal server error".to_string(),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Domain(err) => match err {
        SouqError::Unauthorized | SouqError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        SouqError::Forbidden => StatusCode::FORBIDDEN,
        SouqError::NotFound(_) => StatusCode::NOT_FOUND,
        SouqError::EmptyCart
        | SouqError::InvalidLineItem { .. }
        | SouqError::UsernameTaken
        | SouqError::EmailTaken
        | SouqError::Validation(_) => StatusCode::BAD_REQUEST,
        SouqError::Persistence { .. } | SouqError::Flow(_) | SouqError::Internal(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
      AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
      AppError::NotAuthenticated(_) => StatusCode::UNAUTHORIZED,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Migrate(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, error_debug = ?self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with error");
    }
    HttpResponse::build(status).json(json!({ "message": self.client_message() }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
