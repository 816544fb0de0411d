// core/src/error.rs

use thiserror::Error;

/// Failures of the flow engine itself, as opposed to failures of a step's business logic.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Flow '{flow}' has no handler for required step '{step_name}'")]
  HandlerMissing { flow: String, step_name: String },

  #[error("Flow '{flow}' ended at step '{step_name}' without producing its result")]
  Incomplete { flow: String, step_name: String },
}

/// Which unique constraint a write collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
  Username,
  Email,
  CategorySlug,
}

/// Errors reported by a persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Unique constraint violated on {0:?}")]
  Duplicate(UniqueField),

  #[error("Referenced category does not exist")]
  UnknownCategory,

  #[error("Storage backend failure: {0}")]
  Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The storefront's error taxonomy. Every variant maps to one fixed HTTP status at the boundary.
#[derive(Debug, Error)]
pub enum SouqError {
  #[error("Unauthorized")]
  Unauthorized,

  #[error("Forbidden")]
  Forbidden,

  #[error("Cart is empty")]
  EmptyCart,

  #[error("Invalid cart item at position {index}: {reason}")]
  InvalidLineItem { index: usize, reason: String },

  #[error("Username already exists")]
  UsernameTaken,

  #[error("Email already exists")]
  EmailTaken,

  #[error("Invalid username or password")]
  InvalidCredentials,

  #[error("{0} not found")]
  NotFound(String),

  #[error("{0}")]
  Validation(String),

  #[error("Persistence failure: {source}")]
  Persistence {
    #[source]
    source: anyhow::Error,
  },

  #[error("Flow failure: {0}")]
  Flow(#[from] FlowError),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl SouqError {
  pub fn persistence(source: impl Into<anyhow::Error>) -> Self {
    SouqError::Persistence { source: source.into() }
  }
}

impl From<StoreError> for SouqError {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::Duplicate(UniqueField::Username) => SouqError::UsernameTaken,
      StoreError::Duplicate(UniqueField::Email) => SouqError::EmailTaken,
      StoreError::Duplicate(UniqueField::CategorySlug) => {
        SouqError::Validation("Category slug already exists".to_string())
      }
      StoreError::UnknownCategory => SouqError::Validation("Category does not exist".to_string()),
      StoreError::Backend(source) => SouqError::Persistence { source },
    }
  }
}

pub type SouqResult<T, E = SouqError> = std::result::Result<T, E>;
