// core/src/auth/password.rs

//! Credential hashing and verification (Argon2, default parameters, random salt per hash).

use crate::error::SouqError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use tracing::{debug, error, instrument};

/// Hashes a plain-text password into its PHC string form.
#[instrument(name = "password::hash", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, SouqError> {
  if password.is_empty() {
    return Err(SouqError::Validation("Password cannot be empty".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      SouqError::Internal(format!("Password hashing failed: {}", argon_err))
    })
}

/// `Ok(true)` when `provided` matches the stored hash, `Ok(false)` on mismatch.
/// A stored value that is not a valid PHC string is an internal error, not a mismatch.
#[instrument(name = "password::verify", skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, provided: &str) -> Result<bool, SouqError> {
  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Stored credential is not a valid password hash.");
    SouqError::Internal(format!("Invalid stored password hash: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password mismatch.");
      Ok(false)
    }
    Err(other) => {
      error!(error = %other, "Argon2 password verification failed.");
      Err(SouqError::Internal(format!("Password verification failed: {}", other)))
    }
  }
}
