// core/src/models/identity.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i32;

/// A stored account, credential included. Never sent to clients as-is; see [`Identity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: UserId,
  pub username: String,
  pub email: String,
  #[serde(skip_serializing)] // Never send the credential to the client
  pub password: String,
  pub is_admin: bool,
  pub created_at: DateTime<Utc>,
}

/// Who is making a request. This is the only user shape that crosses the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
  pub id: UserId,
  pub username: String,
  pub email: String,
  pub is_admin: bool,
}

impl From<&User> for Identity {
  fn from(user: &User) -> Self {
    Identity {
      id: user.id,
      username: user.username.clone(),
      email: user.email.clone(),
      is_admin: user.is_admin,
    }
  }
}

impl From<User> for Identity {
  fn from(user: User) -> Self {
    Identity {
      id: user.id,
      username: user.username,
      email: user.email,
      is_admin: user.is_admin,
    }
  }
}

/// Insert payload for a user. `password` already holds the stored credential form.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username: String,
  pub email: String,
  pub password: String,
  pub is_admin: bool,
}
