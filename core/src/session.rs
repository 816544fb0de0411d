// core/src/session.rs

//! The session collaborator: a server-side binding from an opaque, client-held token to a
//! user id. Injected into `AuthGate`; nothing here is process-global.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;
use uuid::Uuid;

use crate::models::UserId;

/// Opaque session token. Only ever compared, never parsed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
  pub fn generate() -> Self {
    SessionId(Uuid::new_v4().simple().to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<String> for SessionId {
  fn from(raw: String) -> Self {
    SessionId(raw)
  }
}

impl From<&str> for SessionId {
  fn from(raw: &str) -> Self {
    SessionId(raw.to_string())
  }
}

// Tokens are credentials; keep them out of Debug output and therefore out of logs.
impl fmt::Debug for SessionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("SessionId(..)")
  }
}

pub trait SessionStore: Send + Sync {
  /// Binds `session` to `user_id`, replacing any previous binding of that token.
  fn bind(&self, session: &SessionId, user_id: UserId);

  /// The user bound to `session`, unless the binding is missing or expired.
  fn resolve(&self, session: &SessionId) -> Option<UserId>;

  /// Drops the binding. Invalidating an unknown token is not an error.
  fn invalidate(&self, session: &SessionId);

  /// Removes expired bindings and returns how many were removed.
  fn prune_expired(&self) -> usize;
}

#[derive(Debug, Clone, Copy)]
struct Binding {
  user_id: UserId,
  expires_at: DateTime<Utc>,
}

/// Sessions kept in process memory, each living `ttl` from the moment it was bound.
#[derive(Debug)]
pub struct MemorySessionStore {
  ttl: Duration,
  bindings: RwLock<HashMap<SessionId, Binding>>,
}

impl MemorySessionStore {
  pub fn new(ttl: Duration) -> Self {
    Self {
      ttl,
      bindings: RwLock::new(HashMap::new()),
    }
  }

  pub fn len(&self) -> usize {
    self.bindings.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.read().is_empty()
  }
}

impl Default for MemorySessionStore {
  fn default() -> Self {
    Self::new(Duration::days(7))
  }
}

impl SessionStore for MemorySessionStore {
  fn bind(&self, session: &SessionId, user_id: UserId) {
    let binding = Binding {
      user_id,
      expires_at: Utc::now() + self.ttl,
    };
    self.bindings.write().insert(session.clone(), binding);
    debug!(user_id, "Session bound.");
  }

  fn resolve(&self, session: &SessionId) -> Option<UserId> {
    let binding = *self.bindings.read().get(session)?;
    if binding.expires_at <= Utc::now() {
      self.bindings.write().remove(session);
      return None;
    }
    Some(binding.user_id)
  }

  fn invalidate(&self, session: &SessionId) {
    if let Some(binding) = self.bindings.write().remove(session) {
      debug!(user_id = binding.user_id, "Session invalidated.");
    }
  }

  fn prune_expired(&self) -> usize {
    let now = Utc::now();
    let mut bindings = self.bindings.write();
    let before = bindings.len();
    bindings.retain(|_, binding| binding.expires_at > now);
    before - bindings.len()
  }
}
