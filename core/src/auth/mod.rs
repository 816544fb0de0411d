// core/src/auth/mod.rs

//! AuthGate: who is calling, and may they do this?
//!
//! Three access tiers exist: public (no identity needed), authenticated (any identity) and
//! admin (identity with the admin flag). Request handling resolves a [`Caller`] once, then
//! applies `require_authenticated` or `require_admin` before touching any core operation.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::error::{FlowError, SouqError, SouqResult};
use crate::flow::{ContextData, Flow, FlowOutcome};
use crate::models::Identity;
use crate::session::{SessionId, SessionStore};
use crate::store::Store;

mod flows;
pub mod password;

use flows::{LoginCtx, RegisterCtx};

/// The identity decision for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
  identity: Option<Identity>,
}

impl Caller {
  pub fn anonymous() -> Self {
    Caller { identity: None }
  }

  pub fn authenticated(identity: Identity) -> Self {
    Caller {
      identity: Some(identity),
    }
  }

  pub fn identity(&self) -> Option<&Identity> {
    self.identity.as_ref()
  }

  pub fn require_authenticated(&self) -> SouqResult<&Identity> {
    self.identity.as_ref().ok_or(SouqError::Unauthorized)
  }

  /// Anonymous callers get `Forbidden` here too, not `Unauthorized`: admin routes
  /// answer 403 whether or not anyone is logged in.
  pub fn require_admin(&self) -> SouqResult<&Identity> {
    match &self.identity {
      Some(identity) if identity.is_admin => Ok(identity),
      _ => Err(SouqError::Forbidden),
    }
  }
}

/// A freshly established session and the identity it is bound to.
#[derive(Debug, Clone)]
pub struct Session {
  pub id: SessionId,
  pub identity: Identity,
}

/// Sign-up payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
  pub username: String,
  pub email: String,
  pub password: String,
}

const MIN_USERNAME_CHARS: usize = 3;
const MIN_PASSWORD_CHARS: usize = 6;

impl Registration {
  pub fn validate(&self) -> SouqResult<()> {
    if self.username.trim().chars().count() < MIN_USERNAME_CHARS {
      return Err(SouqError::Validation(format!(
        "Username must be at least {} characters",
        MIN_USERNAME_CHARS
      )));
    }
    if !looks_like_email(&self.email) {
      return Err(SouqError::Validation("Invalid email address".to_string()));
    }
    if self.password.chars().count() < MIN_PASSWORD_CHARS {
      return Err(SouqError::Validation(format!(
        "Password must be at least {} characters",
        MIN_PASSWORD_CHARS
      )));
    }
    Ok(())
  }
}

fn looks_like_email(email: &str) -> bool {
  if email.chars().any(char::is_whitespace) {
    return false;
  }
  match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty() && !domain.contains('@') && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    }
    None => false,
  }
}

pub struct AuthGate {
  store: Arc<dyn Store>,
  sessions: Arc<dyn SessionStore>,
  login_flow: Flow<LoginCtx, SouqError>,
  register_flow: Flow<RegisterCtx, SouqError>,
}

impl AuthGate {
  pub fn new(store: Arc<dyn Store>, sessions: Arc<dyn SessionStore>) -> Self {
    Self {
      store,
      sessions,
      login_flow: flows::login_flow(),
      register_flow: flows::register_flow(),
    }
  }

  /// Resolves the session token carried by a request into a [`Caller`]: at most one
  /// session lookup and one identity read. A binding whose user has disappeared is dropped.
  #[instrument(name = "AuthGate::caller", skip_all)]
  pub async fn caller(&self, session: Option<&SessionId>) -> SouqResult<Caller> {
    let Some(session) = session else {
      return Ok(Caller::anonymous());
    };
    let Some(user_id) = self.sessions.resolve(session) else {
      debug!("Session token unknown or expired.");
      return Ok(Caller::anonymous());
    };
    match self.store.user_by_id(user_id).await? {
      Some(user) => Ok(Caller::authenticated(user.into())),
      None => {
        warn!(user_id, "Session bound to a missing user; invalidating.");
        self.sessions.invalidate(session);
        Ok(Caller::anonymous())
      }
    }
  }

  pub fn require_authenticated(caller: &Caller) -> SouqResult<&Identity> {
    caller.require_authenticated()
  }

  pub fn require_admin(caller: &Caller) -> SouqResult<&Identity> {
    caller.require_admin()
  }

  #[instrument(name = "AuthGate::login", skip_all, fields(username = %username))]
  pub async fn login(&self, username: &str, password: &str) -> SouqResult<Session> {
    let ctx = ContextData::new(LoginCtx {
      store: self.store.clone(),
      sessions: self.sessions.clone(),
      username: username.to_string(),
      password: password.to_string(),
      user: None,
      session: None,
    });
    let outcome = self.login_flow.run(ctx.clone()).await?;
    let guard = ctx.read();
    match (outcome, &guard.user, &guard.session) {
      (FlowOutcome::Completed, Some(user), Some(session)) => Ok(Session {
        id: session.clone(),
        identity: user.into(),
      }),
      _ => Err(
        FlowError::Incomplete {
          flow: self.login_flow.name().to_string(),
          step_name: "bind_session".to_string(),
        }
        .into(),
      ),
    }
  }

  /// Creates a non-admin account and logs it in straight away.
  #[instrument(name = "AuthGate::register", skip_all, fields(username = %registration.username))]
  pub async fn register(&self, registration: Registration) -> SouqResult<Session> {
    let ctx = ContextData::new(RegisterCtx {
      store: self.store.clone(),
      sessions: self.sessions.clone(),
      registration,
      user: None,
      session: None,
    });
    let outcome = self.register_flow.run(ctx.clone()).await?;
    let guard = ctx.read();
    match (outcome, &guard.user, &guard.session) {
      (FlowOutcome::Completed, Some(user), Some(session)) => Ok(Session {
        id: session.clone(),
        identity: user.into(),
      }),
      _ => Err(
        FlowError::Incomplete {
          flow: self.register_flow.name().to_string(),
          step_name: "bind_session".to_string(),
        }
        .into(),
      ),
    }
  }

  /// Idempotent: logging out an unknown or already-ended session is fine.
  pub fn logout(&self, session: &SessionId) {
    self.sessions.invalidate(session);
  }
}
