// core/src/auth/flows.rs

//! Login and registration as named-step flows.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::password;
use super::Registration;
use crate::error::SouqError;
use crate::flow::{ContextData, Flow, StepControl};
use crate::models::{NewUser, User};
use crate::session::{SessionId, SessionStore};
use crate::store::Store;

pub(crate) struct LoginCtx {
  pub store: Arc<dyn Store>,
  pub sessions: Arc<dyn SessionStore>,
  pub username: String,
  pub password: String,
  pub user: Option<User>,
  pub session: Option<SessionId>,
}

pub(crate) struct RegisterCtx {
  pub store: Arc<dyn Store>,
  pub sessions: Arc<dyn SessionStore>,
  pub registration: Registration,
  pub user: Option<User>,
  pub session: Option<SessionId>,
}

/// Unknown username and wrong password fail identically with `InvalidCredentials`.
pub(crate) fn login_flow() -> Flow<LoginCtx, SouqError> {
  let mut flow = Flow::<LoginCtx, SouqError>::new(
    "login",
    &[("lookup_user", false), ("verify_password", false), ("bind_session", false)],
  );

  flow.on_step("lookup_user", |ctx: ContextData<LoginCtx>| async move {
    let (store, username) = {
      let guard = ctx.read();
      (guard.store.clone(), guard.username.clone())
    };

    match store.user_by_username(&username).await? {
      Some(user) => {
        ctx.write().user = Some(user);
        Ok::<_, SouqError>(StepControl::Continue)
      }
      None => {
        debug!("Login rejected: unknown username.");
        Err(SouqError::InvalidCredentials)
      }
    }
  });

  flow.on_step("verify_password", |ctx: ContextData<LoginCtx>| async move {
    let guard = ctx.read();
    let user = guard.user.as_ref().ok_or_else(|| {
      SouqError::Internal("login reached password check without a user".to_string())
    })?;
    if password::verify_password(&user.password, &guard.password)? {
      Ok::<_, SouqError>(StepControl::Continue)
    } else {
      debug!(user_id = user.id, "Login rejected: password mismatch.");
      Err(SouqError::InvalidCredentials)
    }
  });

  flow.on_step("bind_session", |ctx: ContextData<LoginCtx>| async move {
    let mut guard = ctx.write();
    let user_id = guard
      .user
      .as_ref()
      .map(|u| u.id)
      .ok_or_else(|| SouqError::Internal("login reached session binding without a user".to_string()))?;
    let session = SessionId::generate();
    guard.sessions.bind(&session, user_id);
    guard.session = Some(session);
    info!(user_id, "User logged in.");
    Ok::<_, SouqError>(StepControl::Continue)
  });

  flow
}

pub(crate) fn register_flow() -> Flow<RegisterCtx, SouqError> {
  let mut flow = Flow::<RegisterCtx, SouqError>::new(
    "register",
    &[
      ("validate_registration", false),
      ("check_username_free", false),
      ("check_email_free", false),
      ("insert_user", false),
      ("bind_session", false),
    ],
  );

  flow.on_step("validate_registration", |ctx: ContextData<RegisterCtx>| async move {
    ctx.read().registration.validate()?;
    Ok::<_, SouqError>(StepControl::Continue)
  });

  flow.on_step("check_username_free", |ctx: ContextData<RegisterCtx>| async move {
    let (store, username) = {
      let guard = ctx.read();
      (guard.store.clone(), guard.registration.username.clone())
    };
    if store.user_by_username(&username).await?.is_some() {
      warn!(%username, "Registration rejected: username taken.");
      return Err(SouqError::UsernameTaken);
    }
    Ok::<_, SouqError>(StepControl::Continue)
  });

  flow.on_step("check_email_free", |ctx: ContextData<RegisterCtx>| async move {
    let (store, email) = {
      let guard = ctx.read();
      (guard.store.clone(), guard.registration.email.clone())
    };
    if store.user_by_email(&email).await?.is_some() {
      warn!("Registration rejected: email taken.");
      return Err(SouqError::EmailTaken);
    }
    Ok::<_, SouqError>(StepControl::Continue)
  });

  // The lookups above are advisory; the store's unique constraints have the final word,
  // and a Duplicate from insert_user maps onto the same Taken errors.
  flow.on_step("insert_user", |ctx: ContextData<RegisterCtx>| async move {
    let (store, new_user) = {
      let guard = ctx.read();
      let registration = &guard.registration;
      let new_user = NewUser {
        username: registration.username.clone(),
        email: registration.email.clone(),
        password: password::hash_password(&registration.password)?,
        is_admin: false,
      };
      (guard.store.clone(), new_user)
    };
    let user = store.insert_user(new_user).await?;
    info!(user_id = user.id, username = %user.username, "User registered.");
    ctx.write().user = Some(user);
    Ok::<_, SouqError>(StepControl::Continue)
  });

  flow.on_step("bind_session", |ctx: ContextData<RegisterCtx>| async move {
    let mut guard = ctx.write();
    let user_id = guard
      .user
      .as_ref()
      .map(|u| u.id)
      .ok_or_else(|| SouqError::Internal("registration reached session binding without a user".to_string()))?;
    let session = SessionId::generate();
    guard.sessions.bind(&session, user_id);
    guard.session = Some(session);
    Ok::<_, SouqError>(StepControl::Continue)
  });

  flow
}
