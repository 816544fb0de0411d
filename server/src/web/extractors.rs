// server/src/web/extractors.rs

//! Request guards. Each handler names the access tier it needs by taking one of these:
//! [`CurrentCaller`] (public), [`AuthenticatedUser`] (401 when anonymous) or [`AdminUser`]
//! (403 unless the caller is an admin, anonymous included).

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use souq::models::Identity;
use souq::{AuthGate, Caller, SessionId};

use crate::errors::AppError;
use crate::state::AppState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "souq.sid";

/// The resolved caller, plus the session token the request carried (if any).
#[derive(Debug, Clone)]
pub struct CurrentCaller {
  pub caller: Caller,
  pub session: Option<SessionId>,
}

impl FromRequest for CurrentCaller {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let session = req.cookie(SESSION_COOKIE).map(|cookie| SessionId::from(cookie.value()));

    Box::pin(async move {
      let state = state.ok_or_else(|| AppError::Internal("Application state is not configured".to_string()))?;
      let caller = state.auth.caller(session.as_ref()).await?;
      Ok(CurrentCaller { caller, session })
    })
  }
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
    let current = CurrentCaller::from_request(req, payload);
    Box::pin(async move {
      let current = current.await?;
      let identity = AuthGate::require_authenticated(&current.caller)?;
      Ok(AuthenticatedUser(identity.clone()))
    })
  }
}

#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
    let current = CurrentCaller::from_request(req, payload);
    Box::pin(async move {
      let current = current.await?;
      let identity = AuthGate::require_admin(&current.caller)?;
      Ok(AdminUser(identity.clone()))
    })
  }
}
