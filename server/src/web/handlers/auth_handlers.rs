// server/src/web/handlers/auth_handlers.rs

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use souq::{AuthGate, Registration, Session};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::{CurrentCaller, SESSION_COOKIE};

#[derive(Deserialize)]
pub struct LoginRequestPayload {
  pub username: String,
  pub password: String,
}

fn session_cookie(app_state: &AppState, session: &Session) -> Cookie<'static> {
  Cookie::build(SESSION_COOKIE, session.id.as_str().to_owned())
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .secure(app_state.config.cookie_secure)
    .max_age(CookieDuration::hours(app_state.config.session_ttl_hours))
    .finish()
}

fn cleared_session_cookie() -> Cookie<'static> {
  let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").http_only(true).finish();
  cookie.make_removal();
  cookie
}

#[instrument(name = "handler::login", skip_all, fields(username = %req_payload.username))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  current: CurrentCaller,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let LoginRequestPayload { username, password } = req_payload.into_inner();
  let session = app_state.auth.login(&username, &password).await?;

  // A fresh login replaces whatever session the browser was holding.
  if let Some(previous) = &current.session {
    app_state.auth.logout(previous);
  }

  info!(user_id = session.identity.id, "Login successful.");
  Ok(
    HttpResponse::Ok()
      .cookie(session_cookie(&app_state, &session))
      .json(&session.identity),
  )
}

#[instrument(name = "handler::register", skip_all, fields(username = %req_payload.username))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  current: CurrentCaller,
  req_payload: web::Json<Registration>,
) -> Result<HttpResponse, AppError> {
  let session = app_state.auth.register(req_payload.into_inner()).await?;
  if let Some(previous) = &current.session {
    app_state.auth.logout(previous);
  }

  info!(user_id = session.identity.id, "Registration successful; session established.");
  Ok(
    HttpResponse::Created()
      .cookie(session_cookie(&app_state, &session))
      .json(&session.identity),
  )
}

/// Always succeeds, with or without a live session.
#[instrument(name = "handler::logout", skip_all)]
pub async fn logout_handler(app_state: web::Data<AppState>, current: CurrentCaller) -> HttpResponse {
  if let Some(session) = &current.session {
    app_state.auth.logout(session);
  }
  HttpResponse::Ok()
    .cookie(cleared_session_cookie())
    .json(json!({ "message": "Logged out successfully" }))
}

#[instrument(name = "handler::current_user", skip_all)]
pub async fn current_user_handler(current: CurrentCaller) -> Result<HttpResponse, AppError> {
  let identity = AuthGate::require_authenticated(&current.caller)
    .map_err(|_| AppError::NotAuthenticated("Not authenticated"))?;
  Ok(HttpResponse::Ok().json(identity))
}
