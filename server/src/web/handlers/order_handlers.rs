// server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;
use souq::models::OrderId;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::{AdminUser, AuthenticatedUser};

/// Checkout body. `items` stays untyped here: the cart is shape-checked line by line by
/// order placement, which reports the first bad line.
#[derive(Deserialize)]
pub struct PlaceOrderRequestPayload {
  #[serde(default)]
  pub items: Value,
}

#[instrument(name = "handler::all_orders", skip_all, fields(admin_id = admin.0.id))]
pub async fn all_orders_handler(admin: AdminUser, app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let orders = app_state.ledger.all_orders().await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::my_orders", skip_all, fields(user_id = auth_user.0.id))]
pub async fn my_orders_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.ledger.orders_for(&auth_user.0).await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::get_order", skip_all, fields(user_id = auth_user.0.id, order_id = *path.as_ref()))]
pub async fn get_order_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<OrderId>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.ledger.order_with_items(&auth_user.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::place_order", skip_all, fields(user_id = auth_user.0.id))]
pub async fn place_order_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  req_payload: web::Json<PlaceOrderRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.checkout.place_order(&auth_user.0, &req_payload.items).await?;
  info!(order_id = order.id, total_amount = order.total_amount, "Checkout completed.");
  Ok(HttpResponse::Created().json(order))
}
