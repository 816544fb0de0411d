// server/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use souq::models::{NewProduct, ProductId, ProductPatch};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AdminUser;

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = app_state.catalog.products().await?;
  info!(count = products.len(), "Products fetched.");
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::featured_products", skip(app_state))]
pub async fn featured_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = app_state.catalog.featured_products().await?;
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = *path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<ProductId>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.catalog.product(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::create_product", skip_all, fields(admin_id = admin.0.id))]
pub async fn create_product_handler(
  admin: AdminUser,
  app_state: web::Data<AppState>,
  req_payload: web::Json<NewProduct>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.catalog.create_product(req_payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(product))
}

#[instrument(name = "handler::update_product", skip_all, fields(admin_id = admin.0.id, product_id = *path.as_ref()))]
pub async fn update_product_handler(
  admin: AdminUser,
  app_state: web::Data<AppState>,
  path: web::Path<ProductId>,
  req_payload: web::Json<ProductPatch>,
) -> Result<HttpResponse, AppError> {
  let product = app_state
    .catalog
    .update_product(path.into_inner(), req_payload.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::delete_product", skip_all, fields(admin_id = admin.0.id, product_id = *path.as_ref()))]
pub async fn delete_product_handler(
  admin: AdminUser,
  app_state: web::Data<AppState>,
  path: web::Path<ProductId>,
) -> Result<HttpResponse, AppError> {
  app_state.catalog.delete_product(path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}
