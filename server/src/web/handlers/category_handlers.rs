// server/src/web/handlers/category_handlers.rs

use actix_web::{web, HttpResponse};
use souq::models::CategoryId;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::list_categories", skip(app_state))]
pub async fn list_categories_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let categories = app_state.catalog.categories().await?;
  Ok(HttpResponse::Ok().json(categories))
}

#[instrument(name = "handler::category_products", skip(app_state, path), fields(category_id = *path.as_ref()))]
pub async fn category_products_handler(
  app_state: web::Data<AppState>,
  path: web::Path<CategoryId>,
) -> Result<HttpResponse, AppError> {
  let products = app_state.catalog.products_in_category(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(products))
}
