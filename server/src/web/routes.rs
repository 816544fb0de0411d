// server/src/web/routes.rs

use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::web::handlers::{auth_handlers, category_handlers, order_handlers, product_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Malformed bodies and unparsable path ids answer with the same `{message}` shape as
/// every other failure.
fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
  web::PathConfig::default()
    .error_handler(|_err, _req| AppError::Domain(souq::SouqError::NotFound("Resource".to_string())).into())
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .app_data(json_config())
      .app_data(path_config())
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/auth")
          .route("/login", web::post().to(auth_handlers::login_handler))
          .route("/register", web::post().to(auth_handlers::register_handler))
          .route("/logout", web::post().to(auth_handlers::logout_handler))
          .route("/user", web::get().to(auth_handlers::current_user_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          // Registered ahead of "/{id}" so "featured" is never parsed as an id.
          .route("/featured", web::get().to(product_handlers::featured_products_handler))
          .route("/{id}", web::get().to(product_handlers::get_product_handler))
          .route("/{id}", web::put().to(product_handlers::update_product_handler))
          .route("/{id}", web::delete().to(product_handlers::delete_product_handler)),
      )
      .service(
        web::scope("/categories")
          .route("", web::get().to(category_handlers::list_categories_handler))
          .route("/{id}/products", web::get().to(category_handlers::category_products_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::all_orders_handler))
          .route("", web::post().to(order_handlers::place_order_handler))
          .route("/{id}", web::get().to(order_handlers::get_order_handler)),
      )
      .route("/user/orders", web::get().to(order_handlers::my_orders_handler)),
  );
}
