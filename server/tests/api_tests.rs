// tests/api_tests.rs
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use serial_test::serial;
use souq::{MemorySessionStore, MemoryStore, PricingPolicy};
use souq_server::web::configure_app_routes;
use souq_server::web::extractors::SESSION_COOKIE;
use souq_server::{seed, AppConfig, AppState};
use std::sync::Arc;

async fn seeded_state(pricing_policy: PricingPolicy) -> AppState {
  let config = Arc::new(AppConfig {
    pricing_policy,
    ..AppConfig::default()
  });
  let sessions = Arc::new(MemorySessionStore::new(config.session_ttl()));
  let state = AppState::new(Arc::new(MemoryStore::new()), sessions, config);
  assert!(seed::seed_if_empty(&state).await.unwrap());
  state
}

fn session_cookie<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
  resp
    .response()
    .cookies()
    .find(|c| c.name() == SESSION_COOKIE)
    .expect("response sets the session cookie")
    .into_owned()
}

macro_rules! app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

macro_rules! login {
  ($app:expr, $username:expr, $password:expr) => {{
    let req = test::TestRequest::post()
      .uri("/api/auth/login")
      .set_json(json!({ "username": $username, "password": $password }))
      .to_request();
    let resp = test::call_service(&$app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    session_cookie(&resp)
  }};
}

fn cart(lines: &[(i32, f64)]) -> Value {
  let items: Vec<Value> = lines
    .iter()
    .map(|(product_id, price)| json!({ "productId": product_id, "title": "t", "price": price, "imageUrl": "u" }))
    .collect();
  json!({ "items": items })
}

#[actix_web::test]
#[serial]
async fn health_check() {
  let state = seeded_state(PricingPolicy::Submitted).await;
  let app = app!(state);
  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({ "status": "ok" }));
}

#[actix_web::test]
#[serial]
async fn register_then_checkout_two_items() {
  let state = seeded_state(PricingPolicy::Submitted).await;
  let app = app!(state);

  let req = test::TestRequest::post()
    .uri("/api/auth/register")
    .set_json(json!({ "username": "alice", "email": "alice@x.com", "password": "secret1" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let cookie = session_cookie(&resp);
  assert_eq!(cookie.http_only(), Some(true));
  let alice: Value = test::read_body_json(resp).await;
  assert_eq!(alice["username"], "alice");
  assert_eq!(alice["isAdmin"], false);
  assert!(alice.get("password").is_none());

  let req = test::TestRequest::get().uri("/api/auth/user").cookie(cookie.clone()).to_request();
  let me: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(me, alice);

  let req = test::TestRequest::post()
    .uri("/api/orders")
    .cookie(cookie.clone())
    .set_json(cart(&[(1, 10.0), (2, 5.0)]))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let order: Value = test::read_body_json(resp).await;
  assert_eq!(order["userId"], alice["id"]);
  assert_eq!(order["totalAmount"], json!(15.0));
  assert_eq!(order["status"], "completed");
  assert!(order.get("items").is_none());

  let req = test::TestRequest::get()
    .uri(&format!("/api/orders/{}", order["id"]))
    .cookie(cookie.clone())
    .to_request();
  let detail: Value = test::call_and_read_body_json(&app, req).await;
  let prices: Vec<f64> = detail["items"]
    .as_array()
    .unwrap()
    .iter()
    .map(|item| item["price"].as_f64().unwrap())
    .collect();
  assert_eq!(prices, vec![10.0, 5.0]);

  let req = test::TestRequest::get().uri("/api/user/orders").cookie(cookie).to_request();
  let mine: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[actix_web::test]
#[serial]
async fn order_listing_is_admin_only() {
  let state = seeded_state(PricingPolicy::Submitted).await;
  let app = app!(state);

  let user = login!(app, "user", "user123");
  let req = test::TestRequest::post()
    .uri("/api/orders")
    .cookie(user.clone())
    .set_json(cart(&[(3, 19.99)]))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

  let anonymous = test::TestRequest::get().uri("/api/orders").to_request();
  let resp = test::call_service(&app, anonymous).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body, json!({ "message": "Forbidden" }));

  let as_user = test::TestRequest::get().uri("/api/orders").cookie(user).to_request();
  assert_eq!(test::call_service(&app, as_user).await.status(), StatusCode::FORBIDDEN);

  let admin = login!(app, "admin", "admin123");
  let as_admin = test::TestRequest::get().uri("/api/orders").cookie(admin).to_request();
  let resp = test::call_service(&app, as_admin).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let orders: Value = test::read_body_json(resp).await;
  assert_eq!(orders.as_array().unwrap().len(), 1);
}

#[actix_web::test]
#[serial]
async fn checkout_requires_a_session_and_a_valid_cart() {
  let state = seeded_state(PricingPolicy::Submitted).await;
  let app = app!(state);

  let anonymous = test::TestRequest::post()
    .uri("/api/orders")
    .set_json(cart(&[(1, 10.0)]))
    .to_request();
  assert_eq!(test::call_service(&app, anonymous).await.status(), StatusCode::UNAUTHORIZED);

  let user = login!(app, "user", "user123");
  for (body, message) in [
    (json!({ "items": [] }), "Cart is empty"),
    (json!({}), "Cart is empty"),
    (json!({ "items": "nope" }), "Cart is empty"),
  ] {
    let req = test::TestRequest::post()
      .uri("/api/orders")
      .cookie(user.clone())
      .set_json(body)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], message);
  }

  let req = test::TestRequest::post()
    .uri("/api/orders")
    .cookie(user.clone())
    .set_json(json!({ "items": [{ "productId": 1, "title": "t", "price": "ten", "imageUrl": "u" }] }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::get().uri("/api/user/orders").cookie(user).to_request();
  let mine: Value = test::call_and_read_body_json(&app, req).await;
  assert!(mine.as_array().unwrap().is_empty());
}

#[actix_web::test]
#[serial]
async fn bad_credentials_are_indistinguishable() {
  let state = seeded_state(PricingPolicy::Submitted).await;
  let app = app!(state);

  let mut bodies = Vec::new();
  for (username, password) in [("user", "wrong"), ("ghost", "user123")] {
    let req = test::TestRequest::post()
      .uri("/api/auth/login")
      .set_json(json!({ "username": username, "password": password }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.response().cookies().all(|c| c.name() != SESSION_COOKIE));
    let body: Value = test::read_body_json(resp).await;
    bodies.push(body);
  }
  assert_eq!(bodies[0], bodies[1]);
}

#[actix_web::test]
#[serial]
async fn duplicate_registrations_are_rejected() {
  let state = seeded_state(PricingPolicy::Submitted).await;
  let app = app!(state);

  for (body, message) in [
    (
      json!({ "username": "user", "email": "fresh@x.com", "password": "secret1" }),
      "Username already exists",
    ),
    (
      json!({ "username": "fresh", "email": "user@example.com", "password": "secret1" }),
      "Email already exists",
    ),
  ] {
    let req = test::TestRequest::post().uri("/api/auth/register").set_json(body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], message);
  }
}

#[actix_web::test]
#[serial]
async fn logout_ends_the_session_and_is_idempotent() {
  let state = seeded_state(PricingPolicy::Submitted).await;
  let app = app!(state);
  let user = login!(app, "user", "user123");

  for _ in 0..2 {
    let req = test::TestRequest::post().uri("/api/auth/logout").cookie(user.clone()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Logged out successfully");
  }

  let req = test::TestRequest::get().uri("/api/auth/user").cookie(user).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Not authenticated");

  let req = test::TestRequest::post().uri("/api/auth/logout").to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
#[serial]
async fn public_catalog_routes() {
  let state = seeded_state(PricingPolicy::Submitted).await;
  let app = app!(state);

  let req = test::TestRequest::get().uri("/api/products").to_request();
  let products: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(products.as_array().unwrap().len(), 6);
  assert!(products[0].get("imageUrl").is_some());

  let req = test::TestRequest::get().uri("/api/products/featured").to_request();
  let featured: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(featured.as_array().unwrap().len(), 3);

  let req = test::TestRequest::get().uri("/api/products/6").to_request();
  let discounted: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(discounted["discountPrice"], json!(19.99));

  for uri in ["/api/products/999", "/api/products/abc"] {
    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
  }

  let req = test::TestRequest::get().uri("/api/categories").to_request();
  let categories: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(categories.as_array().unwrap().len(), 4);
  let ebooks = categories
    .as_array()
    .unwrap()
    .iter()
    .find(|c| c["slug"] == "ebooks")
    .unwrap()["id"]
    .clone();

  let req = test::TestRequest::get()
    .uri(&format!("/api/categories/{}/products", ebooks))
    .to_request();
  let in_ebooks: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(in_ebooks.as_array().unwrap().len(), 4);
}

#[actix_web::test]
#[serial]
async fn product_admin_is_gated_and_works_for_admins() {
  let state = seeded_state(PricingPolicy::Submitted).await;
  let app = app!(state);
  let new_product = json!({
    "title": "Rust course",
    "description": "d",
    "price": 39.0,
    "imageUrl": "i",
    "fileUrl": "f",
  });

  let anonymous = test::TestRequest::post().uri("/api/products").set_json(&new_product).to_request();
  assert_eq!(test::call_service(&app, anonymous).await.status(), StatusCode::FORBIDDEN);

  let user = login!(app, "user", "user123");
  let as_user = test::TestRequest::post()
    .uri("/api/products")
    .cookie(user)
    .set_json(&new_product)
    .to_request();
  assert_eq!(test::call_service(&app, as_user).await.status(), StatusCode::FORBIDDEN);

  let admin = login!(app, "admin", "admin123");
  let req = test::TestRequest::post()
    .uri("/api/products")
    .cookie(admin.clone())
    .set_json(&new_product)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created: Value = test::read_body_json(resp).await;
  assert_eq!(created["active"], true);
  let uri = format!("/api/products/{}", created["id"]);

  let req = test::TestRequest::put()
    .uri(&uri)
    .cookie(admin.clone())
    .set_json(json!({ "price": 29.0, "featured": true }))
    .to_request();
  let updated: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(updated["price"], json!(29.0));
  assert_eq!(updated["featured"], true);
  assert_eq!(updated["title"], "Rust course");

  let req = test::TestRequest::put()
    .uri(&uri)
    .cookie(admin.clone())
    .set_json(json!({ "price": -1 }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::post()
    .uri("/api/products")
    .cookie(admin.clone())
    .set_json(json!({ "title": "Orphan", "description": "d", "price": 5.0, "imageUrl": "i", "fileUrl": "f", "categoryId": 999 }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "Category does not exist");

  let req = test::TestRequest::put()
    .uri(&uri)
    .cookie(admin.clone())
    .set_json(json!({ "categoryId": 999 }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::delete().uri(&uri).cookie(admin.clone()).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
  let req = test::TestRequest::delete().uri(&uri).cookie(admin).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
#[serial]
async fn order_detail_is_owner_or_admin_only() {
  let state = seeded_state(PricingPolicy::Submitted).await;
  let app = app!(state);

  let user = login!(app, "user", "user123");
  let req = test::TestRequest::post()
    .uri("/api/orders")
    .cookie(user.clone())
    .set_json(cart(&[(1, 29.99)]))
    .to_request();
  let order: Value = test::call_and_read_body_json(&app, req).await;
  let uri = format!("/api/orders/{}", order["id"]);

  let req = test::TestRequest::post()
    .uri("/api/auth/register")
    .set_json(json!({ "username": "mallory", "email": "m@x.com", "password": "secret1" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  let mallory = session_cookie(&resp);

  let req = test::TestRequest::get().uri(&uri).cookie(mallory.clone()).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

  let req = test::TestRequest::get().uri("/api/orders/9999").cookie(mallory).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

  let req = test::TestRequest::get().uri(&uri).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

  let admin = login!(app, "admin", "admin123");
  let req = test::TestRequest::get().uri(&uri).cookie(admin).to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
#[serial]
async fn malformed_json_gets_a_message() {
  let state = seeded_state(PricingPolicy::Submitted).await;
  let app = app!(state);
  let req = test::TestRequest::post()
    .uri("/api/auth/login")
    .insert_header(("content-type", "application/json"))
    .set_payload("{ not json")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert!(body["message"].is_string());
}

#[actix_web::test]
#[serial]
async fn catalog_pricing_ignores_submitted_prices() {
  let state = seeded_state(PricingPolicy::Catalog).await;
  let app = app!(state);
  let user = login!(app, "user", "user123");

  // Product 1 lists at 29.99; product 6 at 24.99 discounted to 19.99.
  let req = test::TestRequest::post()
    .uri("/api/orders")
    .cookie(user)
    .set_json(cart(&[(1, 0.01), (6, 0.01)]))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let order: Value = test::read_body_json(resp).await;
  let total = order["totalAmount"].as_f64().unwrap();
  assert!((total - (29.99 + 19.99)).abs() < 1e-9, "charged {}", total);
}
