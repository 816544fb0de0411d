// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every fixture

use anyhow::anyhow;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use souq::auth::password::hash_password;
use souq::models::{
  Category, CategoryId, Identity, NewCategory, NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderId, OrderItem,
  Product, ProductId, ProductPatch, User, UserId,
};
use souq::store::{CatalogStore, OrderStore, OrderTx, UserStore};
use souq::{AuthGate, MemorySessionStore, MemoryStore, StoreError, StoreResult};
use std::sync::Arc;
use tracing::Level;

// --- Helper for Tracing Setup ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Fixtures ---

/// A store holding one category, three products (ids 1..=3; product 3 is inactive and
/// product 2 discounted), an admin and a regular user.
pub async fn seeded_store() -> MemoryStore {
  let store = MemoryStore::new();
  let ebooks = store
    .insert_category(NewCategory {
      name: "Ebooks".to_string(),
      slug: "ebooks".to_string(),
    })
    .await
    .expect("seed category");

  for (title, price, discount, active) in [
    ("A", 10.0, None, true),
    ("B", 8.0, Some(5.0), true),
    ("Retired", 3.0, None, false),
  ] {
    store
      .insert_product(NewProduct {
        title: title.to_string(),
        description: format!("{} description", title),
        price,
        image_url: "u".to_string(),
        file_url: "f".to_string(),
        category_id: Some(ebooks.id),
        featured: title == "A",
        popular: false,
        discount_price: discount,
        active,
      })
      .await
      .expect("seed product");
  }

  insert_user(&store, "admin", "admin@x.com", "admin123", true).await;
  insert_user(&store, "user", "user@x.com", "user123", false).await;
  store
}

pub async fn insert_user(store: &MemoryStore, username: &str, email: &str, password: &str, is_admin: bool) -> User {
  store
    .insert_user(NewUser {
      username: username.to_string(),
      email: email.to_string(),
      password: hash_password(password).expect("hash"),
      is_admin,
    })
    .await
    .expect("seed user")
}

pub async fn identity_of(store: &MemoryStore, username: &str) -> Identity {
  store
    .user_by_username(username)
    .await
    .expect("lookup")
    .expect("user exists")
    .into()
}

pub fn auth_gate(store: &MemoryStore) -> (AuthGate, Arc<MemorySessionStore>) {
  let sessions = Arc::new(MemorySessionStore::default());
  let gate = AuthGate::new(Arc::new(store.clone()), sessions.clone());
  (gate, sessions)
}

pub fn line(product_id: i32, title: &str, price: f64) -> Value {
  json!({ "productId": product_id, "title": title, "price": price, "imageUrl": "u" })
}

// --- A store that misbehaves on purpose ---

/// Delegates to a `MemoryStore` but fails the `fail_at`-th order item insert (0-based)
/// of every unit of work. With `stale_lookups`, username and email lookups always come
/// back empty, so uniqueness is only enforced by `insert_user`.
#[derive(Clone)]
pub struct FlakyStore {
  pub inner: MemoryStore,
  pub fail_at: usize,
  pub stale_lookups: bool,
}

struct FlakyTx {
  inner: Box<dyn OrderTx>,
  fail_at: usize,
  written: usize,
}

#[async_trait]
impl OrderTx for FlakyTx {
  async fn insert_order(&mut self, new_order: NewOrder) -> StoreResult<Order> {
    self.inner.insert_order(new_order).await
  }

  async fn insert_order_item(&mut self, new_item: NewOrderItem) -> StoreResult<OrderItem> {
    if self.written == self.fail_at {
      return Err(StoreError::Backend(anyhow!("connection reset while writing order item")));
    }
    self.written += 1;
    self.inner.insert_order_item(new_item).await
  }

  async fn commit(self: Box<Self>) -> StoreResult<()> {
    self.inner.commit().await
  }

  async fn rollback(self: Box<Self>) -> StoreResult<()> {
    self.inner.rollback().await
  }
}

#[async_trait]
impl UserStore for FlakyStore {
  async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
    self.inner.user_by_id(id).await
  }

  async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
    if self.stale_lookups {
      return Ok(None);
    }
    self.inner.user_by_username(username).await
  }

  async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    if self.stale_lookups {
      return Ok(None);
    }
    self.inner.user_by_email(email).await
  }

  async fn insert_user(&self, new_user: NewUser) -> StoreResult<User> {
    self.inner.insert_user(new_user).await
  }

  async fn has_users(&self) -> StoreResult<bool> {
    self.inner.has_users().await
  }
}

#[async_trait]
impl CatalogStore for FlakyStore {
  async fn categories(&self) -> StoreResult<Vec<Category>> {
    self.inner.categories().await
  }

  async fn insert_category(&self, new_category: NewCategory) -> StoreResult<Category> {
    self.inner.insert_category(new_category).await
  }

  async fn products(&self) -> StoreResult<Vec<Product>> {
    self.inner.products().await
  }

  async fn featured_products(&self) -> StoreResult<Vec<Product>> {
    self.inner.featured_products().await
  }

  async fn products_in_category(&self, category_id: CategoryId) -> StoreResult<Vec<Product>> {
    self.inner.products_in_category(category_id).await
  }

  async fn product(&self, id: ProductId) -> StoreResult<Option<Product>> {
    self.inner.product(id).await
  }

  async fn insert_product(&self, new_product: NewProduct) -> StoreResult<Product> {
    self.inner.insert_product(new_product).await
  }

  async fn update_product(&self, id: ProductId, patch: ProductPatch) -> StoreResult<Option<Product>> {
    self.inner.update_product(id, patch).await
  }

  async fn delete_product(&self, id: ProductId) -> StoreResult<bool> {
    self.inner.delete_product(id).await
  }
}

#[async_trait]
impl OrderStore for FlakyStore {
  async fn orders(&self) -> StoreResult<Vec<Order>> {
    self.inner.orders().await
  }

  async fn orders_for_user(&self, user_id: UserId) -> StoreResult<Vec<Order>> {
    self.inner.orders_for_user(user_id).await
  }

  async fn order(&self, id: OrderId) -> StoreResult<Option<Order>> {
    self.inner.order(id).await
  }

  async fn order_items(&self, order_id: OrderId) -> StoreResult<Vec<OrderItem>> {
    self.inner.order_items(order_id).await
  }

  async fn begin(&self) -> StoreResult<Box<dyn OrderTx>> {
    Ok(Box::new(FlakyTx {
      inner: self.inner.begin().await?,
      fail_at: self.fail_at,
      written: 0,
    }))
  }
}
