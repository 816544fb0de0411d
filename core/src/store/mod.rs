// core/src/store/mod.rs

//! Persistence collaborators.
//!
//! The services only ever talk to these traits. `MemoryStore` backs tests and the
//! in-memory server mode; the server crate provides the Postgres implementation.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{
  Category, CategoryId, NewCategory, NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderId, OrderItem,
  Product, ProductId, ProductPatch, User, UserId,
};

pub mod memory;

pub use memory::MemoryStore;

#[async_trait]
pub trait UserStore: Send + Sync {
  async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

  /// Exact, case-sensitive match.
  async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

  async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

  /// Fails with `StoreError::Duplicate` when the username or email is already taken,
  /// whatever any earlier lookup said.
  async fn insert_user(&self, new_user: NewUser) -> StoreResult<User>;

  async fn has_users(&self) -> StoreResult<bool>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
  async fn categories(&self) -> StoreResult<Vec<Category>>;

  async fn insert_category(&self, new_category: NewCategory) -> StoreResult<Category>;

  async fn products(&self) -> StoreResult<Vec<Product>>;

  async fn featured_products(&self) -> StoreResult<Vec<Product>>;

  async fn products_in_category(&self, category_id: CategoryId) -> StoreResult<Vec<Product>>;

  async fn product(&self, id: ProductId) -> StoreResult<Option<Product>>;

  /// Fails with `StoreError::UnknownCategory` when `category_id` names no category.
  async fn insert_product(&self, new_product: NewProduct) -> StoreResult<Product>;

  /// `Ok(None)` when no product has this id.
  async fn update_product(&self, id: ProductId, patch: ProductPatch) -> StoreResult<Option<Product>>;

  /// `Ok(false)` when no product has this id.
  async fn delete_product(&self, id: ProductId) -> StoreResult<bool>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Every order, newest first.
  async fn orders(&self) -> StoreResult<Vec<Order>>;

  async fn orders_for_user(&self, user_id: UserId) -> StoreResult<Vec<Order>>;

  async fn order(&self, id: OrderId) -> StoreResult<Option<Order>>;

  async fn order_items(&self, order_id: OrderId) -> StoreResult<Vec<OrderItem>>;

  /// Opens a unit of work for writing one order and its items.
  async fn begin(&self) -> StoreResult<Box<dyn OrderTx>>;
}

/// A transactional scope: nothing written through it is visible to readers until `commit`.
/// Dropping it without committing discards the writes.
#[async_trait]
pub trait OrderTx: Send {
  async fn insert_order(&mut self, new_order: NewOrder) -> StoreResult<Order>;

  async fn insert_order_item(&mut self, new_item: NewOrderItem) -> StoreResult<OrderItem>;

  async fn commit(self: Box<Self>) -> StoreResult<()>;

  async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// Everything the storefront needs from its storage engine.
pub trait Store: UserStore + CatalogStore + OrderStore {}

impl<T: UserStore + CatalogStore + OrderStore> Store for T {}
