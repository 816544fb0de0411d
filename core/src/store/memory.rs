// core/src/store/memory.rs

//! In-process storage with the same observable rules as the relational schema:
//! serial ids, unique username/email/slug, foreign keys from orders to users and from
//! order items to orders and products, and invisible-until-commit order writes.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{CatalogStore, OrderStore, OrderTx, UserStore};
use crate::error::{StoreError, StoreResult, UniqueField};
use crate::models::{
  Category, CategoryId, NewCategory, NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderId, OrderItem,
  Product, ProductId, ProductPatch, User, UserId,
};

#[derive(Debug, Default)]
struct Tables {
  users: Vec<User>,
  categories: Vec<Category>,
  products: Vec<Product>,
  orders: Vec<Order>,
  order_items: Vec<OrderItem>,
  user_seq: i32,
  category_seq: i32,
  product_seq: i32,
  order_seq: i32,
  order_item_seq: i32,
}

fn next_id(seq: &mut i32) -> i32 {
  *seq += 1;
  *seq
}

/// Cloning a `MemoryStore` yields another handle onto the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of committed orders and order items; handy for asserting that nothing leaked.
  pub fn row_counts(&self) -> (usize, usize) {
    let tables = self.tables.read();
    (tables.orders.len(), tables.order_items.len())
  }
}

#[async_trait]
impl UserStore for MemoryStore {
  async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
    Ok(self.tables.read().users.iter().find(|u| u.id == id).cloned())
  }

  async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
    Ok(self.tables.read().users.iter().find(|u| u.username == username).cloned())
  }

  async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    Ok(self.tables.read().users.iter().find(|u| u.email == email).cloned())
  }

  #[instrument(name = "MemoryStore::insert_user", skip_all, fields(username = %new_user.username))]
  async fn insert_user(&self, new_user: NewUser) -> StoreResult<User> {
    let mut tables = self.tables.write();
    if tables.users.iter().any(|u| u.username == new_user.username) {
      return Err(StoreError::Duplicate(UniqueField::Username));
    }
    if tables.users.iter().any(|u| u.email == new_user.email) {
      return Err(StoreError::Duplicate(UniqueField::Email));
    }
    let user = User {
      id: next_id(&mut tables.user_seq),
      username: new_user.username,
      email: new_user.email,
      password: new_user.password,
      is_admin: new_user.is_admin,
      created_at: Utc::now(),
    };
    tables.users.push(user.clone());
    debug!(user_id = user.id, "User row inserted.");
    Ok(user)
  }

  async fn has_users(&self) -> StoreResult<bool> {
    Ok(!self.tables.read().users.is_empty())
  }
}

#[async_trait]
impl CatalogStore for MemoryStore {
  async fn categories(&self) -> StoreResult<Vec<Category>> {
    Ok(self.tables.read().categories.clone())
  }

  async fn insert_category(&self, new_category: NewCategory) -> StoreResult<Category> {
    let mut tables = self.tables.write();
    if tables.categories.iter().any(|c| c.slug == new_category.slug) {
      return Err(StoreError::Duplicate(UniqueField::CategorySlug));
    }
    let category = Category {
      id: next_id(&mut tables.category_seq),
      name: new_category.name,
      slug: new_category.slug,
    };
    tables.categories.push(category.clone());
    Ok(category)
  }

  async fn products(&self) -> StoreResult<Vec<Product>> {
    Ok(self.tables.read().products.clone())
  }

  async fn featured_products(&self) -> StoreResult<Vec<Product>> {
    Ok(self.tables.read().products.iter().filter(|p| p.featured).cloned().collect())
  }

  async fn products_in_category(&self, category_id: CategoryId) -> StoreResult<Vec<Product>> {
    Ok(
      self
        .tables
        .read()
        .products
        .iter()
        .filter(|p| p.category_id == Some(category_id))
        .cloned()
        .collect(),
    )
  }

  async fn product(&self, id: ProductId) -> StoreResult<Option<Product>> {
    Ok(self.tables.read().products.iter().find(|p| p.id == id).cloned())
  }

  async fn insert_product(&self, new_product: NewProduct) -> StoreResult<Product> {
    let mut tables = self.tables.write();
    if let Some(category_id) = new_product.category_id {
      if !tables.categories.iter().any(|c| c.id == category_id) {
        return Err(StoreError::UnknownCategory);
      }
    }
    let product = Product {
      id: next_id(&mut tables.product_seq),
      title: new_product.title,
      description: new_product.description,
      price: new_product.price,
      image_url: new_product.image_url,
      file_url: new_product.file_url,
      category_id: new_product.category_id,
      featured: new_product.featured,
      popular: new_product.popular,
      discount_price: new_product.discount_price,
      active: new_product.active,
      created_at: Utc::now(),
    };
    tables.products.push(product.clone());
    Ok(product)
  }

  async fn update_product(&self, id: ProductId, patch: ProductPatch) -> StoreResult<Option<Product>> {
    let mut tables = self.tables.write();
    let Some(index) = tables.products.iter().position(|p| p.id == id) else {
      return Ok(None);
    };
    if let Some(Some(category_id)) = patch.category_id {
      if !tables.categories.iter().any(|c| c.id == category_id) {
        return Err(StoreError::UnknownCategory);
      }
    }
    let product = &mut tables.products[index];
    patch.apply_to(product);
    Ok(Some(product.clone()))
  }

  async fn delete_product(&self, id: ProductId) -> StoreResult<bool> {
    let mut tables = self.tables.write();
    if tables.order_items.iter().any(|item| item.product_id == id) {
      return Err(StoreError::Backend(anyhow!(
        "product {} is still referenced by order items",
        id
      )));
    }
    let before = tables.products.len();
    tables.products.retain(|p| p.id != id);
    Ok(tables.products.len() != before)
  }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
  orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
  orders
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn orders(&self) -> StoreResult<Vec<Order>> {
    Ok(newest_first(self.tables.read().orders.clone()))
  }

  async fn orders_for_user(&self, user_id: UserId) -> StoreResult<Vec<Order>> {
    let orders = self.tables.read().orders.iter().filter(|o| o.user_id == user_id).cloned().collect();
    Ok(newest_first(orders))
  }

  async fn order(&self, id: OrderId) -> StoreResult<Option<Order>> {
    Ok(self.tables.read().orders.iter().find(|o| o.id == id).cloned())
  }

  async fn order_items(&self, order_id: OrderId) -> StoreResult<Vec<OrderItem>> {
    Ok(
      self
        .tables
        .read()
        .order_items
        .iter()
        .filter(|item| item.order_id == order_id)
        .cloned()
        .collect(),
    )
  }

  async fn begin(&self) -> StoreResult<Box<dyn OrderTx>> {
    Ok(Box::new(MemoryOrderTx {
      tables: Arc::clone(&self.tables),
      orders: Vec::new(),
      items: Vec::new(),
    }))
  }
}

/// Buffers order writes; ids are drawn from the shared sequences immediately (gaps after a
/// rollback are fine, as with database sequences).
struct MemoryOrderTx {
  tables: Arc<RwLock<Tables>>,
  orders: Vec<Order>,
  items: Vec<OrderItem>,
}

#[async_trait]
impl OrderTx for MemoryOrderTx {
  async fn insert_order(&mut self, new_order: NewOrder) -> StoreResult<Order> {
    let mut tables = self.tables.write();
    if !tables.users.iter().any(|u| u.id == new_order.user_id) {
      return Err(StoreError::Backend(anyhow!("user {} does not exist", new_order.user_id)));
    }
    let order = Order {
      id: next_id(&mut tables.order_seq),
      user_id: new_order.user_id,
      total_amount: new_order.total_amount,
      status: new_order.status,
      created_at: Utc::now(),
    };
    self.orders.push(order.clone());
    Ok(order)
  }

  async fn insert_order_item(&mut self, new_item: NewOrderItem) -> StoreResult<OrderItem> {
    let mut tables = self.tables.write();
    let order_known = self.orders.iter().any(|o| o.id == new_item.order_id)
      || tables.orders.iter().any(|o| o.id == new_item.order_id);
    if !order_known {
      return Err(StoreError::Backend(anyhow!("order {} does not exist", new_item.order_id)));
    }
    if !tables.products.iter().any(|p| p.id == new_item.product_id) {
      return Err(StoreError::Backend(anyhow!(
        "product {} does not exist",
        new_item.product_id
      )));
    }
    let item = OrderItem {
      id: next_id(&mut tables.order_item_seq),
      order_id: new_item.order_id,
      product_id: new_item.product_id,
      price: new_item.price,
    };
    self.items.push(item.clone());
    Ok(item)
  }

  async fn commit(self: Box<Self>) -> StoreResult<()> {
    let MemoryOrderTx { tables, orders, items } = *self;
    let mut tables = tables.write();
    tables.orders.extend(orders);
    tables.order_items.extend(items);
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> StoreResult<()> {
    debug!(
      discarded_orders = self.orders.len(),
      discarded_items = self.items.len(),
      "Unit of work rolled back."
    );
    Ok(())
  }
}
