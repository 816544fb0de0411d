// server/src/db/pg_store.rs

use async_trait::async_trait;
use souq::models::{
  Category, CategoryId, NewCategory, NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderId, OrderItem, Product,
  ProductId, ProductPatch, User, UserId,
};
use souq::store::{CatalogStore, OrderStore, OrderTx, UserStore};
use souq::{StoreError, StoreResult, UniqueField};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use super::rows::{into_orders, CategoryRow, OrderItemRow, OrderRow, ProductRow, UserRow};

const USER_COLUMNS: &str = "id, username, email, password, is_admin, created_at";
const PRODUCT_COLUMNS: &str =
  "id, title, description, price, image_url, file_url, category_id, featured, popular, discount_price, active, created_at";
const ORDER_COLUMNS: &str = "id, user_id, total_amount, status, created_at";

/// Translates driver errors, naming the unique constraint that was hit when there is one.
fn store_err(err: sqlx::Error) -> StoreError {
  if let sqlx::Error::Database(db_err) = &err {
    if db_err.is_unique_violation() {
      match db_err.constraint() {
        Some("users_username_key") => return StoreError::Duplicate(UniqueField::Username),
        Some("users_email_key") => return StoreError::Duplicate(UniqueField::Email),
        Some("categories_slug_key") => return StoreError::Duplicate(UniqueField::CategorySlug),
        _ => {}
      }
    }
    if db_err.is_foreign_key_violation() && db_err.constraint() == Some("products_category_id_fkey") {
      return StoreError::UnknownCategory;
    }
  }
  StoreError::Backend(err.into())
}

#[derive(Debug, Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl UserStore for PgStore {
  async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(store_err)?;
    Ok(row.map(User::from))
  }

  async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS))
      .bind(username)
      .fetch_optional(&self.pool)
      .await
      .map_err(store_err)?;
    Ok(row.map(User::from))
  }

  async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
      .bind(email)
      .fetch_optional(&self.pool)
      .await
      .map_err(store_err)?;
    Ok(row.map(User::from))
  }

  #[instrument(name = "PgStore::insert_user", skip_all, fields(username = %new_user.username))]
  async fn insert_user(&self, new_user: NewUser) -> StoreResult<User> {
    let row: UserRow = sqlx::query_as(&format!(
      "INSERT INTO users (username, email, password, is_admin) VALUES ($1, $2, $3, $4) RETURNING {}",
      USER_COLUMNS
    ))
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&new_user.password)
    .bind(new_user.is_admin)
    .fetch_one(&self.pool)
    .await
    .map_err(store_err)?;
    debug!(user_id = row.id, "User row inserted.");
    Ok(row.into())
  }

  async fn has_users(&self) -> StoreResult<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users)")
      .fetch_one(&self.pool)
      .await
      .map_err(store_err)?;
    Ok(exists)
  }
}

#[async_trait]
impl CatalogStore for PgStore {
  async fn categories(&self) -> StoreResult<Vec<Category>> {
    let rows: Vec<CategoryRow> = sqlx::query_as("SELECT id, name, slug FROM categories ORDER BY id")
      .fetch_all(&self.pool)
      .await
      .map_err(store_err)?;
    Ok(rows.into_iter().map(Category::from).collect())
  }

  async fn insert_category(&self, new_category: NewCategory) -> StoreResult<Category> {
    let row: CategoryRow =
      sqlx::query_as("INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING id, name, slug")
        .bind(&new_category.name)
        .bind(&new_category.slug)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;
    Ok(row.into())
  }

  async fn products(&self) -> StoreResult<Vec<Product>> {
    let rows: Vec<ProductRow> = sqlx::query_as(&format!("SELECT {} FROM products ORDER BY id", PRODUCT_COLUMNS))
      .fetch_all(&self.pool)
      .await
      .map_err(store_err)?;
    Ok(rows.into_iter().map(Product::from).collect())
  }

  async fn featured_products(&self) -> StoreResult<Vec<Product>> {
    let rows: Vec<ProductRow> = sqlx::query_as(&format!(
      "SELECT {} FROM products WHERE featured ORDER BY id",
      PRODUCT_COLUMNS
    ))
    .fetch_all(&self.pool)
    .await
    .map_err(store_err)?;
    Ok(rows.into_iter().map(Product::from).collect())
  }

  async fn products_in_category(&self, category_id: CategoryId) -> StoreResult<Vec<Product>> {
    let rows: Vec<ProductRow> = sqlx::query_as(&format!(
      "SELECT {} FROM products WHERE category_id = $1 ORDER BY id",
      PRODUCT_COLUMNS
    ))
    .bind(category_id)
    .fetch_all(&self.pool)
    .await
    .map_err(store_err)?;
    Ok(rows.into_iter().map(Product::from).collect())
  }

  async fn product(&self, id: ProductId) -> StoreResult<Option<Product>> {
    let row: Option<ProductRow> = sqlx::query_as(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(store_err)?;
    Ok(row.map(Product::from))
  }

  async fn insert_product(&self, new_product: NewProduct) -> StoreResult<Product> {
    let row: ProductRow = sqlx::query_as(&format!(
      "INSERT INTO products \
       (title, description, price, image_url, file_url, category_id, featured, popular, discount_price, active) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(&new_product.title)
    .bind(&new_product.description)
    .bind(new_product.price)
    .bind(&new_product.image_url)
    .bind(&new_product.file_url)
    .bind(new_product.category_id)
    .bind(new_product.featured)
    .bind(new_product.popular)
    .bind(new_product.discount_price)
    .bind(new_product.active)
    .fetch_one(&self.pool)
    .await
    .map_err(store_err)?;
    Ok(row.into())
  }

  // Read-modify-write under a row lock, so a patch only ever touches the fields it names.
  #[instrument(name = "PgStore::update_product", skip(self, patch))]
  async fn update_product(&self, id: ProductId, patch: ProductPatch) -> StoreResult<Option<Product>> {
    let mut tx = self.pool.begin().await.map_err(store_err)?;
    let current: Option<ProductRow> = sqlx::query_as(&format!(
      "SELECT {} FROM products WHERE id = $1 FOR UPDATE",
      PRODUCT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(store_err)?;
    let Some(current) = current else {
      return Ok(None);
    };

    let mut product = Product::from(current);
    patch.apply_to(&mut product);
    let row: ProductRow = sqlx::query_as(&format!(
      "UPDATE products SET title = $2, description = $3, price = $4, image_url = $5, file_url = $6, \
       category_id = $7, featured = $8, popular = $9, discount_price = $10, active = $11 \
       WHERE id = $1 RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(id)
    .bind(&product.title)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.image_url)
    .bind(&product.file_url)
    .bind(product.category_id)
    .bind(product.featured)
    .bind(product.popular)
    .bind(product.discount_price)
    .bind(product.active)
    .fetch_one(&mut *tx)
    .await
    .map_err(store_err)?;
    tx.commit().await.map_err(store_err)?;
    Ok(Some(row.into()))
  }

  async fn delete_product(&self, id: ProductId) -> StoreResult<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(store_err)?;
    Ok(result.rows_affected() > 0)
  }
}

#[async_trait]
impl OrderStore for PgStore {
  async fn orders(&self) -> StoreResult<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
      "SELECT {} FROM orders ORDER BY created_at DESC, id DESC",
      ORDER_COLUMNS
    ))
    .fetch_all(&self.pool)
    .await
    .map_err(store_err)?;
    into_orders(rows)
  }

  async fn orders_for_user(&self, user_id: UserId) -> StoreResult<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
      "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
      ORDER_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await
    .map_err(store_err)?;
    into_orders(rows)
  }

  async fn order(&self, id: OrderId) -> StoreResult<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(store_err)?;
    row.map(Order::try_from).transpose()
  }

  async fn order_items(&self, order_id: OrderId) -> StoreResult<Vec<OrderItem>> {
    let rows: Vec<OrderItemRow> =
      sqlx::query_as("SELECT id, order_id, product_id, price FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
    Ok(rows.into_iter().map(OrderItem::from).collect())
  }

  async fn begin(&self) -> StoreResult<Box<dyn OrderTx>> {
    let tx = self.pool.begin().await.map_err(store_err)?;
    Ok(Box::new(PgOrderTx { tx }))
  }
}

/// An open Postgres transaction. Dropping it without `commit` rolls it back.
struct PgOrderTx {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrderTx for PgOrderTx {
  async fn insert_order(&mut self, new_order: NewOrder) -> StoreResult<Order> {
    let row: OrderRow = sqlx::query_as(&format!(
      "INSERT INTO orders (user_id, total_amount, status) VALUES ($1, $2, $3) RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(new_order.user_id)
    .bind(new_order.total_amount)
    .bind(new_order.status.as_str())
    .fetch_one(&mut *self.tx)
    .await
    .map_err(store_err)?;
    row.try_into()
  }

  async fn insert_order_item(&mut self, new_item: NewOrderItem) -> StoreResult<OrderItem> {
    let row: OrderItemRow = sqlx::query_as(
      "INSERT INTO order_items (order_id, product_id, price) VALUES ($1, $2, $3) \
       RETURNING id, order_id, product_id, price",
    )
    .bind(new_item.order_id)
    .bind(new_item.product_id)
    .bind(new_item.price)
    .fetch_one(&mut *self.tx)
    .await
    .map_err(store_err)?;
    Ok(row.into())
  }

  async fn commit(self: Box<Self>) -> StoreResult<()> {
    self.tx.commit().await.map_err(store_err)
  }

  async fn rollback(self: Box<Self>) -> StoreResult<()> {
    self.tx.rollback().await.map_err(store_err)
  }
}
