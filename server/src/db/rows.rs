// server/src/db/rows.rs

//! Row shapes as Postgres returns them, converted into the domain models.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use souq::models::{Category, Order, OrderItem, OrderStatus, Product, User};
use souq::StoreError;
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct UserRow {
  pub id: i32,
  pub username: String,
  pub email: String,
  pub password: String,
  pub is_admin: bool,
  pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
  fn from(row: UserRow) -> Self {
    User {
      id: row.id,
      username: row.username,
      email: row.email,
      password: row.password,
      is_admin: row.is_admin,
      created_at: row.created_at,
    }
  }
}

#[derive(Debug, FromRow)]
pub struct CategoryRow {
  pub id: i32,
  pub name: String,
  pub slug: String,
}

impl From<CategoryRow> for Category {
  fn from(row: CategoryRow) -> Self {
    Category {
      id: row.id,
      name: row.name,
      slug: row.slug,
    }
  }
}

#[derive(Debug, FromRow)]
pub struct ProductRow {
  pub id: i32,
  pub title: String,
  pub description: String,
  pub price: f64,
  pub image_url: String,
  pub file_url: String,
  pub category_id: Option<i32>,
  pub featured: bool,
  pub popular: bool,
  pub discount_price: Option<f64>,
  pub active: bool,
  pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
  fn from(row: ProductRow) -> Self {
    Product {
      id: row.id,
      title: row.title,
      description: row.description,
      price: row.price,
      image_url: row.image_url,
      file_url: row.file_url,
      category_id: row.category_id,
      featured: row.featured,
      popular: row.popular,
      discount_price: row.discount_price,
      active: row.active,
      created_at: row.created_at,
    }
  }
}

#[derive(Debug, FromRow)]
pub struct OrderRow {
  pub id: i32,
  pub user_id: i32,
  pub total_amount: f64,
  pub status: String,
  pub created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
  type Error = StoreError;

  fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
    let status = row
      .status
      .parse::<OrderStatus>()
      .map_err(|e| StoreError::Backend(anyhow!("order {}: {}", row.id, e)))?;
    Ok(Order {
      id: row.id,
      user_id: row.user_id,
      total_amount: row.total_amount,
      status,
      created_at: row.created_at,
    })
  }
}

#[derive(Debug, FromRow)]
pub struct OrderItemRow {
  pub id: i32,
  pub order_id: i32,
  pub product_id: i32,
  pub price: f64,
}

impl From<OrderItemRow> for OrderItem {
  fn from(row: OrderItemRow) -> Self {
    OrderItem {
      id: row.id,
      order_id: row.order_id,
      product_id: row.product_id,
      price: row.price,
    }
  }
}

/// Converts a batch of order rows, failing on the first unreadable status.
pub fn into_orders(rows: Vec<OrderRow>) -> Result<Vec<Order>, StoreError> {
  rows.into_iter().map(Order::try_from).collect()
}
