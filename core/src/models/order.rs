// core/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::catalog::ProductId;
use super::identity::UserId;

pub type OrderId = i32;
pub type OrderItemId = i32;

/// Checkout records orders as already completed; there is no pending/cancelled lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Completed,
}

impl OrderStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Completed => "completed",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "completed" => Ok(OrderStatus::Completed),
      other => Err(format!("unknown order status '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: OrderId,
  pub user_id: UserId,
  pub total_amount: f64,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
  pub user_id: UserId,
  pub total_amount: f64,
  pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub id: OrderItemId,
  pub order_id: OrderId,
  pub product_id: ProductId,
  pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
  pub order_id: OrderId,
  pub product_id: ProductId,
  pub price: f64,
}

/// An order together with its line items, as returned by the order detail route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<OrderItem>,
}
