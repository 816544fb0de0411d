// core/src/models/cart.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalog::ProductId;
use crate::error::SouqError;

/// One entry of a client-held cart. Transient: only `product_id` and `price` are persisted,
/// as an order item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
  pub product_id: ProductId,
  pub title: String,
  pub price: f64,
  pub image_url: String,
  #[serde(default)]
  pub category_name: Option<String>,
}

impl CartLineItem {
  /// Shape-checks one submitted entry. `index` is its position in the submitted list.
  pub fn from_value(index: usize, entry: &Value) -> Result<Self, SouqError> {
    if !entry.is_object() {
      return Err(SouqError::InvalidLineItem {
        index,
        reason: "expected an object".to_string(),
      });
    }
    serde_json::from_value(entry.clone()).map_err(|e| SouqError::InvalidLineItem {
      index,
      reason: e.to_string(),
    })
  }
}

/// Turns the submitted `items` value into line items, all or nothing.
///
/// Anything that is not a non-empty array is an empty cart; the first malformed entry
/// rejects the whole submission.
pub fn parse_cart(submitted: &Value) -> Result<Vec<CartLineItem>, SouqError> {
  let entries = match submitted.as_array() {
    Some(entries) if !entries.is_empty() => entries,
    _ => return Err(SouqError::EmptyCart),
  };
  entries
    .iter()
    .enumerate()
    .map(|(index, entry)| CartLineItem::from_value(index, entry))
    .collect()
}

/// Sum of line prices, accumulated in submission order.
pub fn cart_total(items: &[CartLineItem]) -> f64 {
  items.iter().fold(0.0, |sum, item| sum + item.price)
}
