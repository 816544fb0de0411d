// core/src/models/catalog.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SouqError;

pub type CategoryId = i32;
pub type ProductId = i32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
  pub id: CategoryId,
  pub name: String,
  pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
  pub name: String,
  pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: ProductId,
  pub title: String,
  pub description: String,
  pub price: f64,
  pub image_url: String,
  pub file_url: String,
  pub category_id: Option<CategoryId>,
  pub featured: bool,
  pub popular: bool,
  pub discount_price: Option<f64>,
  pub active: bool,
  pub created_at: DateTime<Utc>,
}

impl Product {
  /// What a buyer pays today: the discount price when one is set.
  pub fn effective_price(&self) -> f64 {
    self.discount_price.unwrap_or(self.price)
  }
}

fn default_true() -> bool {
  true
}

/// Create payload for a product, as posted by the admin dashboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
  pub title: String,
  pub description: String,
  pub price: f64,
  pub image_url: String,
  pub file_url: String,
  #[serde(default)]
  pub category_id: Option<CategoryId>,
  #[serde(default)]
  pub featured: bool,
  #[serde(default)]
  pub popular: bool,
  #[serde(default)]
  pub discount_price: Option<f64>,
  #[serde(default = "default_true")]
  pub active: bool,
}

impl NewProduct {
  pub fn validate(&self) -> Result<(), SouqError> {
    validate_title(&self.title)?;
    validate_price("price", self.price)?;
    if let Some(discount) = self.discount_price {
      validate_price("discountPrice", discount)?;
    }
    Ok(())
  }
}

// Absent field -> None, explicit null -> Some(None).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update for a product. Nullable columns can be cleared by sending `null`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
  pub title: Option<String>,
  pub description: Option<String>,
  pub price: Option<f64>,
  pub image_url: Option<String>,
  pub file_url: Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub category_id: Option<Option<CategoryId>>,
  pub featured: Option<bool>,
  pub popular: Option<bool>,
  #[serde(default, deserialize_with = "nullable")]
  pub discount_price: Option<Option<f64>>,
  pub active: Option<bool>,
}

impl ProductPatch {
  pub fn validate(&self) -> Result<(), SouqError> {
    if let Some(title) = &self.title {
      validate_title(title)?;
    }
    if let Some(price) = self.price {
      validate_price("price", price)?;
    }
    if let Some(Some(discount)) = self.discount_price {
      validate_price("discountPrice", discount)?;
    }
    Ok(())
  }

  pub fn apply_to(&self, product: &mut Product) {
    if let Some(title) = &self.title {
      product.title = title.clone();
    }
    if let Some(description) = &self.description {
      product.description = description.clone();
    }
    if let Some(price) = self.price {
      product.price = price;
    }
    if let Some(image_url) = &self.image_url {
      product.image_url = image_url.clone();
    }
    if let Some(file_url) = &self.file_url {
      product.file_url = file_url.clone();
    }
    if let Some(category_id) = self.category_id {
      product.category_id = category_id;
    }
    if let Some(featured) = self.featured {
      product.featured = featured;
    }
    if let Some(popular) = self.popular {
      product.popular = popular;
    }
    if let Some(discount_price) = self.discount_price {
      product.discount_price = discount_price;
    }
    if let Some(active) = self.active {
      product.active = active;
    }
  }
}

fn validate_title(title: &str) -> Result<(), SouqError> {
  if title.trim().is_empty() {
    return Err(SouqError::Validation("Product title is required".to_string()));
  }
  Ok(())
}

fn validate_price(field: &str, value: f64) -> Result<(), SouqError> {
  if !value.is_finite() || value <= 0.0 {
    return Err(SouqError::Validation(format!("{} must be greater than zero", field)));
  }
  Ok(())
}
