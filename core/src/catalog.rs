// core/src/catalog.rs

//! Products and categories. Admin gating happens before these calls, at the boundary.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::error::{SouqError, SouqResult};
use crate::models::{Category, CategoryId, NewCategory, NewProduct, Product, ProductId, ProductPatch};
use crate::store::Store;

#[derive(Clone)]
pub struct Catalog {
  store: Arc<dyn Store>,
}

impl Catalog {
  pub fn new(store: Arc<dyn Store>) -> Self {
    Self { store }
  }

  pub async fn categories(&self) -> SouqResult<Vec<Category>> {
    Ok(self.store.categories().await?)
  }

  pub async fn create_category(&self, new_category: NewCategory) -> SouqResult<Category> {
    if new_category.name.trim().is_empty() || new_category.slug.trim().is_empty() {
      return Err(SouqError::Validation("Category name and slug are required".to_string()));
    }
    Ok(self.store.insert_category(new_category).await?)
  }

  pub async fn products(&self) -> SouqResult<Vec<Product>> {
    Ok(self.store.products().await?)
  }

  pub async fn featured_products(&self) -> SouqResult<Vec<Product>> {
    Ok(self.store.featured_products().await?)
  }

  pub async fn products_in_category(&self, category_id: CategoryId) -> SouqResult<Vec<Product>> {
    Ok(self.store.products_in_category(category_id).await?)
  }

  pub async fn product(&self, id: ProductId) -> SouqResult<Product> {
    self
      .store
      .product(id)
      .await?
      .ok_or_else(|| SouqError::NotFound("Product".to_string()))
  }

  #[instrument(name = "Catalog::create_product", skip_all, fields(title = %new_product.title))]
  pub async fn create_product(&self, new_product: NewProduct) -> SouqResult<Product> {
    new_product.validate()?;
    let product = self.store.insert_product(new_product).await?;
    info!(product_id = product.id, "Product created.");
    Ok(product)
  }

  #[instrument(name = "Catalog::update_product", skip(self, patch))]
  pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> SouqResult<Product> {
    patch.validate()?;
    self
      .store
      .update_product(id, patch)
      .await?
      .ok_or_else(|| SouqError::NotFound("Product".to_string()))
  }

  /// Products already referenced by order items cannot be deleted; that surfaces as a
  /// persistence failure.
  #[instrument(name = "Catalog::delete_product", skip(self))]
  pub async fn delete_product(&self, id: ProductId) -> SouqResult<()> {
    if self.store.delete_product(id).await? {
      info!(product_id = id, "Product deleted.");
      Ok(())
    } else {
      Err(SouqError::NotFound("Product".to_string()))
    }
  }
}
