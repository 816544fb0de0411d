// core/src/ledger.rs

//! Read side of orders: dashboards and order detail.

use std::sync::Arc;
use tracing::{instrument, warn};

use crate::error::{SouqError, SouqResult};
use crate::models::{Identity, Order, OrderId, OrderWithItems};
use crate::store::Store;

#[derive(Clone)]
pub struct OrderLedger {
  store: Arc<dyn Store>,
}

impl OrderLedger {
  pub fn new(store: Arc<dyn Store>) -> Self {
    Self { store }
  }

  /// Every order in the shop. Callers gate this behind `require_admin`.
  pub async fn all_orders(&self) -> SouqResult<Vec<Order>> {
    Ok(self.store.orders().await?)
  }

  pub async fn orders_for(&self, identity: &Identity) -> SouqResult<Vec<Order>> {
    Ok(self.store.orders_for_user(identity.id).await?)
  }

  /// An order with its items, visible to its owner and to admins. Absence is reported
  /// before ownership, so a missing order is `NotFound` for everyone.
  #[instrument(name = "OrderLedger::order_with_items", skip(self, identity), fields(user_id = identity.id))]
  pub async fn order_with_items(&self, identity: &Identity, order_id: OrderId) -> SouqResult<OrderWithItems> {
    let order = self
      .store
      .order(order_id)
      .await?
      .ok_or_else(|| SouqError::NotFound("Order".to_string()))?;

    if !identity.is_admin && order.user_id != identity.id {
      warn!(owner_id = order.user_id, "Order detail requested by a non-owner.");
      return Err(SouqError::Forbidden);
    }

    let items = self.store.order_items(order.id).await?;
    Ok(OrderWithItems { order, items })
  }
}
