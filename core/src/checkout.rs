// core/src/checkout.rs

//! OrderPlacement: turns an authenticated cart submission into one order plus one
//! order item per submitted line, written as a single unit of work.

use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{FlowError, SouqError, SouqResult};
use crate::flow::{ContextData, Flow, FlowOutcome, StepControl};
use crate::models::{cart_total, parse_cart, CartLineItem, Identity, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, UserId};
use crate::store::{OrderTx, Store};

/// Where the charged price of each line comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PricingPolicy {
  /// Charge the price the client submitted with the line.
  #[default]
  Submitted,
  /// Re-derive every line's price from the current product record.
  Catalog,
}

impl fmt::Display for PricingPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PricingPolicy::Submitted => f.write_str("submitted"),
      PricingPolicy::Catalog => f.write_str("catalog"),
    }
  }
}

impl FromStr for PricingPolicy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "submitted" => Ok(PricingPolicy::Submitted),
      "catalog" => Ok(PricingPolicy::Catalog),
      other => Err(format!("unknown pricing policy '{}' (expected 'submitted' or 'catalog')", other)),
    }
  }
}

pub(crate) struct CheckoutCtx {
  store: Arc<dyn Store>,
  policy: PricingPolicy,
  user_id: UserId,
  submitted: Value,
  items: Vec<CartLineItem>,
  total_amount: f64,
  order: Option<Order>,
}

pub struct OrderPlacement {
  store: Arc<dyn Store>,
  policy: PricingPolicy,
  flow: Flow<CheckoutCtx, SouqError>,
}

impl OrderPlacement {
  pub fn new(store: Arc<dyn Store>, policy: PricingPolicy) -> Self {
    Self {
      store,
      policy,
      flow: checkout_flow(),
    }
  }

  pub fn policy(&self) -> PricingPolicy {
    self.policy
  }

  /// Places an order for `identity` from the raw `items` value of a checkout request.
  ///
  /// Every line is shape-checked before the first write; the order row and its item rows
  /// are then written in one unit of work. The returned order carries no items.
  #[instrument(name = "OrderPlacement::place_order", skip_all, fields(user_id = identity.id, policy = %self.policy))]
  pub async fn place_order(&self, identity: &Identity, submitted: &Value) -> SouqResult<Order> {
    let ctx = ContextData::new(CheckoutCtx {
      store: self.store.clone(),
      policy: self.policy,
      user_id: identity.id,
      submitted: submitted.clone(),
      items: Vec::new(),
      total_amount: 0.0,
      order: None,
    });
    let outcome = self.flow.run(ctx.clone()).await?;
    let guard = ctx.read();
    match (outcome, &guard.order) {
      (FlowOutcome::Completed, Some(order)) => Ok(order.clone()),
      _ => Err(
        FlowError::Incomplete {
          flow: self.flow.name().to_string(),
          step_name: "persist_order".to_string(),
        }
        .into(),
      ),
    }
  }
}

fn checkout_flow() -> Flow<CheckoutCtx, SouqError> {
  let mut flow = Flow::<CheckoutCtx, SouqError>::new(
    "checkout",
    &[
      ("validate_cart", false),
      ("reprice_from_catalog", false),
      ("compute_total", false),
      ("persist_order", false),
    ],
  );

  flow.skip_step_if("reprice_from_catalog", |ctx: &ContextData<CheckoutCtx>| {
    ctx.read().policy == PricingPolicy::Submitted
  });

  flow.on_step("validate_cart", |ctx: ContextData<CheckoutCtx>| async move {
    let mut guard = ctx.write();
    let items = parse_cart(&guard.submitted).map_err(|e| {
      warn!(error = %e, "Cart rejected.");
      e
    })?;
    debug!(lines = items.len(), "Cart validated.");
    guard.items = items;
    Ok::<_, SouqError>(StepControl::Continue)
  });

  flow.on_step("reprice_from_catalog", |ctx: ContextData<CheckoutCtx>| async move {
    let (store, mut items) = {
      let guard = ctx.read();
      (guard.store.clone(), guard.items.clone())
    };
    for (index, item) in items.iter_mut().enumerate() {
      let product = store.product(item.product_id).await?;
      match product {
        Some(product) if product.active => {
          if product.effective_price() != item.price {
            debug!(
              product_id = item.product_id,
              submitted = item.price,
              charged = product.effective_price(),
              "Line repriced from catalog."
            );
          }
          item.price = product.effective_price();
        }
        _ => {
          return Err(SouqError::InvalidLineItem {
            index,
            reason: format!("product {} is not available", item.product_id),
          })
        }
      }
    }
    ctx.write().items = items;
    Ok::<_, SouqError>(StepControl::Continue)
  });

  flow.on_step("compute_total", |ctx: ContextData<CheckoutCtx>| async move {
    let mut guard = ctx.write();
    let total_amount = cart_total(&guard.items);
    guard.total_amount = total_amount;
    Ok::<_, SouqError>(StepControl::Continue)
  });

  flow.on_step("persist_order", |ctx: ContextData<CheckoutCtx>| async move {
    let (store, user_id, total_amount, items) = {
      let guard = ctx.read();
      (guard.store.clone(), guard.user_id, guard.total_amount, guard.items.clone())
    };

    let mut tx = store.begin().await?;
    match write_order(tx.as_mut(), user_id, total_amount, &items).await {
      Ok((order, order_items)) => {
        tx.commit().await?;
        info!(order_id = order.id, total_amount, lines = order_items.len(), "Order placed.");
        ctx.write().order = Some(order);
        Ok::<_, SouqError>(StepControl::Continue)
      }
      Err(write_err) => {
        error!(error = %write_err, "Order write failed; rolling back.");
        if let Err(rollback_err) = tx.rollback().await {
          error!(error = %rollback_err, "Rollback failed.");
        }
        Err(SouqError::persistence(write_err))
      }
    }
  });

  flow
}

async fn write_order(
  tx: &mut dyn OrderTx,
  user_id: UserId,
  total_amount: f64,
  items: &[CartLineItem],
) -> Result<(Order, Vec<OrderItem>), crate::error::StoreError> {
  let order = tx
    .insert_order(NewOrder {
      user_id,
      total_amount,
      status: OrderStatus::Completed,
    })
    .await?;

  let mut order_items = Vec::with_capacity(items.len());
  for item in items {
    let row = tx
      .insert_order_item(NewOrderItem {
        order_id: order.id,
        product_id: item.product_id,
        price: item.price,
      })
      .await?;
    order_items.push(row);
  }
  Ok((order, order_items))
}
