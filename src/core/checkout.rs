//! Order placement - Turns a validated cart into a persisted order.
//!
//! All writes for one sale run in a single database transaction: the order header,
//! one item per cart line, and a guarded stock decrement per line. Any failure rolls
//! the whole sale back. Nothing here touches the cart or the receipt; the register
//! does that only after [`place_order`] returns `Ok`.

use super::{cart::CartLine, stock::reserve_stock};
use crate::{
    entities::{Order, OrderItem, order, order_item},
    errors::{Error, Result},
};
use sea_orm::{DatabaseTransaction, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{error, info, instrument, warn};

/// Lifecycle values stored in `orders.status`.
///
/// The register only ever writes [`OrderStatus::Completed`]; the rest are web order
/// states kept so both front ends share one column vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Web order accepted, not yet shipped
    Processing,
    /// Web order out for delivery
    Delivering,
    /// Paid and handed over
    Completed,
    /// Abandoned or refused
    Cancelled,
}

impl OrderStatus {
    /// Column value for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Delivering => "delivering",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// A committed order with its items, in cart order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    /// The header row
    pub order: order::Model,
    /// One row per cart line
    pub items: Vec<order_item::Model>,
}

/// Checks the cash handed over against the amount due and returns the change.
///
/// # Errors
/// - [`Error::InvalidAmount`] when `tendered` is negative or not finite
/// - [`Error::InsufficientPayment`] when `tendered < total`
pub fn validate_payment(total: f64, tendered: f64) -> Result<f64> {
    if !tendered.is_finite() || tendered < 0.0 {
        return Err(Error::InvalidAmount { amount: tendered });
    }
    if tendered < total {
        return Err(Error::InsufficientPayment { total, tendered });
    }
    Ok(tendered - total)
}

/// Persists an order for the given lines and takes their quantities out of stock.
///
/// Runs as one transaction. If any item insert or stock decrement fails, the
/// transaction is rolled back and the error is returned unchanged: no order, no
/// items and no stock changes survive.
#[instrument(skip(db, lines), fields(lines = lines.len()))]
pub async fn place_order(
    db: &DatabaseConnection,
    customer_name: &str,
    lines: &[CartLine],
) -> Result<PlacedOrder> {
    if lines.is_empty() {
        return Err(Error::EmptyCart);
    }
    if let Some(line) = lines.iter().find(|l| l.quantity <= 0) {
        return Err(Error::InvalidQuantity {
            quantity: line.quantity,
        });
    }

    let txn = db.begin().await?;

    match write_order(&txn, customer_name, lines).await {
        Ok(placed) => {
            txn.commit().await?;
            info!(
                "Order {} committed: {} items, total {:.2}",
                placed.order.id,
                placed.items.len(),
                placed.order.total
            );
            Ok(placed)
        }
        Err(e) => {
            warn!("Rolling back order: {}", e);
            if let Err(rollback_err) = txn.rollback().await {
                error!("Rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

async fn write_order(
    txn: &DatabaseTransaction,
    customer_name: &str,
    lines: &[CartLine],
) -> Result<PlacedOrder> {
    let total: f64 = lines.iter().map(CartLine::line_total).sum();

    let order = order::ActiveModel {
        customer_name: Set(customer_name.trim().to_string()),
        total: Set(total),
        status: Set(OrderStatus::Completed.as_str().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let item = order_item::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            size_id: Set(line.size_id),
            product_name: Set(line.product_name.clone()),
            size_value: Set(line.size_value.clone()),
            price: Set(line.unit_price),
            quantity: Set(line.quantity),
            line_total: Set(line.line_total()),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        reserve_stock(txn, line.product_id, line.size_id, line.quantity).await?;
        items.push(item);
    }

    Ok(PlacedOrder { order, items })
}

/// Loads a committed order and its items.
pub async fn get_order_with_items(db: &DatabaseConnection, order_id: i64) -> Result<PlacedOrder> {
    let order = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { order_id })?;

    let items = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?;

    Ok(PlacedOrder { order, items })
}
