//! Cart aggregate - The cashier's working set of line items.
//!
//! Nothing in the cart is persisted until checkout. Every quantity change that could
//! raise a line re-reads live stock first, and every operation hands back a
//! [`CartSnapshot`] for the front end to render.

use super::stock::available_stock;
use crate::{
    entities::{product, product_size},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use tracing::debug;

/// Identifies a cart line: one line per product and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineKey {
    /// Product of the line
    pub product_id: i64,
    /// Size of the line
    pub size_id: i64,
}

/// One product + size + quantity pending checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Product being sold
    pub product_id: i64,
    /// Size being sold
    pub size_id: i64,
    /// Product name copied when the line was created
    pub product_name: String,
    /// Size label copied when the line was created
    pub size_value: String,
    /// Unit price copied when the line was created
    pub unit_price: f64,
    /// Always at least 1
    pub quantity: i32,
}

impl CartLine {
    /// The key this line is addressed by.
    #[must_use]
    pub const fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id,
            size_id: self.size_id,
        }
    }

    /// `unit_price * quantity`
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Immutable view of the cart after an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    /// Lines in insertion order
    pub lines: Vec<CartLine>,
    /// Sum of line totals
    pub subtotal: f64,
    /// Amount due; equal to `subtotal` at the register (no tax or shipping)
    pub total: f64,
}

/// In-memory cart. One per cashier session.
#[derive(Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Adds `requested` units of a size, merging into an existing line for the same
    /// product and size.
    ///
    /// Fails with [`Error::InsufficientStock`] when the line would exceed the stock on
    /// hand; the error carries how many more units may still be added. The cart is
    /// left unchanged on any error.
    pub async fn add_or_increment(
        &mut self,
        db: &DatabaseConnection,
        product: &product::Model,
        size: &product_size::Model,
        requested: i32,
    ) -> Result<CartSnapshot> {
        if requested <= 0 {
            return Err(Error::InvalidQuantity {
                quantity: requested,
            });
        }
        if size.product_id != product.id {
            return Err(Error::SizeMismatch {
                product_id: product.id,
                size_id: size.id,
            });
        }

        let key = LineKey {
            product_id: product.id,
            size_id: size.id,
        };
        let existing = self.position(key).map_or(0, |i| self.lines[i].quantity);
        let available = available_stock(db, product.id, size.id).await?;
        check_ceiling(key, existing, requested, available)?;

        if let Some(i) = self.position(key) {
            self.lines[i].quantity += requested;
        } else {
            self.lines.push(CartLine {
                product_id: product.id,
                size_id: size.id,
                product_name: product.name.clone(),
                size_value: size.size_value.clone(),
                unit_price: product.price,
                quantity: requested,
            });
        }
        debug!(?key, requested, available, "Cart line added");

        Ok(self.snapshot())
    }

    /// Raises a line by one unit after re-checking live stock.
    pub async fn increment(&mut self, db: &DatabaseConnection, key: LineKey) -> Result<CartSnapshot> {
        let index = self.require(key)?;
        let existing = self.lines[index].quantity;
        let available = available_stock(db, key.product_id, key.size_id).await?;
        check_ceiling(key, existing, 1, available)?;

        self.lines[index].quantity += 1;
        Ok(self.snapshot())
    }

    /// Lowers a line by one unit. A line never drops below 1; use [`Cart::remove`].
    pub fn decrement(&mut self, key: LineKey) -> Result<CartSnapshot> {
        let index = self.require(key)?;
        let line = &mut self.lines[index];
        if line.quantity > 1 {
            line.quantity -= 1;
        }
        Ok(self.snapshot())
    }

    /// Drops a line regardless of its quantity.
    pub fn remove(&mut self, key: LineKey) -> Result<CartSnapshot> {
        let index = self.require(key)?;
        self.lines.remove(index);
        Ok(self.snapshot())
    }

    /// Empties the cart. Called only after a committed checkout.
    pub fn clear(&mut self) -> CartSnapshot {
        self.lines.clear();
        self.snapshot()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// `true` when there is nothing to check out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Amount due. Tax and shipping are not charged at the register.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.subtotal()
    }

    /// Copies the current state.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.clone(),
            subtotal: self.subtotal(),
            total: self.total(),
        }
    }

    fn position(&self, key: LineKey) -> Option<usize> {
        self.lines.iter().position(|line| line.key() == key)
    }

    fn require(&self, key: LineKey) -> Result<usize> {
        self.position(key).ok_or(Error::LineNotFound {
            product_id: key.product_id,
            size_id: key.size_id,
        })
    }
}

fn check_ceiling(key: LineKey, existing: i32, requested: i32, available: i32) -> Result<()> {
    if existing.saturating_add(requested) > available {
        return Err(Error::InsufficientStock {
            product_id: key.product_id,
            size_id: key.size_id,
            requested,
            remaining: (available - existing).max(0),
        });
    }
    Ok(())
}
