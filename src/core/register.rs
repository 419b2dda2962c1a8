//! Register session - The operations a cashier performs, with typed results.
//!
//! A [`Register`] owns the database handle it was given, one cart, the store settings
//! and a receipt emitter. Front ends call these methods and render the returned
//! snapshots and outcomes; they never reach into the cart directly.

use super::{
    cart::{Cart, CartSnapshot, LineKey},
    catalog::{self, LowStock},
    checkout::{self, PlacedOrder},
    receipt::{Receipt, ReceiptEmitter},
};
use crate::{
    config::store::StoreConfig,
    entities::{order, order_item},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use tracing::{info, instrument, warn};

/// Result of scanning a barcode.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// One unit of the scanned size is now in the cart
    Added(CartSnapshot),
    /// No size carries this SKU; the cart is unchanged
    NotFound {
        /// What was scanned
        sku: String,
    },
}

/// Result of a committed checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOutcome {
    /// The persisted order header
    pub order: order::Model,
    /// The persisted items
    pub items: Vec<order_item::Model>,
    /// Cash to hand back to the customer
    pub change_due: f64,
    /// Set when the receipt could not be produced; the order still stands
    pub receipt_warning: Option<String>,
}

/// One cashier session.
pub struct Register<E> {
    db: DatabaseConnection,
    store: StoreConfig,
    cart: Cart,
    emitter: E,
}

impl<E: ReceiptEmitter> Register<E> {
    /// Starts a session with an empty cart.
    pub fn new(db: DatabaseConnection, store: StoreConfig, emitter: E) -> Self {
        Self {
            db,
            store,
            cart: Cart::new(),
            emitter,
        }
    }

    /// The database handle this session uses.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// The store settings this session uses.
    pub fn store(&self) -> &StoreConfig {
        &self.store
    }

    /// Current cart contents.
    pub fn snapshot(&self) -> CartSnapshot {
        self.cart.snapshot()
    }

    /// Adds `quantity` units of a product size picked from the catalog.
    ///
    /// Inactive products cannot be sold and read as not found.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &mut self,
        product_id: i64,
        size_id: i64,
        quantity: i32,
    ) -> Result<CartSnapshot> {
        let product = catalog::get_product_by_id(&self.db, product_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or(Error::ProductNotFound { product_id })?;
        let size = catalog::get_size_by_id(&self.db, size_id)
            .await?
            .ok_or(Error::SizeNotFound { size_id })?;

        self.cart
            .add_or_increment(&self.db, &product, &size, quantity)
            .await
    }

    /// Adds one unit of whatever size carries `sku`.
    ///
    /// An unknown SKU is not an error: it returns [`ScanOutcome::NotFound`] and the
    /// front end decides how to tell the cashier.
    #[instrument(skip(self))]
    pub async fn scan(&mut self, sku: &str) -> Result<ScanOutcome> {
        let sku = sku.trim();
        let Some((product, size)) = catalog::find_by_sku(&self.db, sku).await? else {
            info!("No product for scanned SKU");
            return Ok(ScanOutcome::NotFound {
                sku: sku.to_string(),
            });
        };

        let snapshot = self
            .cart
            .add_or_increment(&self.db, &product, &size, 1)
            .await?;
        Ok(ScanOutcome::Added(snapshot))
    }

    /// Raises a line by one after re-checking stock.
    pub async fn increment(&mut self, key: LineKey) -> Result<CartSnapshot> {
        self.cart.increment(&self.db, key).await
    }

    /// Lowers a line by one, never below 1.
    pub fn decrement(&mut self, key: LineKey) -> Result<CartSnapshot> {
        self.cart.decrement(key)
    }

    /// Removes a line.
    pub fn remove(&mut self, key: LineKey) -> Result<CartSnapshot> {
        self.cart.remove(key)
    }

    /// Takes payment and places the order.
    ///
    /// Payment is validated before any database work. Any failure inside the order
    /// transaction comes back as [`Error::CheckoutFailed`] wrapping the cause, with
    /// the cart untouched so the cashier can retry. After a commit the cart is
    /// cleared and the receipt emitted; a receipt failure is only reported in
    /// [`CheckoutOutcome::receipt_warning`].
    #[instrument(skip(self))]
    pub async fn checkout(
        &mut self,
        customer_name: &str,
        cash_tendered: f64,
    ) -> Result<CheckoutOutcome> {
        if self.cart.is_empty() {
            return Err(Error::EmptyCart);
        }
        let change_due = checkout::validate_payment(self.cart.total(), cash_tendered)?;

        let placed = checkout::place_order(&self.db, customer_name, self.cart.lines())
            .await
            .map_err(|e| Error::CheckoutFailed(Box::new(e)))?;

        self.cart.clear();

        let receipt_warning = self.emit_receipt(&placed).err().map(|e| {
            warn!("Order {} committed but receipt failed: {}", placed.order.id, e);
            e.to_string()
        });

        Ok(CheckoutOutcome {
            order: placed.order,
            items: placed.items,
            change_due,
            receipt_warning,
        })
    }

    /// Emits the receipt of a past order again, read from the database.
    pub async fn reprint(&self, order_id: i64) -> Result<()> {
        let placed = checkout::get_order_with_items(&self.db, order_id).await?;
        self.emit_receipt(&placed)
    }

    /// Sizes at or below the configured low-stock threshold.
    pub async fn low_stock(&self) -> Result<Vec<LowStock>> {
        catalog::get_low_stock_sizes(&self.db, self.store.low_stock_threshold).await
    }

    fn emit_receipt(&self, placed: &PlacedOrder) -> Result<()> {
        let receipt = Receipt::from_order(&self.store, placed);
        self.emitter.emit(&receipt)
    }
}
