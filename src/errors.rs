//! Unified error type for the point-of-sale core.
//!
//! Validation failures (stock ceilings, quantities, payment) are recoverable and leave
//! the cart untouched. Anything raised while the order transaction is open is wrapped
//! into [`Error::CheckoutFailed`] by the register after the rollback.

use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Underlying `SeaORM` failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// File system failure (config files, receipt directory)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested quantity would exceed the stock on hand
    #[error(
        "Insufficient stock for product {product_id} size {size_id}: requested {requested}, only {remaining} available"
    )]
    InsufficientStock {
        /// Product being added
        product_id: i64,
        /// Size being added
        size_id: i64,
        /// Quantity the caller asked for
        requested: i32,
        /// How many more units may still be taken
        remaining: i32,
    },

    /// Quantities must be strictly positive
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i32,
    },

    /// Prices and payments must be finite and non-negative
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Product lookup by id failed
    #[error("Product not found: {product_id}")]
    ProductNotFound {
        /// The id that was looked up
        product_id: i64,
    },

    /// Size lookup by id failed
    #[error("Size not found: {size_id}")]
    SizeNotFound {
        /// The id that was looked up
        size_id: i64,
    },

    /// The size exists but belongs to another product
    #[error("Size {size_id} does not belong to product {product_id}")]
    SizeMismatch {
        /// Product the caller named
        product_id: i64,
        /// Size the caller named
        size_id: i64,
    },

    /// The SKU is already assigned to another size
    #[error("SKU already in use: {sku}")]
    DuplicateSku {
        /// The conflicting SKU
        sku: String,
    },

    /// No cart line matches the given product and size
    #[error("No cart line for product {product_id} size {size_id}")]
    LineNotFound {
        /// Product of the missing line
        product_id: i64,
        /// Size of the missing line
        size_id: i64,
    },

    /// Checkout was requested with nothing in the cart
    #[error("Cart is empty")]
    EmptyCart,

    /// Cash handed over does not cover the total
    #[error("Cash given ({tendered:.2}) is less than total ({total:.2})")]
    InsufficientPayment {
        /// Amount due
        total: f64,
        /// Amount handed over
        tendered: f64,
    },

    /// A stock decrement inside the order transaction matched no row
    #[error("Stock update failed for size {size_id}")]
    StockUpdateFailed {
        /// Size whose row was missing
        size_id: i64,
    },

    /// The order transaction was rolled back
    #[error("Payment failed: {0}")]
    CheckoutFailed(#[source] Box<Error>),

    /// Order lookup by id failed
    #[error("Order not found: {order_id}")]
    OrderNotFound {
        /// The id that was looked up
        order_id: i64,
    },

    /// Receipt could not be written or printed
    #[error("Receipt error: {message}")]
    Receipt {
        /// What went wrong
        message: String,
    },

    /// Terminal input could not be parsed
    #[error("Invalid command: {message}")]
    InvalidCommand {
        /// Why the input was rejected
        message: String,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
