//! Shared test utilities for the point-of-sale core.
//!
//! This module provides common helper functions for setting up test databases
//! and creating catalog rows with sensible defaults.

use crate::{
    core::{
        catalog::{self, NewProduct},
        receipt::{Receipt, ReceiptEmitter},
    },
    entities::{ProductSize, product, product_size},
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness. Safe to call more than once.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an active test product in category "men".
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
) -> Result<product::Model> {
    catalog::create_product(db, NewProduct::new(name, "men", price)).await
}

/// Adds a size to a test product.
pub async fn create_test_size(
    db: &DatabaseConnection,
    product_id: i64,
    size_value: &str,
    stock: i32,
    sku: &str,
) -> Result<product_size::Model> {
    catalog::add_product_size(db, product_id, size_value, stock, sku).await
}

/// Sets up a database holding one product ("Court Runner", 2500.0) with one size
/// ("42", SKU `CR-WHT-42`) carrying `stock` units.
/// Returns (db, product, size) for cart and checkout tests.
pub async fn setup_with_stocked_size(
    stock: i32,
) -> Result<(DatabaseConnection, product::Model, product_size::Model)> {
    let db = setup_test_db().await?;
    let product = create_test_product(&db, "Court Runner", 2500.0).await?;
    let size = create_test_size(&db, product.id, "42", stock, "CR-WHT-42").await?;
    Ok((db, product, size))
}

/// Inserts a product with a fixed id, for scenarios that name their ids.
pub async fn insert_product_with_id(
    db: &DatabaseConnection,
    id: i64,
    name: &str,
    price: f64,
) -> Result<product::Model> {
    product::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        description: Set(None),
        category: Set("men".to_string()),
        price: Set(price),
        color: Set(None),
        images: Set(None),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Inserts a size with a fixed id, for scenarios that name their ids.
pub async fn insert_size_with_id(
    db: &DatabaseConnection,
    id: i64,
    product_id: i64,
    size_value: &str,
    stock: i32,
    sku: &str,
) -> Result<product_size::Model> {
    product_size::ActiveModel {
        id: Set(id),
        product_id: Set(product_id),
        size_value: Set(size_value.to_string()),
        stock: Set(stock),
        sku: Set(sku.to_string()),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Simulates another terminal selling `quantity` units outside this session.
pub async fn sell_elsewhere(db: &DatabaseConnection, size_id: i64, quantity: i32) -> Result<()> {
    use sea_orm::sea_query::Expr;

    ProductSize::update_many()
        .col_expr(
            product_size::Column::Stock,
            Expr::col(product_size::Column::Stock).sub(quantity),
        )
        .filter(product_size::Column::Id.eq(size_id))
        .exec(db)
        .await?;
    Ok(())
}

/// In-memory product and size models for `MockDatabase` tests.
#[must_use]
pub fn sample_product_and_size(
    product_id: i64,
    size_id: i64,
    price: f64,
    stock: i32,
) -> (product::Model, product_size::Model) {
    (
        product::Model {
            id: product_id,
            name: format!("Product {product_id}"),
            description: None,
            category: "men".to_string(),
            price,
            color: None,
            images: None,
            is_active: true,
            created_at: chrono::Utc::now(),
        },
        product_size::Model {
            id: size_id,
            product_id,
            size_value: format!("Size {size_id}"),
            stock,
            sku: format!("SKU-{size_id}"),
        },
    )
}

/// Emitter that keeps every receipt it is given.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    receipts: Mutex<Vec<Receipt>>,
}

impl RecordingEmitter {
    /// Receipts emitted so far, oldest first.
    #[allow(clippy::unwrap_used)]
    pub fn receipts(&self) -> Vec<Receipt> {
        self.receipts.lock().unwrap().clone()
    }
}

impl ReceiptEmitter for RecordingEmitter {
    #[allow(clippy::unwrap_used)]
    fn emit(&self, receipt: &Receipt) -> Result<()> {
        self.receipts.lock().unwrap().push(receipt.clone());
        Ok(())
    }
}

/// Emitter whose printer is always jammed.
#[derive(Debug, Default)]
pub struct FailingEmitter;

impl ReceiptEmitter for FailingEmitter {
    fn emit(&self, _receipt: &Receipt) -> Result<()> {
        Err(Error::Receipt {
            message: "printer offline".to_string(),
        })
    }
}
