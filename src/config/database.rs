//! Database configuration module.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables are
//! generated from the entity definitions with `Schema::create_table_from_entity`, so
//! the schema always matches the Rust structs. The connection is created once in
//! `main` and handed to everything that needs it; nothing here is global.

use crate::entities::{Order, OrderItem, Product, ProductSize};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info, instrument};

/// Fallback used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://shoemart.sqlite?mode=rwc";

/// Gets the database URL from the environment or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Opens a connection to the given database URL.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates the catalog and order tables if they do not exist yet.
///
/// Tables are created parent first so the foreign keys from `product_sizes` and
/// `order_items` resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut product_table = schema.create_table_from_entity(Product);
    let mut size_table = schema.create_table_from_entity(ProductSize);
    let mut order_table = schema.create_table_from_entity(Order);
    let mut item_table = schema.create_table_from_entity(OrderItem);

    for table in [
        &mut product_table,
        &mut size_table,
        &mut order_table,
        &mut item_table,
    ] {
        table.if_not_exists();
        db.execute(builder.build(&*table)).await?;
    }

    info!("Database tables ensured");
    Ok(())
}
