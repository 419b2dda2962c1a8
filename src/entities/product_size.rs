//! Product size entity - One sellable size of a product, with its own stock and SKU.
//!
//! `stock` never goes below zero: the only writer is the order transaction, which
//! guards its decrement with `stock >= quantity`. The SKU is what the barcode scanner
//! sends and is unique across the whole catalog.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product size database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_sizes")]
pub struct Model {
    /// Unique identifier for the size
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product this size belongs to
    pub product_id: i64,
    /// Human-readable label (e.g., "42", "UK 8")
    pub size_value: String,
    /// Units on hand
    pub stock: i32,
    /// Barcode / SKU string
    #[sea_orm(unique)]
    pub sku: String,
}

/// Defines relationships between `ProductSize` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each size belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
