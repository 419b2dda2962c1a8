//! Order item entity - Price and quantity snapshot of one cart line at time of sale.
//!
//! `product_id` and `size_id` are plain columns without foreign keys to the catalog.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order this item belongs to
    pub order_id: i64,
    /// Product sold
    pub product_id: i64,
    /// Size sold
    pub size_id: i64,
    /// Product name at time of sale
    pub product_name: String,
    /// Size label at time of sale
    pub size_value: String,
    /// Unit price at time of sale
    pub price: f64,
    /// Units sold
    pub quantity: i32,
    /// `price * quantity`
    pub line_total: f64,
}

/// Defines relationships between `OrderItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
