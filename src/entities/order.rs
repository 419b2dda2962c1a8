//! Order entity - Header row of a completed sale.
//!
//! Orders are append-only. The register creates them with status `"completed"`;
//! the other status values belong to web orders and are only stored here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name given at the payment step (may be empty for walk-in customers)
    pub customer_name: String,
    /// Sum of all line totals at time of sale
    pub total: f64,
    /// One of `"processing"`, `"delivering"`, `"completed"`, `"cancelled"`
    pub status: String,
    /// When the order was committed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many items
    #[sea_orm(has_many = "super::order_item::Entity")]
    Items,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
