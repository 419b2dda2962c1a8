//! Product entity - A shoe model offered for sale.
//!
//! Price, name and category live here; stock is tracked per size in
//! [`super::product_size`]. Cart lines copy what they need from this row, so the
//! catalog can change without touching carts already in progress.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Court Runner")
    pub name: String,
    /// Optional marketing description
    pub description: Option<String>,
    /// Main category (e.g., "men", "women", "kids")
    pub category: String,
    /// Unit price in store currency
    pub price: f64,
    /// Optional colour label
    pub color: Option<String>,
    /// JSON array of image URLs, stored as text
    pub images: Option<String>,
    /// Inactive products are hidden from the register
    pub is_active: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
}

impl Model {
    /// First entry of the `images` JSON array, if any parses.
    #[must_use]
    pub fn first_image(&self) -> Option<String> {
        let raw = self.images.as_deref()?;
        serde_json::from_str::<Vec<String>>(raw)
            .ok()
            .and_then(|images| images.into_iter().next())
    }
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product has many sizes
    #[sea_orm(has_many = "super::product_size::Entity")]
    Sizes,
}

impl Related<super::product_size::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sizes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
