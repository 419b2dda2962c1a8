//! Catalog business logic - Products, sizes and SKU lookups.
//!
//! The register only reads the catalog. Inserts exist for seeding from config.toml
//! and for tests; stock changes go through the order transaction instead.

use crate::{
    config::catalog::ProductConfig,
    entities::{Product, ProductSize, product, product_size},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{error, info, instrument, warn};

/// Fields needed to create a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Display name
    pub name: String,
    /// Main category
    pub category: String,
    /// Unit price
    pub price: f64,
    /// Optional colour label
    pub color: Option<String>,
    /// Optional description
    pub description: Option<String>,
    /// Image URLs, stored as a JSON array
    pub images: Vec<String>,
}

impl NewProduct {
    /// A product with only the required fields set.
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price,
            color: None,
            description: None,
            images: Vec::new(),
        }
    }
}

impl From<&ProductConfig> for NewProduct {
    fn from(config: &ProductConfig) -> Self {
        Self {
            name: config.name.clone(),
            category: config.category.clone(),
            price: config.price,
            color: config.color.clone(),
            description: config.description.clone(),
            images: config.images.clone(),
        }
    }
}

/// A size whose stock is at or below the reporting threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowStock {
    /// Name of the owning product
    pub product_name: String,
    /// The size row
    pub size: product_size::Model,
}

/// Retrieves all active products, ordered alphabetically by name.
pub async fn get_active_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::IsActive.eq(true))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Active products whose name contains `text`, ignoring case.
///
/// Blank input returns every active product.
pub async fn search_products(db: &DatabaseConnection, text: &str) -> Result<Vec<product::Model>> {
    let products = get_active_products(db).await?;
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(products);
    }

    Ok(products
        .into_iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect())
}

/// Retrieves a product by id, active or not.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a size by id.
pub async fn get_size_by_id(
    db: &DatabaseConnection,
    size_id: i64,
) -> Result<Option<product_size::Model>> {
    ProductSize::find_by_id(size_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All sizes of a product, in creation order.
pub async fn get_sizes_for_product(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Vec<product_size::Model>> {
    ProductSize::find()
        .filter(product_size::Column::ProductId.eq(product_id))
        .order_by_asc(product_size::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds the product and size behind a scanned SKU. The match is exact.
#[instrument(skip(db))]
pub async fn find_by_sku(
    db: &DatabaseConnection,
    sku: &str,
) -> Result<Option<(product::Model, product_size::Model)>> {
    let found = ProductSize::find()
        .filter(product_size::Column::Sku.eq(sku))
        .find_also_related(Product)
        .one(db)
        .await?;

    Ok(found.and_then(|(size, product)| product.map(|p| (p, size))))
}

/// Sizes of active products with `stock <= threshold`, lowest stock first.
///
/// Inactive products cannot be sold at the register, so their sizes are left out.
pub async fn get_low_stock_sizes(db: &DatabaseConnection, threshold: i32) -> Result<Vec<LowStock>> {
    let rows = ProductSize::find()
        .filter(product_size::Column::Stock.lte(threshold))
        .order_by_asc(product_size::Column::Stock)
        .order_by_asc(product_size::Column::Id)
        .find_also_related(Product)
        .filter(product::Column::IsActive.eq(true))
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(size, product)| LowStock {
            product_name: product.map(|p| p.name).unwrap_or_default(),
            size,
        })
        .collect())
}

/// Creates an active product, performing input validation.
///
/// # Errors
/// Returns an error if:
/// - The name or category is empty or whitespace-only
/// - The price is negative or not finite (NaN, infinity)
/// - The database insert operation fails
pub async fn create_product<C>(db: &C, new: NewProduct) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    if new.name.trim().is_empty() {
        return Err(Error::Config {
            message: "Product name cannot be empty".to_string(),
        });
    }
    if new.category.trim().is_empty() {
        return Err(Error::Config {
            message: "Product category cannot be empty".to_string(),
        });
    }
    if !new.price.is_finite() || new.price < 0.0 {
        return Err(Error::InvalidAmount { amount: new.price });
    }

    let images = if new.images.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&new.images).map_err(|e| Error::Config {
            message: format!("Invalid image list: {e}"),
        })?)
    };

    let product = product::ActiveModel {
        name: Set(new.name.trim().to_string()),
        category: Set(new.category.trim().to_string()),
        price: Set(new.price),
        color: Set(new.color),
        description: Set(new.description),
        images: Set(images),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Shows or hides a product at the register.
pub async fn set_product_active(
    db: &DatabaseConnection,
    product_id: i64,
    is_active: bool,
) -> Result<product::Model> {
    let mut product: product::ActiveModel = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { product_id })?
        .into();

    product.is_active = Set(is_active);
    product.update(db).await.map_err(Into::into)
}

/// Adds a size with opening stock to an existing product.
///
/// # Errors
/// Returns an error if:
/// - The product does not exist
/// - The size label or SKU is empty
/// - The stock is negative
/// - The SKU is already assigned to another size
pub async fn add_product_size<C>(
    db: &C,
    product_id: i64,
    size_value: &str,
    stock: i32,
    sku: &str,
) -> Result<product_size::Model>
where
    C: ConnectionTrait,
{
    if size_value.trim().is_empty() {
        return Err(Error::Config {
            message: "Size label cannot be empty".to_string(),
        });
    }
    if sku.trim().is_empty() {
        return Err(Error::Config {
            message: "SKU cannot be empty".to_string(),
        });
    }
    if stock < 0 {
        return Err(Error::InvalidQuantity { quantity: stock });
    }

    get_product_by_id(db, product_id)
        .await?
        .ok_or(Error::ProductNotFound { product_id })?;

    let sku = sku.trim();
    let taken = ProductSize::find()
        .filter(product_size::Column::Sku.eq(sku))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(Error::DuplicateSku {
            sku: sku.to_string(),
        });
    }

    let size = product_size::ActiveModel {
        product_id: Set(product_id),
        size_value: Set(size_value.trim().to_string()),
        stock: Set(stock),
        sku: Set(sku.to_string()),
        ..Default::default()
    };
    size.insert(db).await.map_err(Into::into)
}

/// Inserts configured products that are not in the database yet.
///
/// Products are matched by name; an existing product is left alone, sizes included.
/// Each product is written together with its sizes in one transaction, so a size
/// that fails validation leaves no trace of its product and the next start can
/// seed it again once config.toml is fixed. Returns how many products were created.
#[instrument(skip_all, fields(configured = products.len()))]
pub async fn seed_catalog(db: &DatabaseConnection, products: &[ProductConfig]) -> Result<usize> {
    let mut created = 0;
    for config in products {
        let exists = Product::find()
            .filter(product::Column::Name.eq(config.name.trim()))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let txn = db.begin().await?;
        match seed_product(&txn, config).await {
            Ok(product) => {
                txn.commit().await?;
                info!(
                    "Seeded product '{}' with {} sizes",
                    product.name,
                    config.sizes.len()
                );
                created += 1;
            }
            Err(e) => {
                warn!("Not seeding product '{}': {}", config.name, e);
                if let Err(rollback_err) = txn.rollback().await {
                    error!("Rollback failed: {}", rollback_err);
                }
                return Err(e);
            }
        }
    }
    Ok(created)
}

async fn seed_product<C>(db: &C, config: &ProductConfig) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let product = create_product(db, NewProduct::from(config)).await?;
    for size in &config.sizes {
        add_product_size(db, product.id, &size.size, size.stock, &size.sku).await?;
    }
    Ok(product)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::config::catalog::SizeConfig;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_product(&db, NewProduct::new("  ", "men", 10.0)).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        let result = create_product(&db, NewProduct::new("Runner", "", 10.0)).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        let result = create_product(&db, NewProduct::new("Runner", "men", -1.0)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: -1.0 }
        ));

        let result = create_product(&db, NewProduct::new("Runner", "men", f64::NAN)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_stores_images_as_json() -> Result<()> {
        let db = setup_test_db().await?;
        let mut new = NewProduct::new("Court Runner", "men", 2500.0);
        new.images = vec!["front.png".to_string(), "side.png".to_string()];

        let product = create_product(&db, new).await?;
        assert!(product.is_active);
        assert_eq!(product.first_image(), Some("front.png".to_string()));

        Ok(())
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_skips_inactive() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Court Runner", 2500.0).await?;
        create_test_product(&db, "Trail Runner", 3000.0).await?;
        let sandal = create_test_product(&db, "Beach Sandal", 900.0).await?;
        let hidden = create_test_product(&db, "Runner Prototype", 100.0).await?;
        set_product_active(&db, hidden.id, false).await?;

        let found = search_products(&db, "RUNNER").await?;
        let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Court Runner", "Trail Runner"]);

        let all = search_products(&db, "   ").await?;
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, sandal.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_find_by_sku() -> Result<()> {
        let (db, product, size) = setup_with_stocked_size(5).await?;

        let (found_product, found_size) = find_by_sku(&db, &size.sku).await?.unwrap();
        assert_eq!(found_product.id, product.id);
        assert_eq!(found_size, size);

        assert!(find_by_sku(&db, "NO-SUCH-SKU").await?.is_none());
        // Exact match only
        assert!(find_by_sku(&db, &size.sku.to_lowercase()).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_add_product_size_validation() -> Result<()> {
        let (db, product, size) = setup_with_stocked_size(5).await?;

        let result = add_product_size(&db, product.id, "43", 1, &size.sku).await;
        assert!(matches!(result.unwrap_err(), Error::DuplicateSku { sku: _ }));

        let result = add_product_size(&db, product.id, "43", -1, "CR-43").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity: -1 }
        ));

        let result = add_product_size(&db, 9999, "43", 1, "CR-43").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ProductNotFound { product_id: 9999 }
        ));

        let result = add_product_size(&db, product.id, "", 1, "CR-43").await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_sizes_and_low_stock() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "Court Runner", 2500.0).await?;
        let s42 = add_product_size(&db, product.id, "42", 8, "CR-42").await?;
        let s43 = add_product_size(&db, product.id, "43", 1, "CR-43").await?;
        let s44 = add_product_size(&db, product.id, "44", 5, "CR-44").await?;

        let sizes = get_sizes_for_product(&db, product.id).await?;
        assert_eq!(sizes, vec![s42, s43.clone(), s44.clone()]);

        let low = get_low_stock_sizes(&db, 5).await?;
        assert_eq!(low.len(), 2);
        assert_eq!(low[0].size, s43);
        assert_eq!(low[1].size, s44);
        assert_eq!(low[0].product_name, "Court Runner");

        // Sizes of hidden products are not reported
        set_product_active(&db, product.id, false).await?;
        assert!(get_low_stock_sizes(&db, 5).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let products = vec![ProductConfig {
            name: "Court Runner".to_string(),
            category: "men".to_string(),
            price: 2500.0,
            color: Some("white".to_string()),
            description: None,
            images: Vec::new(),
            sizes: vec![
                SizeConfig {
                    size: "42".to_string(),
                    stock: 5,
                    sku: "CR-WHT-42".to_string(),
                },
                SizeConfig {
                    size: "43".to_string(),
                    stock: 3,
                    sku: "CR-WHT-43".to_string(),
                },
            ],
        }];

        assert_eq!(seed_catalog(&db, &products).await?, 1);
        assert_eq!(seed_catalog(&db, &products).await?, 0);

        let active = get_active_products(&db).await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].color.as_deref(), Some("white"));
        assert_eq!(get_sizes_for_product(&db, active[0].id).await?.len(), 2);

        Ok(())
    }

    fn product_config(name: &str, skus: &[&str]) -> ProductConfig {
        ProductConfig {
            name: name.to_string(),
            category: "men".to_string(),
            price: 1000.0,
            color: None,
            description: None,
            images: Vec::new(),
            sizes: skus
                .iter()
                .enumerate()
                .map(|(i, sku)| SizeConfig {
                    size: format!("{}", 40 + i),
                    stock: 2,
                    sku: (*sku).to_string(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_seed_failure_leaves_no_partial_product() -> Result<()> {
        let db = setup_test_db().await?;
        seed_catalog(&db, &[product_config("One", &["ONE-A", "DUP-1"])]).await?;

        let products = vec![
            product_config("One", &["ONE-A", "DUP-1"]),
            product_config("Two", &["TWO-A", "DUP-1"]),
        ];
        let result = seed_catalog(&db, &products).await;
        assert!(matches!(result.unwrap_err(), Error::DuplicateSku { sku: _ }));

        let names: Vec<_> = get_active_products(&db)
            .await?
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["One"]);
        assert!(find_by_sku(&db, "TWO-A").await?.is_none());

        // Once the config is fixed the product seeds in full
        let fixed = vec![
            product_config("One", &["ONE-A", "DUP-1"]),
            product_config("Two", &["TWO-A", "TWO-B"]),
        ];
        assert_eq!(seed_catalog(&db, &fixed).await?, 1);
        let (two, _) = find_by_sku(&db, "TWO-B").await?.unwrap();
        assert_eq!(get_sizes_for_product(&db, two.id).await?.len(), 2);

        Ok(())
    }
}
