//! Stock lookup and reservation.
//!
//! Reads always hit the database so the register sees the latest committed stock.
//! The only write is [`reserve_stock`], which runs inside the order transaction.

use crate::{
    entities::{ProductSize, product_size},
    errors::{Error, Result},
};
use sea_orm::{prelude::*, sea_query::Expr};
use tracing::{debug, instrument, warn};

/// Returns the units on hand for a product size, or 0 when no such row exists.
///
/// The size must belong to the given product; a size id paired with the wrong
/// product reads as "no stock known" rather than an error.
#[instrument(skip(db))]
pub async fn available_stock<C>(db: &C, product_id: i64, size_id: i64) -> Result<i32>
where
    C: ConnectionTrait,
{
    let size = ProductSize::find_by_id(size_id)
        .filter(product_size::Column::ProductId.eq(product_id))
        .one(db)
        .await?;

    let stock = size.map_or(0, |s| s.stock.max(0));
    debug!(stock, "Available stock read");
    Ok(stock)
}

/// Takes `quantity` units out of a size's stock.
///
/// The update is a single statement,
/// `UPDATE product_sizes SET stock = stock - ? WHERE id = ? AND stock >= ?`,
/// so two terminals selling the last pair cannot both succeed. When no row is
/// affected the size is re-read to tell a lost race ([`Error::InsufficientStock`])
/// from a size that no longer exists ([`Error::StockUpdateFailed`]).
///
/// Meant to be called with an open transaction; the caller rolls back on error.
#[instrument(skip(db))]
pub async fn reserve_stock<C>(db: &C, product_id: i64, size_id: i64, quantity: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = ProductSize::update_many()
        .col_expr(
            product_size::Column::Stock,
            Expr::col(product_size::Column::Stock).sub(quantity),
        )
        .filter(product_size::Column::Id.eq(size_id))
        .filter(product_size::Column::Stock.gte(quantity))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        let current = ProductSize::find_by_id(size_id).one(db).await?;
        warn!(found = current.is_some(), "Stock decrement matched no row");
        return Err(current.map_or(Error::StockUpdateFailed { size_id }, |size| {
            Error::InsufficientStock {
                product_id,
                size_id,
                requested: quantity,
                remaining: size.stock.max(0),
            }
        }));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_available_stock_reads_current_value() -> Result<()> {
        let (db, product, size) = setup_with_stocked_size(5).await?;

        assert_eq!(available_stock(&db, product.id, size.id).await?, 5);

        Ok(())
    }

    #[tokio::test]
    async fn test_available_stock_missing_row_is_zero() -> Result<()> {
        let (db, product, size) = setup_with_stocked_size(5).await?;

        // Unknown size
        assert_eq!(available_stock(&db, product.id, 9999).await?, 0);
        // Known size, wrong product
        assert_eq!(available_stock(&db, product.id + 1, size.id).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_reserve_stock_decrements() -> Result<()> {
        let (db, product, size) = setup_with_stocked_size(5).await?;

        reserve_stock(&db, product.id, size.id, 2).await?;
        assert_eq!(available_stock(&db, product.id, size.id).await?, 3);

        reserve_stock(&db, product.id, size.id, 3).await?;
        assert_eq!(available_stock(&db, product.id, size.id).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_reserve_stock_never_goes_negative() -> Result<()> {
        let (db, product, size) = setup_with_stocked_size(2).await?;

        let result = reserve_stock(&db, product.id, size.id, 3).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientStock {
                requested: 3,
                remaining: 2,
                ..
            }
        ));
        assert_eq!(available_stock(&db, product.id, size.id).await?, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_reserve_stock_missing_size() -> Result<()> {
        let (db, product, _size) = setup_with_stocked_size(2).await?;

        let result = reserve_stock(&db, product.id, 9999, 1).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::StockUpdateFailed { size_id: 9999 }
        ));

        Ok(())
    }
}
