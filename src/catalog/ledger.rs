use tracing::{debug, warn};

use super::Product;
use crate::error::OrderError;
use crate::model::ModelStore;
use crate::transaction::Transaction;

/// Per-product stock adjustments, staged inside a [`Transaction`].
///
/// Nothing here touches the store directly: a decrement or restore only lands
/// when the surrounding transaction commits, and a concurrent change to the same
/// product makes that commit fail instead of overselling.
pub struct StockLedger;

impl StockLedger {
    /// Take `quantity` units out of stock.
    ///
    /// Returns the product as it will look after the commit.
    pub fn decrement<S: ModelStore>(
        tx: &mut Transaction<'_, S>,
        product_id: &str,
        quantity: u32,
    ) -> Result<Product, OrderError> {
        let mut product = tx
            .get::<Product>(product_id)?
            .ok_or_else(|| OrderError::ProductNotFound(product_id.to_string()))?;

        if !product.is_active {
            return Err(OrderError::ProductInactive(product_id.to_string()));
        }

        let available = product.stock;
        product.stock =
            available
                .checked_sub(quantity)
                .ok_or_else(|| OrderError::InsufficientStock {
                    product_id: product_id.to_string(),
                    requested: quantity,
                    available,
                })?;

        tx.put(&product)?;
        debug!(product_id, quantity, remaining = product.stock, "stock decrement staged");
        Ok(product)
    }

    /// Put `quantity` units back. Not idempotent: callers guard against repeats.
    ///
    /// Products that no longer exist are skipped with a warning; inactive products
    /// are still restocked.
    pub fn restore<S: ModelStore>(
        tx: &mut Transaction<'_, S>,
        product_id: &str,
        quantity: u32,
    ) -> Result<Option<Product>, OrderError> {
        let Some(mut product) = tx.get::<Product>(product_id)? else {
            warn!(product_id, quantity, "cannot restore stock for missing product");
            return Ok(None);
        };

        product.stock = product.stock.checked_add(quantity).ok_or_else(|| {
            OrderError::Validation(format!("stock overflow restoring product {}", product_id))
        })?;

        tx.put(&product)?;
        debug!(product_id, quantity, stock = product.stock, "stock restore staged");
        Ok(Some(product))
    }
}
