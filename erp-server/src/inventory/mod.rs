//! Stock ledger over the product table.
//!
//! All stock movement goes through here. `commit` is the only decrement
//! path and rides on the store's guarded adjustment, so two racing orders
//! cannot take the same units.

use erp_common::{CoreError, CoreResult, ProductId};
use tracing::debug;

use crate::store::{SharedStore, StockChange};

/// Read and adjust product stock levels.
#[derive(Clone)]
pub struct StockLedger {
    store: SharedStore,
}

impl StockLedger {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Check that `qty` units could be taken right now.
    ///
    /// Read-only; returns the stock level that a commit would leave behind.
    /// The answer can go stale before a commit, which is why `commit` guards
    /// again.
    pub async fn reserve(&self, id: ProductId, qty: i64) -> CoreResult<i64> {
        let available = self.read(id).await?;
        if qty > available {
            return Err(CoreError::InsufficientStock {
                product: id.to_string(),
                requested: qty,
                available,
            });
        }
        Ok(available - qty)
    }

    /// Take `qty` units. Refused when the current stock no longer covers it.
    pub async fn commit(&self, id: ProductId, qty: i64) -> CoreResult<i64> {
        match self.store.adjust_stock(id, -qty).await? {
            StockChange::Applied(remaining) => {
                debug!(product = %id, qty, remaining, "stock committed");
                Ok(remaining)
            }
            StockChange::Insufficient { available } => Err(CoreError::InsufficientStock {
                product: id.to_string(),
                requested: qty,
                available,
            }),
            StockChange::Missing => Err(CoreError::not_found("Product", id)),
        }
    }

    /// Return `qty` units, no upper bound.
    pub async fn release(&self, id: ProductId, qty: i64) -> CoreResult<i64> {
        match self.store.adjust_stock(id, qty).await? {
            StockChange::Applied(remaining) => {
                debug!(product = %id, qty, remaining, "stock released");
                Ok(remaining)
            }
            // positive deltas never trip the guard
            StockChange::Insufficient { available } => Ok(available),
            StockChange::Missing => Err(CoreError::not_found("Product", id)),
        }
    }

    /// Current stock level.
    pub async fn read(&self, id: ProductId) -> CoreResult<i64> {
        let product = self
            .store
            .product(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", id))?;
        Ok(product.stock)
    }
}
