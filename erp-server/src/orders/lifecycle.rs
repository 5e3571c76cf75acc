//! Order lifecycle transitions.
//!
//! Status updates overwrite unconditionally within the recognized set.
//! Cancellation is the only transition with a guard: shipped and delivered
//! orders are final, and a successful cancel reconciles stock and the
//! client's purchase history. Deletion is a hard delete that reconciles
//! nothing.

use erp_common::orders::{Order, OrderStatus};
use erp_common::{CoreError, CoreResult, OrderId};
use tracing::info;

use crate::inventory::StockLedger;
use crate::store::{CancelOutcome, PageRequest, PageResult, SharedStore};

/// Drives orders through their status lifecycle.
#[derive(Clone)]
pub struct OrderLifecycle {
    store: SharedStore,
    ledger: StockLedger,
}

impl OrderLifecycle {
    pub fn new(store: SharedStore, ledger: StockLedger) -> Self {
        Self { store, ledger }
    }

    pub async fn get(&self, id: OrderId) -> CoreResult<Order> {
        self.store
            .order(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Order", id))
    }

    /// Orders newest-first, paginated.
    pub async fn list(&self, page: PageRequest) -> CoreResult<PageResult<Order>> {
        self.store.orders(page).await
    }

    /// Overwrite the status. Any of the four values is accepted from any
    /// current state; only unrecognized strings are refused.
    pub async fn update_status(&self, id: OrderId, status: &str) -> CoreResult<Order> {
        let status: OrderStatus = status.parse()?;
        let order = self
            .store
            .set_order_status(id, status)
            .await?
            .ok_or_else(|| CoreError::not_found("Order", id))?;
        info!(order = %id, status = %status, "order status updated");
        Ok(order)
    }

    /// Cancel an order that has not shipped.
    ///
    /// Releases the stock of every line item and removes the order from the
    /// client's purchase history.
    pub async fn cancel(&self, id: OrderId) -> CoreResult<Order> {
        let order = match self.store.cancel_order(id).await? {
            CancelOutcome::Cancelled(order) => order,
            CancelOutcome::NotCancelable(status) => {
                return Err(CoreError::InvalidTransition(format!(
                    "Cannot cancel an order that is already {status}"
                )));
            }
            CancelOutcome::Missing => return Err(CoreError::not_found("Order", id)),
        };

        for item in &order.items {
            // a product deleted since the order was placed has no stock to
            // restore
            match self.ledger.release(item.product, item.quantity).await {
                Ok(_) => {}
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err),
            }
        }
        self.store.remove_history(order.client, id).await?;

        info!(order = %id, client = %order.client, "order cancelled");
        Ok(order)
    }

    /// Hard delete. Stock and purchase history are left as they are.
    pub async fn delete(&self, id: OrderId) -> CoreResult<()> {
        if !self.store.delete_order(id).await? {
            return Err(CoreError::not_found("Order", id));
        }
        info!(order = %id, "order deleted");
        Ok(())
    }
}
