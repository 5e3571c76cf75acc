//! Order assembly.
//!
//! `create` validates every line against the live catalog before any write.
//! Stock is then taken through the guarded ledger commit; a guard refusal on
//! a later line rolls back the lines already taken, so a failed order leaves
//! stock untouched and nothing persisted.

use erp_common::orders::{Order, OrderItem};
use erp_common::validation::require_positive_quantity;
use erp_common::{ClientId, CoreError, CoreResult, ProductId};
use serde::Deserialize;
use tracing::{info, warn};

use crate::inventory::StockLedger;
use crate::store::SharedStore;

/// One requested order line.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemRequest {
    pub product: ProductId,
    pub quantity: i64,
}

/// Builds new orders against the catalog and stock ledger.
#[derive(Clone)]
pub struct OrderAssembler {
    store: SharedStore,
    ledger: StockLedger,
}

impl OrderAssembler {
    pub fn new(store: SharedStore, ledger: StockLedger) -> Self {
        Self { store, ledger }
    }

    /// Assemble and persist a pending order.
    ///
    /// Line items are checked in input order; the first failing line aborts
    /// the whole request with no side effects. Unit prices are captured from
    /// the catalog at this moment and frozen into the order.
    pub async fn create(
        &self,
        client_id: ClientId,
        items: Vec<OrderItemRequest>,
    ) -> CoreResult<Order> {
        if items.is_empty() {
            return Err(CoreError::validation("Order must contain at least one item"));
        }
        self.store
            .client(client_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Client", client_id))?;

        // Phase one: validate and price every line, no writes
        let mut priced = Vec::with_capacity(items.len());
        for item in &items {
            require_positive_quantity(item.quantity)?;
            let product = self
                .store
                .product(item.product)
                .await?
                .ok_or_else(|| CoreError::not_found("Product", item.product))?;
            self.ledger.reserve(item.product, item.quantity).await?;
            priced.push(OrderItem {
                product: product.id,
                quantity: item.quantity,
                price: product.price,
            });
        }

        // Phase two: take the stock. Another order may have won a race since
        // the reserve check, so a commit can still be refused; roll back the
        // lines already taken.
        let mut committed: Vec<&OrderItem> = Vec::with_capacity(priced.len());
        for item in &priced {
            if let Err(err) = self.ledger.commit(item.product, item.quantity).await {
                warn!(product = %item.product, "stock commit refused, rolling back");
                for done in committed {
                    self.ledger.release(done.product, done.quantity).await?;
                }
                return Err(err);
            }
            committed.push(item);
        }

        let order = Order::new(client_id, priced);
        let order = self.store.insert_order(order).await?;
        self.store.append_history(client_id, order.id).await?;

        info!(order = %order.id, client = %client_id, total = %order.total, "order created");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Store};
    use erp_common::catalog::Product;
    use erp_common::clients::Client;
    use erp_common::orders::OrderStatus;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct Fixture {
        store: SharedStore,
        assembler: OrderAssembler,
        client: ClientId,
    }

    async fn fixture() -> Fixture {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let client = store
            .insert_client(Client::new("Acme".into(), "ops@acme.test".into(), None, None))
            .await
            .unwrap();
        Fixture {
            assembler: OrderAssembler::new(store.clone(), StockLedger::new(store.clone())),
            store,
            client: client.id,
        }
    }

    async fn seed_product(f: &Fixture, name: &str, price: rust_decimal::Decimal, stock: i64) -> ProductId {
        f.store
            .insert_product(Product::new(name.into(), None, price, stock))
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn multi_item_order_captures_prices_and_decrements_stock() {
        let f = fixture().await;
        let widget = seed_product(&f, "Widget", dec!(10.00), 5).await;
        let gadget = seed_product(&f, "Gadget", dec!(2.50), 8).await;

        let order = f
            .assembler
            .create(
                f.client,
                vec![
                    OrderItemRequest { product: widget, quantity: 3 },
                    OrderItemRequest { product: gadget, quantity: 2 },
                ],
            )
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, dec!(35.00));
        assert_eq!(f.store.product(widget).await.unwrap().unwrap().stock, 2);
        assert_eq!(f.store.product(gadget).await.unwrap().unwrap().stock, 6);

        let client = f.store.client(f.client).await.unwrap().unwrap();
        assert_eq!(client.purchase_history, vec![order.id]);
    }

    #[tokio::test]
    async fn empty_order_is_rejected() {
        let f = fixture().await;
        let err = f.assembler.create(f.client, vec![]).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_client_is_not_found() {
        let f = fixture().await;
        let widget = seed_product(&f, "Widget", dec!(10.00), 5).await;
        let err = f
            .assembler
            .create(
                ClientId::generate(),
                vec![OrderItemRequest { product: widget, quantity: 1 }],
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn failing_line_leaves_no_side_effects() {
        let f = fixture().await;
        let widget = seed_product(&f, "Widget", dec!(10.00), 5).await;
        let scarce = seed_product(&f, "Scarce", dec!(99.00), 2).await;

        let err = f
            .assembler
            .create(
                f.client,
                vec![
                    OrderItemRequest { product: widget, quantity: 2 },
                    OrderItemRequest { product: scarce, quantity: 3 },
                ],
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                product: scarce.to_string(),
                requested: 3,
                available: 2,
            }
        );

        // nothing moved, nothing persisted
        assert_eq!(f.store.product(widget).await.unwrap().unwrap().stock, 5);
        assert_eq!(f.store.product(scarce).await.unwrap().unwrap().stock, 2);
        let client = f.store.client(f.client).await.unwrap().unwrap();
        assert!(client.purchase_history.is_empty());
    }

    #[tokio::test]
    async fn unknown_product_names_the_offending_id() {
        let f = fixture().await;
        let ghost = ProductId::generate();
        let err = f
            .assembler
            .create(f.client, vec![OrderItemRequest { product: ghost, quantity: 1 }])
            .await
            .unwrap_err();
        assert_eq!(err, CoreError::not_found("Product", ghost));
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let f = fixture().await;
        let widget = seed_product(&f, "Widget", dec!(10.00), 5).await;
        let err = f
            .assembler
            .create(f.client, vec![OrderItemRequest { product: widget, quantity: 0 }])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(f.store.product(widget).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn later_price_changes_do_not_alter_the_total() {
        let f = fixture().await;
        let widget = seed_product(&f, "Widget", dec!(10.00), 5).await;
        let order = f
            .assembler
            .create(f.client, vec![OrderItemRequest { product: widget, quantity: 1 }])
            .await
            .unwrap();

        let mut product = f.store.product(widget).await.unwrap().unwrap();
        product.price = dec!(50.00);
        f.store.update_product(product).await.unwrap();

        let stored = f.store.order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.total, dec!(10.00));
        assert_eq!(stored.items[0].price, dec!(10.00));
    }
}
