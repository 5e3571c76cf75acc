//! Revenue and stock analytics.
//!
//! Cancelled orders never count toward revenue; deleted orders are simply
//! gone. Totals are sums of the frozen order totals, so catalog price
//! changes after the fact do not move historical revenue.

use chrono::{DateTime, TimeZone, Utc};
use erp_common::{ClientId, CoreError, CoreResult};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::store::SharedStore;

/// Revenue over a closed date range.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub total_revenue: Decimal,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Lifetime revenue of one client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRevenue {
    pub client_id: ClientId,
    pub client_revenue: Decimal,
}

/// Stock level of one product, for the stock report.
#[derive(Debug, Clone, Serialize)]
pub struct StockLine {
    pub name: String,
    pub stock: i64,
}

/// Read-side reporting over orders and the catalog.
#[derive(Clone)]
pub struct AnalyticsService {
    store: SharedStore,
}

impl AnalyticsService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Total revenue over [from, to], both ends optional.
    ///
    /// Defaults to the epoch and now respectively; an inverted range is a
    /// validation error.
    pub async fn revenue(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> CoreResult<RevenueReport> {
        let from = from.unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap());
        let to = to.unwrap_or_else(Utc::now);
        if from > to {
            return Err(CoreError::validation("'from' must not be after 'to'"));
        }

        let orders = self.store.orders_in_range_active(from, to).await?;
        let total_revenue = orders.iter().map(|o| o.total).sum();
        Ok(RevenueReport {
            total_revenue,
            from,
            to,
        })
    }

    /// Lifetime revenue of one client, cancelled orders excluded.
    pub async fn client_revenue(&self, client_id: ClientId) -> CoreResult<ClientRevenue> {
        self.store
            .client(client_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Client", client_id))?;
        let orders = self.store.client_orders_active(client_id).await?;
        Ok(ClientRevenue {
            client_id,
            client_revenue: orders.iter().map(|o| o.total).sum(),
        })
    }

    /// Name and stock of every product.
    pub async fn stock_report(&self) -> CoreResult<Vec<StockLine>> {
        let products = self.store.all_products().await?;
        Ok(products
            .into_iter()
            .map(|p| StockLine {
                name: p.name,
                stock: p.stock,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::StockLedger;
    use crate::orders::{OrderAssembler, OrderItemRequest, OrderLifecycle};
    use crate::store::{MemoryStore, Store};
    use erp_common::catalog::Product;
    use erp_common::clients::Client;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct Fixture {
        analytics: AnalyticsService,
        assembler: OrderAssembler,
        lifecycle: OrderLifecycle,
        client: ClientId,
        product: erp_common::ProductId,
    }

    async fn fixture() -> Fixture {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let ledger = StockLedger::new(store.clone());
        let client = store
            .insert_client(Client::new("Acme".into(), "ops@acme.test".into(), None, None))
            .await
            .unwrap();
        let product = store
            .insert_product(Product::new("Widget".into(), None, dec!(10.00), 100))
            .await
            .unwrap();
        Fixture {
            analytics: AnalyticsService::new(store.clone()),
            assembler: OrderAssembler::new(store.clone(), ledger.clone()),
            lifecycle: OrderLifecycle::new(store, ledger),
            client: client.id,
            product: product.id,
        }
    }

    #[tokio::test]
    async fn revenue_excludes_cancelled_orders() {
        let f = fixture().await;
        f.assembler
            .create(f.client, vec![OrderItemRequest { product: f.product, quantity: 2 }])
            .await
            .unwrap();
        let doomed = f
            .assembler
            .create(f.client, vec![OrderItemRequest { product: f.product, quantity: 5 }])
            .await
            .unwrap();
        f.lifecycle.cancel(doomed.id).await.unwrap();

        let report = f.analytics.revenue(None, None).await.unwrap();
        assert_eq!(report.total_revenue, dec!(20.00));
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let f = fixture().await;
        let now = Utc::now();
        let err = f
            .analytics
            .revenue(Some(now), Some(now - chrono::Duration::days(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn client_revenue_for_unknown_client_is_not_found() {
        let f = fixture().await;
        let err = f
            .analytics
            .client_revenue(ClientId::generate())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn client_revenue_sums_non_cancelled_orders() {
        let f = fixture().await;
        f.assembler
            .create(f.client, vec![OrderItemRequest { product: f.product, quantity: 3 }])
            .await
            .unwrap();
        let report = f.analytics.client_revenue(f.client).await.unwrap();
        assert_eq!(report.client_revenue, dec!(30.00));
    }

    #[tokio::test]
    async fn stock_report_lists_every_product() {
        let f = fixture().await;
        let lines = f.analytics.stock_report().await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "Widget");
        assert_eq!(lines[0].stock, 100);
    }
}
