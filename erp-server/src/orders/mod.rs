//! Order services: assembly of new orders and lifecycle transitions.

pub mod assembler;
pub mod lifecycle;

pub use assembler::{OrderAssembler, OrderItemRequest};
pub use lifecycle::OrderLifecycle;

use erp_common::catalog::Product;
use erp_common::orders::{Order, OrderStatus};
use erp_common::{ClientId, CoreResult, OrderId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::store::SharedStore;

/// An order line with the product record attached.
///
/// `product` is `None` when the product has since been deleted from the
/// catalog; the captured price and quantity still stand.
#[derive(Debug, Clone, Serialize)]
pub struct PopulatedItem {
    pub product: Option<Product>,
    pub quantity: i64,
    pub price: Decimal,
}

/// An order with its line items populated with product details.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedOrder {
    pub id: OrderId,
    pub client: ClientId,
    pub items: Vec<PopulatedItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attach product records to an order's line items.
pub async fn populate(store: &SharedStore, order: Order) -> CoreResult<PopulatedOrder> {
    let mut items = Vec::with_capacity(order.items.len());
    for item in order.items {
        let product = store.product(item.product).await?;
        items.push(PopulatedItem {
            product,
            quantity: item.quantity,
            price: item.price,
        });
    }
    Ok(PopulatedOrder {
        id: order.id,
        client: order.client,
        items,
        total: order.total,
        status: order.status,
        created_at: order.created_at,
        updated_at: order.updated_at,
    })
}
