//! Order record and line items.
//!
//! Each line item captures the unit price at the moment the order was
//! assembled. Later catalog price changes never retroactively alter an
//! order's total.

use super::status::OrderStatus;
use crate::types::{ClientId, OrderId, ProductId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single product line within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: ProductId,
    pub quantity: i64,
    /// Unit price captured at order creation
    pub price: Decimal,
}

impl OrderItem {
    /// Line subtotal (unit price times quantity)
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub client: ClientId,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Assemble a new pending order from priced line items.
    ///
    /// The total is the sum of the line subtotals.
    pub fn new(client: ClientId, items: Vec<OrderItem>) -> Self {
        let now = Utc::now();
        let total = Self::compute_total(&items);
        Order {
            id: OrderId::generate(),
            client,
            items,
            total,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of line subtotals
    pub fn compute_total(items: &[OrderItem]) -> Decimal {
        items.iter().map(|item| item.subtotal()).sum()
    }
}
