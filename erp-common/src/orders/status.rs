//! Order status lifecycle.
//!
//! Orders start at `Pending` and move through `Shipped` and `Delivered`.
//! `Cancelled` is reachable only while the order has not shipped; once
//! stock has left the warehouse the order can no longer be cancelled.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Lowercase wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the order may still be cancelled from this state.
    ///
    /// Shipped and delivered orders are final with respect to cancellation.
    pub fn is_cancelable(&self) -> bool {
        !matches!(self, OrderStatus::Shipped | OrderStatus::Delivered)
    }

    /// Whether this order counts toward revenue and purchase history
    pub fn counts_for_revenue(&self) -> bool {
        !matches!(self, OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(CoreError::InvalidStatus),
        }
    }
}
