//! Storage abstraction over the ERP entities.
//!
//! Two implementations exist: [`PgStore`] for production and
//! [`MemoryStore`] for tests and local development. All cross-entity
//! orchestration lives in the service layer; the store only answers for
//! single-entity reads and writes, plus the guarded stock adjustment that
//! must be atomic per product.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use erp_common::catalog::Product;
use erp_common::clients::Client;
use erp_common::orders::{Order, OrderStatus};
use erp_common::users::User;
use erp_common::{ClientId, CoreResult, OrderId, ProductId, UserId};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Shared handle to a store implementation.
pub type SharedStore = Arc<dyn Store>;

/// Outcome of a guarded stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockChange {
    /// Adjustment applied; holds the resulting stock level
    Applied(i64),
    /// Decrement refused, stock below the requested quantity
    Insufficient { available: i64 },
    /// Product does not exist
    Missing,
}

/// Outcome of a guarded cancel transition.
#[derive(Debug, Clone)]
pub enum CancelOutcome {
    /// Order flipped to cancelled; holds the updated order
    Cancelled(Order),
    /// Order has shipped or been delivered, transition refused
    NotCancelable(OrderStatus),
    /// Order does not exist
    Missing,
}

/// Catalog listing filters.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring match on the name
    pub name: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_stock: Option<i64>,
    /// Sort field: name, price or stock; creation time when absent
    pub sort: Option<ProductSort>,
}

/// Sort field for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    Name,
    Price,
    Stock,
}

/// One page of a listing request.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

/// A page of results plus the total row count.
#[derive(Debug, Clone)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> PageResult<T> {
    /// Number of pages needed for `total` at the page size
    pub fn total_pages(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            (self.total + self.limit - 1) / self.limit
        }
    }
}

/// Persistence operations for the ERP entities.
#[async_trait]
pub trait Store: Send + Sync {
    // --- products ---

    async fn insert_product(&self, product: Product) -> CoreResult<Product>;
    async fn product(&self, id: ProductId) -> CoreResult<Option<Product>>;
    async fn product_by_name(&self, name: &str) -> CoreResult<Option<Product>>;
    async fn products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> CoreResult<PageResult<Product>>;
    /// Every product, for the stock report
    async fn all_products(&self) -> CoreResult<Vec<Product>>;
    /// Full-row replace keyed on the product id
    async fn update_product(&self, product: Product) -> CoreResult<Option<Product>>;
    async fn delete_product(&self, id: ProductId) -> CoreResult<bool>;
    /// Adjust stock by `delta`. Negative deltas are guarded: the write only
    /// lands when the current stock covers it.
    async fn adjust_stock(&self, id: ProductId, delta: i64) -> CoreResult<StockChange>;

    // --- clients ---

    async fn insert_client(&self, client: Client) -> CoreResult<Client>;
    async fn client(&self, id: ClientId) -> CoreResult<Option<Client>>;
    async fn client_by_email(&self, email: &str) -> CoreResult<Option<Client>>;
    async fn active_clients(&self) -> CoreResult<Vec<Client>>;
    async fn update_client(&self, client: Client) -> CoreResult<Option<Client>>;
    /// Append an order id to the purchase history. Not idempotent.
    async fn append_history(&self, client: ClientId, order: OrderId) -> CoreResult<bool>;
    /// Remove every occurrence of an order id from the purchase history.
    async fn remove_history(&self, client: ClientId, order: OrderId) -> CoreResult<bool>;

    // --- orders ---

    async fn insert_order(&self, order: Order) -> CoreResult<Order>;
    async fn order(&self, id: OrderId) -> CoreResult<Option<Order>>;
    /// Orders newest-first, paginated
    async fn orders(&self, page: PageRequest) -> CoreResult<PageResult<Order>>;
    /// A client's non-cancelled orders, oldest first
    async fn client_orders_active(&self, client: ClientId) -> CoreResult<Vec<Order>>;
    /// Non-cancelled orders created within [from, to]
    async fn orders_in_range_active(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> CoreResult<Vec<Order>>;
    /// Unconditional status overwrite
    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> CoreResult<Option<Order>>;
    /// Flip to cancelled only while the order has not shipped
    async fn cancel_order(&self, id: OrderId) -> CoreResult<CancelOutcome>;
    async fn delete_order(&self, id: OrderId) -> CoreResult<bool>;

    // --- users ---

    async fn insert_user(&self, user: User) -> CoreResult<User>;
    async fn user(&self, id: UserId) -> CoreResult<Option<User>>;
    async fn user_by_email(&self, email: &str) -> CoreResult<Option<User>>;
    async fn update_user(&self, user: User) -> CoreResult<Option<User>>;
    async fn users(&self) -> CoreResult<Vec<User>>;
    async fn any_admin(&self) -> CoreResult<bool>;
}
