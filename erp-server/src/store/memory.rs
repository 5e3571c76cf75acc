//! In-memory store backed by `tokio::sync::RwLock`.
//!
//! Used by the test suites and for local development without Postgres.
//! Entities live in insertion-ordered vectors behind a single lock, so the
//! guarded operations (stock adjustment, cancel transition) are atomic by
//! construction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use erp_common::catalog::Product;
use erp_common::clients::Client;
use erp_common::orders::{Order, OrderStatus};
use erp_common::users::{Role, User};
use erp_common::{ClientId, CoreResult, OrderId, ProductId, UserId};
use tokio::sync::RwLock;

use super::{
    CancelOutcome, PageRequest, PageResult, ProductFilter, ProductSort, StockChange, Store,
};

#[derive(Default)]
struct Inner {
    products: Vec<Product>,
    clients: Vec<Client>,
    orders: Vec<Order>,
    users: Vec<User>,
}

/// In-memory implementation of [`Store`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(product: &Product, filter: &ProductFilter) -> bool {
    if let Some(name) = &filter.name {
        if !product.name.to_lowercase().contains(&name.to_lowercase()) {
            return false;
        }
    }
    if let Some(min) = filter.min_price {
        if product.price < min {
            return false;
        }
    }
    if let Some(max) = filter.max_price {
        if product.price > max {
            return false;
        }
    }
    if let Some(min) = filter.min_stock {
        if product.stock < min {
            return false;
        }
    }
    true
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_product(&self, product: Product) -> CoreResult<Product> {
        let mut inner = self.inner.write().await;
        inner.products.push(product.clone());
        Ok(product)
    }

    async fn product(&self, id: ProductId) -> CoreResult<Option<Product>> {
        let inner = self.inner.read().await;
        Ok(inner.products.iter().find(|p| p.id == id).cloned())
    }

    async fn product_by_name(&self, name: &str) -> CoreResult<Option<Product>> {
        let inner = self.inner.read().await;
        Ok(inner.products.iter().find(|p| p.name == name).cloned())
    }

    async fn products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> CoreResult<PageResult<Product>> {
        let inner = self.inner.read().await;
        let mut matched: Vec<Product> = inner
            .products
            .iter()
            .filter(|p| matches_filter(p, filter))
            .cloned()
            .collect();
        match filter.sort {
            Some(ProductSort::Name) => matched.sort_by(|a, b| a.name.cmp(&b.name)),
            Some(ProductSort::Price) => matched.sort_by(|a, b| a.price.cmp(&b.price)),
            Some(ProductSort::Stock) => matched.sort_by(|a, b| a.stock.cmp(&b.stock)),
            None => {}
        }
        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok(PageResult {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn all_products(&self) -> CoreResult<Vec<Product>> {
        let inner = self.inner.read().await;
        Ok(inner.products.clone())
    }

    async fn update_product(&self, product: Product) -> CoreResult<Option<Product>> {
        let mut inner = self.inner.write().await;
        match inner.products.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => {
                *slot = product.clone();
                Ok(Some(product))
            }
            None => Ok(None),
        }
    }

    async fn delete_product(&self, id: ProductId) -> CoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.products.len();
        inner.products.retain(|p| p.id != id);
        Ok(inner.products.len() < before)
    }

    async fn adjust_stock(&self, id: ProductId, delta: i64) -> CoreResult<StockChange> {
        let mut inner = self.inner.write().await;
        let Some(product) = inner.products.iter_mut().find(|p| p.id == id) else {
            return Ok(StockChange::Missing);
        };
        if delta < 0 && product.stock < -delta {
            return Ok(StockChange::Insufficient {
                available: product.stock,
            });
        }
        product.stock += delta;
        product.updated_at = Utc::now();
        Ok(StockChange::Applied(product.stock))
    }

    async fn insert_client(&self, client: Client) -> CoreResult<Client> {
        let mut inner = self.inner.write().await;
        inner.clients.push(client.clone());
        Ok(client)
    }

    async fn client(&self, id: ClientId) -> CoreResult<Option<Client>> {
        let inner = self.inner.read().await;
        Ok(inner.clients.iter().find(|c| c.id == id).cloned())
    }

    async fn client_by_email(&self, email: &str) -> CoreResult<Option<Client>> {
        let inner = self.inner.read().await;
        Ok(inner.clients.iter().find(|c| c.email == email).cloned())
    }

    async fn active_clients(&self) -> CoreResult<Vec<Client>> {
        let inner = self.inner.read().await;
        Ok(inner
            .clients
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect())
    }

    async fn update_client(&self, client: Client) -> CoreResult<Option<Client>> {
        let mut inner = self.inner.write().await;
        match inner.clients.iter_mut().find(|c| c.id == client.id) {
            Some(slot) => {
                *slot = client.clone();
                Ok(Some(client))
            }
            None => Ok(None),
        }
    }

    async fn append_history(&self, client: ClientId, order: OrderId) -> CoreResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.clients.iter_mut().find(|c| c.id == client) {
            Some(c) => {
                c.purchase_history.push(order);
                c.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_history(&self, client: ClientId, order: OrderId) -> CoreResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.clients.iter_mut().find(|c| c.id == client) {
            Some(c) => {
                c.purchase_history.retain(|o| *o != order);
                c.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_order(&self, order: Order) -> CoreResult<Order> {
        let mut inner = self.inner.write().await;
        inner.orders.push(order.clone());
        Ok(order)
    }

    async fn order(&self, id: OrderId) -> CoreResult<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn orders(&self, page: PageRequest) -> CoreResult<PageResult<Order>> {
        let inner = self.inner.read().await;
        let total = inner.orders.len() as u64;
        let items = inner
            .orders
            .iter()
            .rev()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok(PageResult {
            items,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn client_orders_active(&self, client: ClientId) -> CoreResult<Vec<Order>> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .iter()
            .filter(|o| o.client == client && o.status.counts_for_revenue())
            .cloned()
            .collect())
    }

    async fn orders_in_range_active(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> CoreResult<Vec<Order>> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .iter()
            .filter(|o| {
                o.status.counts_for_revenue() && o.created_at >= from && o.created_at <= to
            })
            .cloned()
            .collect())
    }

    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> CoreResult<Option<Order>> {
        let mut inner = self.inner.write().await;
        match inner.orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.status = status;
                order.updated_at = Utc::now();
                Ok(Some(order.clone()))
            }
            None => Ok(None),
        }
    }

    async fn cancel_order(&self, id: OrderId) -> CoreResult<CancelOutcome> {
        let mut inner = self.inner.write().await;
        let Some(order) = inner.orders.iter_mut().find(|o| o.id == id) else {
            return Ok(CancelOutcome::Missing);
        };
        if !order.status.is_cancelable() {
            return Ok(CancelOutcome::NotCancelable(order.status));
        }
        order.status = OrderStatus::Cancelled;
        order.updated_at = Utc::now();
        Ok(CancelOutcome::Cancelled(order.clone()))
    }

    async fn delete_order(&self, id: OrderId) -> CoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.orders.len();
        inner.orders.retain(|o| o.id != id);
        Ok(inner.orders.len() < before)
    }

    async fn insert_user(&self, user: User) -> CoreResult<User> {
        let mut inner = self.inner.write().await;
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn user(&self, id: UserId) -> CoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, user: User) -> CoreResult<Option<User>> {
        let mut inner = self.inner.write().await;
        match inner.users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn users(&self) -> CoreResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.clone())
    }

    async fn any_admin(&self) -> CoreResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().any(|u| u.role == Role::Admin))
    }
}
