//! PostgreSQL store.
//!
//! Order line items are stored as a JSONB column and purchase history as a
//! `uuid[]` column, keeping one row per entity. The guarded stock decrement
//! is a single conditional UPDATE so racing orders cannot overdraw a
//! product.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use erp_common::catalog::Product;
use erp_common::clients::Client;
use erp_common::orders::{Order, OrderItem, OrderStatus};
use erp_common::users::User;
use erp_common::{ClientId, CoreError, CoreResult, OrderId, ProductId, UserId};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::{
    CancelOutcome, PageRequest, PageResult, ProductFilter, ProductSort, StockChange, Store,
};
use crate::config::DatabaseSettings;

/// PostgreSQL implementation of [`Store`].
pub struct PgStore {
    pool: PgPool,
}

fn db_err(err: sqlx::Error) -> CoreError {
    CoreError::storage(err.to_string())
}

impl PgStore {
    /// Create a store on an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool from settings
    pub async fn from_settings(settings: &DatabaseSettings) -> CoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&settings.url)
            .await
            .map_err(db_err)?;

        Ok(Self::new(pool))
    }

    /// Get the database pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the schema if it does not exist yet
    pub async fn run_migrations(&self) -> CoreResult<()> {
        debug!("Running schema migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT,
                price NUMERIC NOT NULL,
                stock BIGINT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                phone TEXT,
                address TEXT,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                purchase_history UUID[] NOT NULL DEFAULT '{}',
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id UUID PRIMARY KEY,
                client_id UUID NOT NULL,
                items JSONB NOT NULL,
                total NUMERIC NOT NULL,
                status TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_client ON orders (client_id)")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_created ON orders (created_at)")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                refresh_token TEXT,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

fn product_from_row(row: &PgRow) -> CoreResult<Product> {
    Ok(Product {
        id: ProductId::from(row.try_get::<Uuid, _>("id").map_err(db_err)?),
        name: row.try_get("name").map_err(db_err)?,
        description: row.try_get("description").map_err(db_err)?,
        price: row.try_get("price").map_err(db_err)?,
        stock: row.try_get("stock").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

fn client_from_row(row: &PgRow) -> CoreResult<Client> {
    let history: Vec<Uuid> = row.try_get("purchase_history").map_err(db_err)?;
    Ok(Client {
        id: ClientId::from(row.try_get::<Uuid, _>("id").map_err(db_err)?),
        name: row.try_get("name").map_err(db_err)?,
        email: row.try_get("email").map_err(db_err)?,
        phone: row.try_get("phone").map_err(db_err)?,
        address: row.try_get("address").map_err(db_err)?,
        is_active: row.try_get("is_active").map_err(db_err)?,
        purchase_history: history.into_iter().map(OrderId::from).collect(),
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

fn order_from_row(row: &PgRow) -> CoreResult<Order> {
    let items: Json<Vec<OrderItem>> = row.try_get("items").map_err(db_err)?;
    let status: String = row.try_get("status").map_err(db_err)?;
    Ok(Order {
        id: OrderId::from(row.try_get::<Uuid, _>("id").map_err(db_err)?),
        client: ClientId::from(row.try_get::<Uuid, _>("client_id").map_err(db_err)?),
        items: items.0,
        total: row.try_get("total").map_err(db_err)?,
        status: status
            .parse()
            .map_err(|_| CoreError::storage(format!("unknown order status in row: {status}")))?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

fn user_from_row(row: &PgRow) -> CoreResult<User> {
    let role: String = row.try_get("role").map_err(db_err)?;
    Ok(User {
        id: UserId::from(row.try_get::<Uuid, _>("id").map_err(db_err)?),
        name: row.try_get("name").map_err(db_err)?,
        email: row.try_get("email").map_err(db_err)?,
        password_hash: row.try_get("password_hash").map_err(db_err)?,
        role: role
            .parse()
            .map_err(|_| CoreError::storage(format!("unknown role in row: {role}")))?,
        refresh_token: row.try_get("refresh_token").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

/// Append the filter's WHERE conditions to a query builder.
fn push_product_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    let mut first = true;
    let mut sep = |builder: &mut QueryBuilder<'_, Postgres>| {
        builder.push(if std::mem::take(&mut first) {
            " WHERE "
        } else {
            " AND "
        });
    };
    if let Some(name) = &filter.name {
        sep(builder);
        builder.push("name ILIKE ");
        builder.push_bind(format!("%{}%", name));
    }
    if let Some(min) = filter.min_price {
        sep(builder);
        builder.push("price >= ");
        builder.push_bind(min);
    }
    if let Some(max) = filter.max_price {
        sep(builder);
        builder.push("price <= ");
        builder.push_bind(max);
    }
    if let Some(min) = filter.min_stock {
        sep(builder);
        builder.push("stock >= ");
        builder.push_bind(min);
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_product(&self, product: Product) -> CoreResult<Product> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, stock, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(product)
    }

    async fn product(&self, id: ProductId) -> CoreResult<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn product_by_name(&self, name: &str) -> CoreResult<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> CoreResult<PageResult<Product>> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) AS n FROM products");
        push_product_filter(&mut count, filter);
        let total: i64 = count
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?
            .try_get("n")
            .map_err(db_err)?;

        let mut query = QueryBuilder::new("SELECT * FROM products");
        push_product_filter(&mut query, filter);
        query.push(match filter.sort {
            Some(ProductSort::Name) => " ORDER BY name",
            Some(ProductSort::Price) => " ORDER BY price",
            Some(ProductSort::Stock) => " ORDER BY stock",
            None => " ORDER BY created_at",
        });
        query.push(" LIMIT ");
        query.push_bind(page.limit as i64);
        query.push(" OFFSET ");
        query.push_bind(page.offset() as i64);

        let rows = query.build().fetch_all(&self.pool).await.map_err(db_err)?;
        let items = rows
            .iter()
            .map(product_from_row)
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(PageResult {
            items,
            total: total as u64,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn all_products(&self) -> CoreResult<Vec<Product>> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(product_from_row).collect()
    }

    async fn update_product(&self, product: Product) -> CoreResult<Option<Product>> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, price = $4, stock = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok((result.rows_affected() > 0).then_some(product))
    }

    async fn delete_product(&self, id: ProductId) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn adjust_stock(&self, id: ProductId, delta: i64) -> CoreResult<StockChange> {
        // Guard only applies to decrements: the row update lands only when
        // the current stock covers the delta.
        let row = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + $2, updated_at = NOW()
            WHERE id = $1 AND stock + $2 >= 0
            RETURNING stock
            "#,
        )
        .bind(id.as_uuid())
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        if let Some(row) = row {
            return Ok(StockChange::Applied(row.try_get("stock").map_err(db_err)?));
        }

        // Guard refused or product missing; one read to tell them apart
        let current = sqlx::query("SELECT stock FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        match current {
            Some(row) => Ok(StockChange::Insufficient {
                available: row.try_get("stock").map_err(db_err)?,
            }),
            None => Ok(StockChange::Missing),
        }
    }

    async fn insert_client(&self, client: Client) -> CoreResult<Client> {
        let history: Vec<Uuid> = client.purchase_history.iter().map(|o| o.as_uuid()).collect();
        sqlx::query(
            r#"
            INSERT INTO clients
                (id, name, email, phone, address, is_active, purchase_history, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(client.id.as_uuid())
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(client.is_active)
        .bind(&history)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(client)
    }

    async fn client(&self, id: ClientId) -> CoreResult<Option<Client>> {
        let row = sqlx::query("SELECT * FROM clients WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(client_from_row).transpose()
    }

    async fn client_by_email(&self, email: &str) -> CoreResult<Option<Client>> {
        let row = sqlx::query("SELECT * FROM clients WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(client_from_row).transpose()
    }

    async fn active_clients(&self) -> CoreResult<Vec<Client>> {
        let rows = sqlx::query("SELECT * FROM clients WHERE is_active ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(client_from_row).collect()
    }

    async fn update_client(&self, client: Client) -> CoreResult<Option<Client>> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET name = $2, email = $3, phone = $4, address = $5, is_active = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(client.id.as_uuid())
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(client.is_active)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok((result.rows_affected() > 0).then_some(client))
    }

    async fn append_history(&self, client: ClientId, order: OrderId) -> CoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET purchase_history = array_append(purchase_history, $2), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(client.as_uuid())
        .bind(order.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_history(&self, client: ClientId, order: OrderId) -> CoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET purchase_history = array_remove(purchase_history, $2), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(client.as_uuid())
        .bind(order.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_order(&self, order: Order) -> CoreResult<Order> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, client_id, items, total, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.client.as_uuid())
        .bind(Json(&order.items))
        .bind(order.total)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(order)
    }

    async fn order(&self, id: OrderId) -> CoreResult<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(order_from_row).transpose()
    }

    async fn orders(&self, page: PageRequest) -> CoreResult<PageResult<Order>> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS n FROM orders")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?
            .try_get("n")
            .map_err(db_err)?;

        let rows = sqlx::query(
            "SELECT * FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let items = rows
            .iter()
            .map(order_from_row)
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(PageResult {
            items,
            total: total as u64,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn client_orders_active(&self, client: ClientId) -> CoreResult<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM orders
            WHERE client_id = $1 AND status <> 'cancelled'
            ORDER BY created_at
            "#,
        )
        .bind(client.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(order_from_row).collect()
    }

    async fn orders_in_range_active(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> CoreResult<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM orders
            WHERE status <> 'cancelled' AND created_at >= $1 AND created_at <= $2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(order_from_row).collect()
    }

    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> CoreResult<Option<Order>> {
        let row = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(order_from_row).transpose()
    }

    async fn cancel_order(&self, id: OrderId) -> CoreResult<CancelOutcome> {
        // Status flip only lands while the order has not shipped
        let row = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1 AND status NOT IN ('shipped', 'delivered')
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        if let Some(row) = row {
            return Ok(CancelOutcome::Cancelled(order_from_row(&row)?));
        }

        match self.order(id).await? {
            Some(order) => Ok(CancelOutcome::NotCancelable(order.status)),
            None => Ok(CancelOutcome::Missing),
        }
    }

    async fn delete_order(&self, id: OrderId) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_user(&self, user: User) -> CoreResult<User> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, name, email, password_hash, role, refresh_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.refresh_token)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(user)
    }

    async fn user(&self, id: UserId) -> CoreResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn update_user(&self, user: User) -> CoreResult<Option<User>> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, role = $5,
                refresh_token = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.refresh_token)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok((result.rows_affected() > 0).then_some(user))
    }

    async fn users(&self) -> CoreResult<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(user_from_row).collect()
    }

    async fn any_admin(&self) -> CoreResult<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin') AS present")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        row.try_get("present").map_err(db_err)
    }
}
