//! Product catalog service.

use chrono::Utc;
use erp_common::catalog::{NewProduct, Product, ProductUpdate};
use erp_common::validation::{require_field, require_non_negative_stock};
use erp_common::{CoreError, CoreResult, ProductId};
use rust_decimal::Decimal;
use tracing::info;

use crate::store::{PageRequest, PageResult, ProductFilter, SharedStore};

/// CRUD over the product catalog.
#[derive(Clone)]
pub struct CatalogService {
    store: SharedStore,
}

impl CatalogService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Create a product. Names are unique across the catalog.
    pub async fn create(&self, new: NewProduct) -> CoreResult<Product> {
        require_field("name", &new.name)?;
        if new.price < Decimal::ZERO {
            return Err(CoreError::validation("Price cannot be negative"));
        }
        require_non_negative_stock(new.stock)?;
        if self.store.product_by_name(&new.name).await?.is_some() {
            return Err(CoreError::already_exists("Product", &new.name));
        }

        let product = Product::new(new.name, new.description, new.price, new.stock);
        info!(product = %product.id, name = %product.name, "product created");
        self.store.insert_product(product).await
    }

    pub async fn get(&self, id: ProductId) -> CoreResult<Product> {
        self.store
            .product(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", id))
    }

    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> CoreResult<PageResult<Product>> {
        self.store.products(filter, page).await
    }

    /// Apply a partial update. Renaming onto an existing name is refused.
    pub async fn update(&self, id: ProductId, update: ProductUpdate) -> CoreResult<Product> {
        let mut product = self.get(id).await?;

        if let Some(name) = update.name {
            require_field("name", &name)?;
            if name != product.name {
                if self.store.product_by_name(&name).await?.is_some() {
                    return Err(CoreError::already_exists("Product", &name));
                }
                product.name = name;
            }
        }
        if let Some(description) = update.description {
            product.description = Some(description);
        }
        if let Some(price) = update.price {
            if price < Decimal::ZERO {
                return Err(CoreError::validation("Price cannot be negative"));
            }
            product.price = price;
        }
        if let Some(stock) = update.stock {
            require_non_negative_stock(stock)?;
            product.stock = stock;
        }
        product.updated_at = Utc::now();

        self.store
            .update_product(product)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", id))
    }

    pub async fn delete(&self, id: ProductId) -> CoreResult<()> {
        if !self.store.delete_product(id).await? {
            return Err(CoreError::not_found("Product", id));
        }
        info!(product = %id, "product deleted");
        Ok(())
    }
}
