//! Product catalog handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use erp_common::catalog::{NewProduct, Product, ProductUpdate};
use erp_common::{CoreError, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::ApiResult;
use super::extract::AuthUser;
use super::AppState;
use crate::store::{PageRequest, ProductFilter, ProductSort};

pub async fn create(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.catalog.create(req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    name: Option<String>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
    min_stock: Option<i64>,
    sort: Option<String>,
    page: Option<u64>,
    limit: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    products: Vec<Product>,
    total: u64,
    total_pages: u64,
    current_page: u64,
}

fn parse_sort(raw: &str) -> Result<ProductSort, CoreError> {
    match raw {
        "name" => Ok(ProductSort::Name),
        "price" => Ok(ProductSort::Price),
        "stock" => Ok(ProductSort::Stock),
        _ => Err(CoreError::validation("Invalid sort field")),
    }
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListResponse>> {
    let sort = query.sort.as_deref().map(parse_sort).transpose()?;
    let filter = ProductFilter {
        name: query.name,
        min_price: query.min_price,
        max_price: query.max_price,
        min_stock: query.min_stock,
        sort,
    };
    let limit = query
        .limit
        .unwrap_or(state.pagination.default_limit)
        .min(state.pagination.max_limit);
    let page = PageRequest::new(query.page.unwrap_or(1), limit);

    let result = state.catalog.list(&filter, page).await?;
    Ok(Json(ListResponse {
        total: result.total,
        total_pages: result.total_pages(),
        current_page: result.page,
        products: result.items,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<ProductId>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.catalog.get(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<ProductId>,
    Json(req): Json<ProductUpdate>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.catalog.update(id, req).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<ProductId>,
) -> ApiResult<Json<Value>> {
    state.catalog.delete(id).await?;
    Ok(Json(json!({ "message": "Product deleted" })))
}
