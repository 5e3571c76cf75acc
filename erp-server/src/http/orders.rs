//! Order handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use erp_common::orders::Order;
use erp_common::{ClientId, OrderId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::ApiResult;
use super::extract::AuthUser;
use super::AppState;
use crate::orders::{populate, OrderItemRequest, PopulatedOrder};
use crate::store::PageRequest;

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    #[serde(rename = "clientId")]
    pub client: ClientId,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Serialize)]
pub struct OrderResponse {
    message: &'static str,
    order: Order,
}

pub async fn create(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<OrderResponse>)> {
    let order = state.assembler.create(req.client, req.items).await?;
    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            message: "Order created",
            order,
        }),
    ))
}

#[derive(Deserialize)]
pub struct ListQuery {
    page: Option<u64>,
    limit: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    orders: Vec<Order>,
    total: u64,
    total_pages: u64,
    current_page: u64,
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListResponse>> {
    let limit = query
        .limit
        .unwrap_or(state.pagination.default_limit)
        .min(state.pagination.max_limit);
    let page = PageRequest::new(query.page.unwrap_or(1), limit);

    let result = state.lifecycle.list(page).await?;
    Ok(Json(ListResponse {
        total: result.total,
        total_pages: result.total_pages(),
        current_page: result.page,
        orders: result.items,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<OrderId>,
) -> ApiResult<Json<PopulatedOrder>> {
    let order = state.lifecycle.get(id).await?;
    Ok(Json(populate(&state.store, order).await?))
}

#[derive(Deserialize)]
pub struct StatusRequest {
    status: String,
}

pub async fn update_status(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<OrderId>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<OrderResponse>> {
    let order = state.lifecycle.update_status(id, &req.status).await?;
    Ok(Json(OrderResponse {
        message: "Order status updated",
        order,
    }))
}

pub async fn cancel(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<OrderId>,
) -> ApiResult<Json<OrderResponse>> {
    let order = state.lifecycle.cancel(id).await?;
    Ok(Json(OrderResponse {
        message: "Order cancelled",
        order,
    }))
}

pub async fn remove(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<OrderId>,
) -> ApiResult<Json<Value>> {
    state.lifecycle.delete(id).await?;
    Ok(Json(json!({ "message": "Order deleted" })))
}
