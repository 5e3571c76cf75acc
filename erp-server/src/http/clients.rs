//! Client record handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use erp_common::clients::{Client, ClientUpdate, NewClient};
use erp_common::{ClientId, OrderId};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiResult;
use super::extract::AuthUser;
use super::AppState;
use crate::orders::{populate, PopulatedOrder};

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<NewClient>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    auth.require_admin()?;
    let client = state.clients.create(req).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<Vec<Client>>> {
    Ok(Json(state.clients.list_active().await?))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ClientId>,
    Json(req): Json<ClientUpdate>,
) -> ApiResult<Json<Client>> {
    auth.require_admin()?;
    let client = state.clients.update(id, req, auth.role).await?;
    Ok(Json(client))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest {
    order_id: OrderId,
}

pub async fn append_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<ClientId>,
    Json(req): Json<HistoryRequest>,
) -> ApiResult<Json<Value>> {
    state.clients.append_history(id, req.order_id).await?;
    Ok(Json(json!({ "message": "Order added to history" })))
}

pub async fn remove_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((id, order_id)): Path<(ClientId, OrderId)>,
) -> ApiResult<Json<Value>> {
    state.clients.remove_history(id, order_id).await?;
    Ok(Json(json!({ "message": "Order removed from history" })))
}

pub async fn order_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<ClientId>,
) -> ApiResult<Json<Vec<PopulatedOrder>>> {
    let orders = state.clients.order_history(id).await?;
    let mut populated = Vec::with_capacity(orders.len());
    for order in orders {
        populated.push(populate(&state.store, order).await?);
    }
    Ok(Json(populated))
}
