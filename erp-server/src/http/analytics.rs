//! Analytics handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use erp_common::ClientId;
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use super::extract::AuthUser;
use super::AppState;
use crate::analytics::{ClientRevenue, RevenueReport, StockLine};

#[derive(Deserialize)]
pub struct RevenueQuery {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

pub async fn revenue(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<RevenueQuery>,
) -> ApiResult<Json<RevenueReport>> {
    Ok(Json(state.analytics.revenue(query.from, query.to).await?))
}

pub async fn client_revenue(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(client_id): Path<ClientId>,
) -> ApiResult<Json<ClientRevenue>> {
    Ok(Json(state.analytics.client_revenue(client_id).await?))
}

#[derive(Serialize)]
pub struct StockResponse {
    products: Vec<StockLine>,
}

pub async fn stock(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<StockResponse>> {
    Ok(Json(StockResponse {
        products: state.analytics.stock_report().await?,
    }))
}
