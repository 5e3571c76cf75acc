//! User and session handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use erp_common::users::User;
use erp_common::UserId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::ApiResult;
use super::extract::AuthUser;
use super::AppState;
use crate::auth::TokenPair;
use crate::users::{LoginRequest, RegisterRequest};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.users.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    message: &'static str,
    user: User,
    #[serde(flatten)]
    tokens: TokenPair,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (user, tokens) = state.users.login(req).await?;
    Ok(Json(LoginResponse {
        message: "Login successful",
        user,
        tokens,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    refresh_token: String,
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    let pair = state.users.refresh(&req.refresh_token).await?;
    Ok(Json(pair))
}

pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Value>> {
    state.users.logout(auth.id, &auth.token).await?;
    Ok(Json(json!({ "message": "Logged out" })))
}

pub async fn list(State(state): State<AppState>, _auth: AuthUser) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.users.list().await?))
}

#[derive(Deserialize)]
pub struct RoleRequest {
    role: String,
}

pub async fn update_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserId>,
    Json(req): Json<RoleRequest>,
) -> ApiResult<Json<User>> {
    auth.require_admin()?;
    let user = state.users.update_role(id, &req.role).await?;
    Ok(Json(user))
}
