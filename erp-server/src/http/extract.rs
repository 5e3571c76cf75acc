//! Request authentication extractor.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use erp_common::users::Role;
use erp_common::{CoreError, UserId};

use super::error::ApiError;
use super::AppState;

/// The authenticated caller, decoded from the bearer token.
///
/// Extraction fails with 401 when the header is missing or malformed, the
/// token is revoked, or the claims do not verify.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub role: Role,
    /// The raw token, kept for logout revocation
    pub token: String,
}

impl AuthUser {
    /// 403 unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role != Role::Admin {
            return Err(CoreError::forbidden("Admin access required").into());
        }
        Ok(())
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| CoreError::unauthorized("Missing authorization header"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| CoreError::unauthorized("Expected a bearer token"))?;

        if state.revoked.is_revoked(token).await {
            return Err(CoreError::unauthorized("Token has been revoked").into());
        }

        let claims = state.keys.verify_access(token)?;
        let role = claims
            .role
            .ok_or_else(|| CoreError::unauthorized("Not an access token"))?;

        Ok(AuthUser {
            id: claims.user_id(),
            role,
            token: token.to_string(),
        })
    }
}
