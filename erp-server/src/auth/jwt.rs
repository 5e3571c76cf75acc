//! JWT issuing and verification.
//!
//! Two token kinds with separate signing secrets: short-lived access tokens
//! carrying the user id and role, and longer-lived refresh tokens carrying
//! only the user id. Refresh tokens are additionally pinned to the user row,
//! so one active session per user.

use chrono::{Duration, Utc};
use erp_common::users::Role;
use erp_common::{CoreError, CoreResult, UserId};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthSettings;

/// Claims carried by both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    /// Role, present on access tokens only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    /// Token id. `exp` alone has whole-second granularity, so without this
    /// two tokens issued in the same second would be byte-identical and
    /// rotation would hand back the token it was meant to replace.
    pub jti: Uuid,
}

impl Claims {
    pub fn user_id(&self) -> UserId {
        UserId::from(self.sub)
    }
}

/// An access/refresh token pair as handed to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signing and verification keys for both token kinds.
#[derive(Clone)]
pub struct TokenKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenKeys {
    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(settings.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(settings.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(settings.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(settings.refresh_secret.as_bytes()),
            access_ttl_secs: settings.access_ttl_secs,
            refresh_ttl_secs: settings.refresh_ttl_secs,
        }
    }

    /// Issue both tokens for a user.
    pub fn issue_pair(&self, user: UserId, role: Role) -> CoreResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access(user, role)?,
            refresh_token: self.issue_refresh(user)?,
        })
    }

    fn issue_access(&self, user: UserId, role: Role) -> CoreResult<String> {
        let claims = Claims {
            sub: user.as_uuid(),
            role: Some(role),
            exp: (Utc::now() + Duration::seconds(self.access_ttl_secs)).timestamp(),
            jti: Uuid::new_v4(),
        };
        encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| CoreError::storage(format!("token signing failed: {e}")))
    }

    fn issue_refresh(&self, user: UserId) -> CoreResult<String> {
        let claims = Claims {
            sub: user.as_uuid(),
            role: None,
            exp: (Utc::now() + Duration::seconds(self.refresh_ttl_secs)).timestamp(),
            jti: Uuid::new_v4(),
        };
        encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| CoreError::storage(format!("token signing failed: {e}")))
    }

    /// Verify an access token and return its claims.
    pub fn verify_access(&self, token: &str) -> CoreResult<Claims> {
        decode::<Claims>(token, &self.access_decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| CoreError::unauthorized("Invalid or expired token"))
    }

    /// Verify a refresh token and return its claims.
    pub fn verify_refresh(&self, token: &str) -> CoreResult<Claims> {
        decode::<Claims>(token, &self.refresh_decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| CoreError::forbidden("Invalid or expired refresh token"))
    }
}
