//! User accounts: registration, login, token refresh, logout, roles.

use chrono::Utc;
use erp_common::users::{Role, User};
use erp_common::validation::{require_email, require_field};
use erp_common::{CoreError, CoreResult, UserId};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::auth::{RevocationList, TokenKeys, TokenPair};
use crate::auth::password;
use crate::store::SharedStore;

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Optional role; defaults to `user`
    #[serde(default)]
    pub role: Option<String>,
}

/// Login payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Account management and session issue/rotation.
#[derive(Clone)]
pub struct UserService {
    store: SharedStore,
    keys: TokenKeys,
    revoked: Arc<RevocationList>,
}

impl UserService {
    pub fn new(store: SharedStore, keys: TokenKeys, revoked: Arc<RevocationList>) -> Self {
        Self {
            store,
            keys,
            revoked,
        }
    }

    /// Register an account. Emails are unique across users.
    pub async fn register(&self, req: RegisterRequest) -> CoreResult<User> {
        require_field("name", &req.name)?;
        require_email(&req.email)?;
        require_field("password", &req.password)?;
        let role = match req.role.as_deref() {
            Some(raw) => raw.parse::<Role>()?,
            None => Role::User,
        };
        if self.store.user_by_email(&req.email).await?.is_some() {
            return Err(CoreError::already_exists("User", &req.email));
        }

        let hashed = password::hash(&req.password)?;
        let user = User::new(req.name, req.email, hashed, role);
        info!(user = %user.id, role = %user.role, "user registered");
        self.store.insert_user(user).await
    }

    /// Verify credentials and issue a fresh token pair.
    ///
    /// The refresh token is pinned to the user row, replacing any previous
    /// session.
    pub async fn login(&self, req: LoginRequest) -> CoreResult<(User, TokenPair)> {
        let mut user = self
            .store
            .user_by_email(&req.email)
            .await?
            .ok_or_else(|| CoreError::unauthorized("Invalid credentials"))?;
        if !password::verify(&req.password, &user.password_hash)? {
            return Err(CoreError::unauthorized("Invalid credentials"));
        }

        let pair = self.keys.issue_pair(user.id, user.role)?;
        user.refresh_token = Some(pair.refresh_token.clone());
        user.updated_at = Utc::now();
        let user = self
            .store
            .update_user(user)
            .await?
            .ok_or_else(|| CoreError::storage("user row vanished during login"))?;

        info!(user = %user.id, "user logged in");
        Ok((user, pair))
    }

    /// Rotate both tokens against a presented refresh token.
    ///
    /// The token must verify AND match the one pinned to the user row;
    /// a stale token from a superseded session is refused.
    pub async fn refresh(&self, refresh_token: &str) -> CoreResult<TokenPair> {
        let claims = self.keys.verify_refresh(refresh_token)?;
        let mut user = self
            .store
            .user(claims.user_id())
            .await?
            .ok_or_else(|| CoreError::forbidden("Invalid or expired refresh token"))?;
        if user.refresh_token.as_deref() != Some(refresh_token) {
            return Err(CoreError::forbidden("Invalid or expired refresh token"));
        }

        let pair = self.keys.issue_pair(user.id, user.role)?;
        user.refresh_token = Some(pair.refresh_token.clone());
        user.updated_at = Utc::now();
        self.store
            .update_user(user)
            .await?
            .ok_or_else(|| CoreError::storage("user row vanished during refresh"))?;
        Ok(pair)
    }

    /// Revoke the presented access token and clear the stored session.
    pub async fn logout(&self, id: UserId, access_token: &str) -> CoreResult<()> {
        self.revoked.revoke(access_token).await;
        if let Some(mut user) = self.store.user(id).await? {
            user.refresh_token = None;
            user.updated_at = Utc::now();
            self.store.update_user(user).await?;
        }
        info!(user = %id, "user logged out");
        Ok(())
    }

    /// Change a user's role. The HTTP layer gates this to admins.
    pub async fn update_role(&self, id: UserId, role: &str) -> CoreResult<User> {
        let role: Role = role.parse()?;
        let mut user = self
            .store
            .user(id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", id))?;
        user.role = role;
        user.updated_at = Utc::now();
        let user = self
            .store
            .update_user(user)
            .await?
            .ok_or_else(|| CoreError::not_found("User", id))?;
        info!(user = %id, role = %role, "role updated");
        Ok(user)
    }

    pub async fn list(&self) -> CoreResult<Vec<User>> {
        self.store.users().await
    }

    pub async fn get(&self, id: UserId) -> CoreResult<User> {
        self.store
            .user(id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", id))
    }

    /// Create the bootstrap admin when no admin account exists yet.
    pub async fn ensure_admin(&self, email: &str, plain_password: &str) -> CoreResult<()> {
        if self.store.any_admin().await? {
            return Ok(());
        }
        let hashed = password::hash(plain_password)?;
        let admin = User::new("Administrator".into(), email.into(), hashed, Role::Admin);
        self.store.insert_user(admin).await?;
        info!(email, "bootstrap admin created");
        Ok(())
    }
}
