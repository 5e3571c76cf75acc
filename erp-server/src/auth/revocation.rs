//! In-process access-token revocation.
//!
//! Logout adds the presented access token here; the request guard checks
//! membership before decoding. The set lives for the process lifetime and
//! is not persisted; tokens age out of relevance with their own expiry.

use std::collections::HashSet;
use tokio::sync::RwLock;

/// Set of revoked access tokens.
#[derive(Default)]
pub struct RevocationList {
    revoked: RwLock<HashSet<String>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn revoke(&self, token: impl Into<String>) {
        self.revoked.write().await.insert(token.into());
    }

    pub async fn is_revoked(&self, token: &str) -> bool {
        self.revoked.read().await.contains(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn revoked_token_is_flagged() {
        let list = RevocationList::new();
        assert!(!list.is_revoked("abc").await);
        list.revoke("abc").await;
        assert!(list.is_revoked("abc").await);
        assert!(!list.is_revoked("def").await);
    }
}
