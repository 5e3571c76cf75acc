//! Client (customer) model.
//!
//! `purchase_history` is an append-only list of order ids maintained by the
//! order services. Cancelling an order removes every occurrence of its id.

use crate::types::{ClientId, OrderId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer account that orders are placed against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Inactive clients are hidden from the active listing but keep their data
    pub is_active: bool,
    pub purchase_history: Vec<OrderId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new(name: String, email: String, phone: Option<String>, address: Option<String>) -> Self {
        let now = Utc::now();
        Client {
            id: ClientId::generate(),
            name,
            email,
            phone,
            address,
            is_active: true,
            purchase_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Fields accepted when registering a client.
#[derive(Debug, Clone, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Partial update to a client; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_client_is_active_with_empty_history() {
        let c = Client::new("Acme".into(), "ops@acme.test".into(), None, None);
        assert!(c.is_active);
        assert!(c.purchase_history.is_empty());
    }

    #[test]
    fn client_serializes_camel_case() {
        let c = Client::new("Acme".into(), "ops@acme.test".into(), None, None);
        let json = serde_json::to_value(&c).unwrap();
        assert!(json.get("isActive").is_some());
        assert!(json.get("purchaseHistory").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("is_active").is_none());
    }

    #[test]
    fn client_update_accepts_camel_case_is_active() {
        let update: ClientUpdate = serde_json::from_str(r#"{"isActive": false}"#).unwrap();
        assert_eq!(update.is_active, Some(false));
    }
}
