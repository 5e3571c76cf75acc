//! Client records and purchase history.

use chrono::Utc;
use erp_common::clients::{Client, ClientUpdate, NewClient};
use erp_common::orders::Order;
use erp_common::users::Role;
use erp_common::validation::{require_email, require_field};
use erp_common::{ClientId, CoreError, CoreResult, OrderId};
use tracing::info;

use crate::store::SharedStore;

/// CRUD over client records plus the purchase history list.
#[derive(Clone)]
pub struct ClientService {
    store: SharedStore,
}

impl ClientService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Register a client. Emails are unique across clients.
    pub async fn create(&self, new: NewClient) -> CoreResult<Client> {
        require_field("name", &new.name)?;
        require_email(&new.email)?;
        if self.store.client_by_email(&new.email).await?.is_some() {
            return Err(CoreError::already_exists("Client", &new.email));
        }

        let client = Client::new(new.name, new.email, new.phone, new.address);
        info!(client = %client.id, "client created");
        self.store.insert_client(client).await
    }

    pub async fn get(&self, id: ClientId) -> CoreResult<Client> {
        self.store
            .client(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Client", id))
    }

    /// Active clients with the purchase history stripped.
    pub async fn list_active(&self) -> CoreResult<Vec<Client>> {
        let mut clients = self.store.active_clients().await?;
        for client in &mut clients {
            client.purchase_history.clear();
        }
        Ok(clients)
    }

    /// Apply a partial update. Flipping `is_active` requires the admin role.
    pub async fn update(
        &self,
        id: ClientId,
        update: ClientUpdate,
        actor_role: Role,
    ) -> CoreResult<Client> {
        let mut client = self.get(id).await?;

        if let Some(is_active) = update.is_active {
            if actor_role != Role::Admin {
                return Err(CoreError::forbidden("Only admins may change isActive"));
            }
            client.is_active = is_active;
        }
        if let Some(name) = update.name {
            require_field("name", &name)?;
            client.name = name;
        }
        if let Some(email) = update.email {
            require_email(&email)?;
            if email != client.email {
                if self.store.client_by_email(&email).await?.is_some() {
                    return Err(CoreError::already_exists("Client", &email));
                }
                client.email = email;
            }
        }
        if let Some(phone) = update.phone {
            client.phone = Some(phone);
        }
        if let Some(address) = update.address {
            client.address = Some(address);
        }
        client.updated_at = Utc::now();

        self.store
            .update_client(client)
            .await?
            .ok_or_else(|| CoreError::not_found("Client", id))
    }

    /// Append an order id to the history. The order must exist; duplicates
    /// are kept as-is.
    pub async fn append_history(&self, id: ClientId, order: OrderId) -> CoreResult<()> {
        if self.store.order(order).await?.is_none() {
            return Err(CoreError::not_found("Order", order));
        }
        if !self.store.append_history(id, order).await? {
            return Err(CoreError::not_found("Client", id));
        }
        Ok(())
    }

    /// Remove every occurrence of an order id from the history.
    /// An id that was never present is a no-op.
    pub async fn remove_history(&self, id: ClientId, order: OrderId) -> CoreResult<()> {
        if !self.store.remove_history(id, order).await? {
            return Err(CoreError::not_found("Client", id));
        }
        Ok(())
    }

    /// The client's non-cancelled orders.
    pub async fn order_history(&self, id: ClientId) -> CoreResult<Vec<Order>> {
        // existence check first so an unknown client is a 404, not []
        self.get(id).await?;
        self.store.client_orders_active(id).await
    }
}
