//! HTTP surface: axum router under `/api`, shared state, auth extraction
//! and error mapping.

mod analytics;
mod clients;
mod error;
mod extract;
mod orders;
mod products;
mod users;

pub use error::{ApiError, ApiResult};
pub use extract::AuthUser;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::analytics::AnalyticsService;
use crate::auth::{RevocationList, TokenKeys};
use crate::catalog::CatalogService;
use crate::clients::ClientService;
use crate::config::{PaginationSettings, Settings};
use crate::inventory::StockLedger;
use crate::orders::{OrderAssembler, OrderLifecycle};
use crate::store::SharedStore;
use crate::users::UserService;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub catalog: CatalogService,
    pub clients: ClientService,
    pub assembler: OrderAssembler,
    pub lifecycle: OrderLifecycle,
    pub users: UserService,
    pub analytics: AnalyticsService,
    pub keys: TokenKeys,
    pub revoked: Arc<RevocationList>,
    pub pagination: PaginationSettings,
}

impl AppState {
    /// Wire the services over a store.
    pub fn new(store: SharedStore, settings: &Settings) -> Self {
        let ledger = StockLedger::new(store.clone());
        let keys = TokenKeys::from_settings(&settings.auth);
        let revoked = Arc::new(RevocationList::new());
        Self {
            catalog: CatalogService::new(store.clone()),
            clients: ClientService::new(store.clone()),
            assembler: OrderAssembler::new(store.clone(), ledger.clone()),
            lifecycle: OrderLifecycle::new(store.clone(), ledger),
            users: UserService::new(store.clone(), keys.clone(), revoked.clone()),
            analytics: AnalyticsService::new(store.clone()),
            store,
            keys,
            revoked,
            pagination: settings.pagination.clone(),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_origin(Any)
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        // users
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/refresh", post(users::refresh))
        .route("/users/logout", post(users::logout))
        .route("/users", get(users::list))
        .route("/users/:id/role", post(users::update_role))
        // products
        .route("/products", post(products::create).get(products::list))
        .route(
            "/products/:id",
            get(products::get).put(products::update).delete(products::remove),
        )
        // clients
        .route("/clients", post(clients::create).get(clients::list))
        .route("/clients/:id", put(clients::update))
        .route("/clients/:id/orders", post(clients::append_history))
        .route(
            "/clients/:id/orders/history",
            get(clients::order_history),
        )
        .route(
            "/clients/:id/orders/:order_id",
            delete(clients::remove_history),
        )
        // orders
        .route("/orders", post(orders::create).get(orders::list))
        .route(
            "/orders/:id",
            get(orders::get).put(orders::update_status).delete(orders::remove),
        )
        .route("/orders/:id/cancel", delete(orders::cancel))
        // analytics
        .route("/analytics/revenue", get(analytics::revenue))
        .route("/analytics/revenue/:client_id", get(analytics::client_revenue))
        .route("/analytics/stock", get(analytics::stock));

    Router::new().nest("/api", api).layer(cors).with_state(state)
}

/// Resolves when SIGINT or SIGTERM arrives.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
