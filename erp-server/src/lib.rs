//! # ERP Server
//!
//! Backend service for a small ERP: user authentication, client records,
//! product inventory, orders with stock reconciliation, and revenue/stock
//! analytics.
//!
//! ## Architecture
//!
//! Domain services sit on a [`store::Store`] trait with PostgreSQL and
//! in-memory implementations. The order path is the core: assembly
//! validates every line before any write and takes stock through guarded
//! decrements; cancellation releases stock and reconciles the client's
//! purchase history. The HTTP surface is an axum router under `/api`
//! guarded by JWT bearer auth.

pub mod analytics;
pub mod auth;
pub mod catalog;
pub mod cli;
pub mod clients;
pub mod config;
pub mod http;
pub mod inventory;
pub mod orders;
pub mod store;
pub mod users;

// Re-export commonly used types
pub use config::Settings;
pub use http::{router, AppState};
pub use inventory::StockLedger;
pub use orders::{OrderAssembler, OrderLifecycle};
pub use store::{MemoryStore, PgStore, SharedStore, Store};
