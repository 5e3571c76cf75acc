// erp-common: Shared domain types for the ERP backend
// Used by erp-server (HTTP service) and its integration tests

pub mod catalog;
pub mod clients;
pub mod error;
pub mod logging;
pub mod orders;
pub mod types;
pub mod users;
pub mod validation;

pub use error::{CoreError, CoreResult};
pub use types::{ClientId, OrderId, ProductId, UserId};
