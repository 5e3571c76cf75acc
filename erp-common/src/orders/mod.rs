//! Order domain model: the order record, its line items and the status
//! lifecycle.

pub mod order;
pub mod status;

pub use order::{Order, OrderItem};
pub use status::OrderStatus;
