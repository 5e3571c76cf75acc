//! Authentication primitives: JWT issue/verify, password hashing and the
//! in-process access-token revocation set.

pub mod jwt;
pub mod password;
pub mod revocation;

pub use jwt::{Claims, TokenKeys, TokenPair};
pub use revocation::RevocationList;
