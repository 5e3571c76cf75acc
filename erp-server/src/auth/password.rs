//! Password hashing with bcrypt.

use erp_common::{CoreError, CoreResult};

/// Hash a plaintext password.
pub fn hash(plain: &str) -> CoreResult<String> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST)
        .map_err(|e| CoreError::storage(format!("password hashing failed: {e}")))
}

/// Check a plaintext password against a stored hash.
pub fn verify(plain: &str, hashed: &str) -> CoreResult<bool> {
    bcrypt::verify(plain, hashed)
        .map_err(|e| CoreError::storage(format!("password verification failed: {e}")))
}
