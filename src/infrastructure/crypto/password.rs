//! bcrypt hashes for `[[security.users]]`

use bcrypt::{BcryptError, DEFAULT_COST};
use tracing::warn;

/// Hash for the config file (`fuel-calculator hash-password`).
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, BcryptError> {
    bcrypt::hash(password, cost)
}

/// Check a login attempt. A malformed stored hash never matches.
pub fn password_matches(password: &str, stored_hash: &str) -> bool {
    match bcrypt::verify(password, stored_hash) {
        Ok(matches) => matches,
        Err(e) => {
            warn!(error = %e, "Stored password hash is not valid bcrypt");
            false
        }
    }
}
