//! API key generation and hashing
//!
//! Keys look like `fcalc_<name-slug>_<32 hex chars>`. Only the SHA-256 hash
//! of a key is ever stored in the config file.

use rand::Rng;
use sha2::{Digest, Sha256};

/// API Key prefix for identification
pub const API_KEY_PREFIX: &str = "fcalc_";

/// Result of API key generation
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    /// The full API key (only shown once!)
    pub key: String,
    /// Hash to put in `[[security.api_keys]]`
    pub key_hash: String,
}

/// Check if a string looks like an API key
pub fn is_api_key_format(s: &str) -> bool {
    s.starts_with(API_KEY_PREFIX)
}

/// "My Integration" → "my-integration", max 24 chars.
fn slugify_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_matches('-');
    if trimmed.len() > 24 {
        trimmed[..24].trim_end_matches('-').to_string()
    } else {
        trimmed.to_string()
    }
}

/// Generate a new API key: `fcalc_<name-slug>_<random-hex>`
pub fn generate_api_key(name: &str) -> GeneratedApiKey {
    let random_bytes: [u8; 16] = rand::thread_rng().gen();
    let random_hex = hex::encode(random_bytes);

    let name_slug = slugify_name(name);
    let key = if name_slug.is_empty() {
        format!("{}{}", API_KEY_PREFIX, random_hex)
    } else {
        format!("{}{}_{}", API_KEY_PREFIX, name_slug, random_hex)
    };

    let key_hash = hash_api_key(&key);
    GeneratedApiKey { key, key_hash }
}

/// Hash an API key for storage using SHA-256
pub fn hash_api_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}
