//! Credential helpers for bearer-token authentication
//!
//! # Architecture
//!
//! - Passwords are stored as SHA-256 of `salt || password`, hex encoded
//! - Access tokens are 32 random bytes, hex encoded (64 chars)
//! - Only the SHA-256 of a token is persisted, so a leaked database does not
//!   leak usable tokens
//!
//! No HTTP framework dependencies here; the axum middleware lives in the
//! server crate.

use rand::Rng;
use sha2::{Digest, Sha256};

// ========================================
// Random Material
// ========================================

/// Generate a 16-byte random salt as 32 hex characters
pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    to_hex(&bytes)
}

/// Generate a 32-byte random access token as 64 hex characters
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    to_hex(&bytes)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ========================================
// Hashing
// ========================================

/// Hash a password with its salt
///
/// # Examples
///
/// ```
/// use judge_common::api::auth::hash_password;
///
/// let hash = hash_password("hunter2", "abcd");
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, hash_password("hunter2", "abcd"));
/// assert_ne!(hash, hash_password("hunter2", "abce"));
/// ```
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a password against a stored salt and hash
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let calculated = hash_password(password, salt);
    // Length is fixed, so fold over every byte instead of short-circuiting
    calculated.len() == expected_hash.len()
        && calculated
            .bytes()
            .zip(expected_hash.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Hash an access token for storage and lookup
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ========================================
// Header Parsing
// ========================================

/// Extract the token from an `Authorization: Bearer <token>` header value
///
/// The scheme is matched case-insensitively. Returns `None` for any other
/// scheme or an empty token.
///
/// # Examples
///
/// ```
/// use judge_common::api::auth::parse_bearer;
///
/// assert_eq!(parse_bearer("Bearer abc"), Some("abc"));
/// assert_eq!(parse_bearer("bearer  abc "), Some("abc"));
/// assert_eq!(parse_bearer("Basic abc"), None);
/// assert_eq!(parse_bearer("Bearer "), None);
/// ```
pub fn parse_bearer(header_value: &str) -> Option<&str> {
    let (scheme, rest) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

// ========================================
// Tests
// ========================================
