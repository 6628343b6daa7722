//! Credential hashing and session tokens
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions. Session persistence and the HTTP
//! middleware live in the server crate.
//!
//! Passwords are stored as `SHA-256(salt || password)` in lowercase hex with a
//! per-user random salt. Session tokens are random UUIDv4 strings issued and
//! validated by the server; clients never hold role claims.

use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Salt length in bytes before hex encoding
const SALT_BYTES: usize = 16;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 4;

/// Generate a random salt as lowercase hex
pub fn generate_salt() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; SALT_BYTES] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash a password with the given salt
///
/// # Examples
///
/// ```
/// use piket_common::auth::hash_password;
///
/// let a = hash_password("secret", "00ff");
/// let b = hash_password("secret", "00ff");
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a password against a stored hash and salt
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let calculated = hash_password(password, salt);
    constant_time_eq(calculated.as_bytes(), expected_hash.as_bytes())
}

/// Produce `(hash, salt)` for a new password
pub fn new_credentials(password: &str) -> (String, String) {
    let salt = generate_salt();
    (hash_password(password, &salt), salt)
}

/// Issue a fresh session token
pub fn generate_session_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
