use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Sessions expire this long after login.
pub const SESSION_TTL_HOURS: i64 = 24;

pub fn new_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn new_token() -> String {
    Uuid::new_v4().to_string()
}

/// Salted digest of a password. Stored passwords are never plaintext and
/// never leave the accounts table.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn verify_password(salt: &str, stored_hash: &str, supplied: &str) -> bool {
    hash_password(salt, supplied) == stored_hash
}

pub fn session_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::hours(SESSION_TTL_HOURS)
}

/// True when `expires_at` (RFC 3339) is past. Unparseable stamps count as
/// expired so a damaged row can never grant access.
pub fn session_expired(expires_at: &str, now: DateTime<Utc>) -> bool {
    match DateTime::parse_from_rfc3339(expires_at) {
        Ok(t) => t.with_timezone(&Utc) <= now,
        Err(_) => true,
    }
}
