use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Sessions outlive a working month, then force a fresh login.
pub const SESSION_TTL_DAYS: i64 = 30;

/// Fresh random salt for a new credential. One per member, stored next
/// to the digest.
pub fn new_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Salted SHA-256 digest, hex-encoded. The digest is compared by
/// re-hashing the candidate; the stored value never leaves the storage
/// layer.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn verify_password(candidate: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(candidate, salt) == expected_hash
}

/// Opaque bearer token. Resolvable to exactly one member through the
/// sessions table; carries no member information itself.
pub fn new_session_token() -> String {
    format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

pub fn session_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(SESSION_TTL_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let salt = new_salt();
        let hash = hash_password("correct horse battery staple", &salt);

        assert!(verify_password("correct horse battery staple", &salt, &hash));
        assert!(!verify_password("correct horse battery stable", &salt, &hash));
    }

    #[test]
    fn same_password_different_salt_differs() {
        let first = hash_password("pw", &new_salt());
        let second = hash_password("pw", &new_salt());
        assert_ne!(first, second);
    }

    #[test]
    fn digest_is_hex_and_fixed_width() {
        let hash = hash_password("pw", "salt");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_are_opaque_and_unique() {
        let token = new_session_token();
        assert_eq!(token.len(), 64);
        assert_ne!(token, new_session_token());
    }

    #[test]
    fn sessions_expire_after_ttl() {
        let now = Utc::now();
        let expiry = session_expiry(now);
        assert_eq!(expiry - now, Duration::days(SESSION_TTL_DAYS));
    }
}
