//! Password digests.
//!
//! Passwords are stored as lowercase hex SHA-256 digests. Comparison is done
//! in constant time over the decoded digest bytes.
//!
//! Known weakness: the digest is unsalted and fast, so equal passwords share a
//! stored value and offline guessing is cheap. The format is kept because
//! existing stored hashes use it. Moving to a password KDF such as `argon2`
//! needs a rehash-on-login migration.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Returns the lowercase hex SHA-256 digest of `password`.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Checks `candidate` against a stored hex digest.
///
/// A stored value that is not valid hex never matches.
pub fn verify_password(candidate: &str, stored_digest: &str) -> bool {
    let Ok(stored) = hex::decode(stored_digest.trim()) else {
        return false;
    };

    let computed = Sha256::digest(candidate.as_bytes());
    if stored.len() != computed.len() {
        return false;
    }

    computed.as_slice().ct_eq(&stored).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_hex_sha256() {
        assert_eq!(
            hash_password("Admin123"),
            "3b612c75a7b5048a435fb6ec81e52ff92d6d795a8b5a9c17070f6a63c97a53b2"
        );
        assert_eq!(hash_password("User123").len(), 64);
    }

    #[test]
    fn digest_is_unsalted() {
        assert_eq!(hash_password("User123"), hash_password("User123"));
    }

    #[test]
    fn verify_accepts_matching_password() {
        let stored = hash_password("User123");
        assert!(verify_password("User123", &stored));
        assert!(verify_password("User123", &stored.to_uppercase()));
    }

    #[test]
    fn verify_rejects_wrong_or_malformed() {
        let stored = hash_password("User123");
        assert!(!verify_password("user123", &stored));
        assert!(!verify_password("User123", "not-hex"));
        assert!(!verify_password("User123", "abcd"));
    }
}
