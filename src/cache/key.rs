//! Cache Key Module
//!
//! Derives the stable integer key every tier is addressed by.

use std::fmt;

use sha2::{Digest, Sha256};

// == Cache Key ==
/// A 64-bit key derived from a resource identifier (typically a URL).
///
/// The key is the first eight bytes of the SHA-256 digest of the identifier,
/// read big-endian. It is stable across processes, so disk file names survive
/// restarts.
///
/// Two distinct identifiers that hash equal share one cache slot. This is an
/// accepted approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(u64);

impl CacheKey {
    /// Wraps a raw hash value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Hashes a resource identifier into a key.
    pub fn from_identifier(identifier: &str) -> Self {
        let digest = Sha256::digest(identifier.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        Self(u64::from_be_bytes(prefix))
    }

    /// Returns the raw hash value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<&str> for CacheKey {
    fn from(identifier: &str) -> Self {
        Self::from_identifier(identifier)
    }
}

/// Decimal form; also the file name of the entry in the disk tier.
impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic() {
        let a = CacheKey::from_identifier("https://example.com/cat.png");
        let b = CacheKey::from_identifier("https://example.com/cat.png");
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_identifiers_differ() {
        let a = CacheKey::from_identifier("https://example.com/cat.png");
        let b = CacheKey::from_identifier("https://example.com/dog.png");
        assert_ne!(a, b);
    }

    #[test]
    fn test_known_digest_prefix() {
        // sha256("") = e3b0c44298fc1c14...
        let key = CacheKey::from_identifier("");
        assert_eq!(key.raw(), 0xe3b0_c442_98fc_1c14);
    }

    #[test]
    fn test_display_is_decimal_raw() {
        let key = CacheKey::from_raw(1234567890);
        assert_eq!(key.to_string(), "1234567890");
    }

    #[test]
    fn test_from_str() {
        let key: CacheKey = "abc".into();
        assert_eq!(key, CacheKey::from_identifier("abc"));
    }
}
