//! Keyed hashing of ordered string parts.
//!
//! Field tokens and spinners are both derived from the same application
//! secret. Each purpose gets its own key through BLAKE3's key derivation
//! mode, so a token can never be replayed as a spinner for the same input.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Registered key derivation contexts.
/// Deriving a key under any other context is a programming error.
pub mod contexts {
    pub const FIELD_TOKEN: &str = "honeyform v1 field-token";
    pub const SPINNER: &str = "honeyform v1 spinner";

    pub const ALL_CONTEXTS: &[&str] = &[FIELD_TOKEN, SPINNER];
}

/// Length of every token produced by [`KeyedHasher::hash`] (hex characters).
pub const TOKEN_HEX_LEN: usize = 64;

/// Deterministic keyed digest over an ordered sequence of strings.
///
/// `token = hex(BLAKE3::keyed_hash(derive_key(context, secret), LP(parts)))`
/// where `LP` prefixes every part with its length as a little-endian `u32`.
/// Without the prefixes `["ab", "c"]` and `["a", "bc"]` would collide.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyedHasher {
    key: [u8; 32],
}

impl KeyedHasher {
    /// Build a hasher for `context`, keyed by `secret`.
    ///
    /// `context` should be one of [`contexts::ALL_CONTEXTS`].
    pub fn new(context: &str, secret: &[u8]) -> Self {
        debug_assert!(
            contexts::ALL_CONTEXTS.contains(&context),
            "unregistered context {context:?}"
        );
        let key = blake3::Hasher::new_derive_key(context)
            .update(secret)
            .finalize();
        Self {
            key: *key.as_bytes(),
        }
    }

    /// Hasher for leaf field tokens.
    pub fn field_token(secret: &[u8]) -> Self {
        Self::new(contexts::FIELD_TOKEN, secret)
    }

    /// Hasher for spinners.
    pub fn spinner(secret: &[u8]) -> Self {
        Self::new(contexts::SPINNER, secret)
    }

    /// Hash the ordered `parts` into a lowercase hex token of
    /// [`TOKEN_HEX_LEN`] characters.
    pub fn hash<S: AsRef<str>>(&self, parts: &[S]) -> String {
        let mut hasher = blake3::Hasher::new_keyed(&self.key);
        for part in parts {
            let bytes = part.as_ref().as_bytes();
            hasher.update(&length_prefix(bytes.len()));
            hasher.update(bytes);
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Little-endian `u32` length of a part. Parts longer than `u32::MAX` bytes
/// saturate; no form field comes close.
fn length_prefix(len: usize) -> [u8; 4] {
    u32::try_from(len).unwrap_or(u32::MAX).to_le_bytes()
}

impl fmt::Debug for KeyedHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_fixed_length_hex() {
        let hasher = KeyedHasher::field_token(b"secret");
        let token = hasher.hash(&["name", "spinner"]);
        assert_eq!(token.len(), TOKEN_HEX_LEN);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_deterministic() {
        let a = KeyedHasher::field_token(b"secret").hash(&["name", "spin"]);
        let b = KeyedHasher::field_token(b"secret").hash(&["name", "spin"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_depends_on_every_input() {
        let base = KeyedHasher::field_token(b"secret").hash(&["name", "spin"]);
        assert_ne!(base, KeyedHasher::field_token(b"other").hash(&["name", "spin"]));
        assert_ne!(base, KeyedHasher::field_token(b"secret").hash(&["nam", "spin"]));
        assert_ne!(base, KeyedHasher::field_token(b"secret").hash(&["name", "spun"]));
        assert_ne!(base, KeyedHasher::spinner(b"secret").hash(&["name", "spin"]));
    }

    #[test]
    fn test_hash_order_matters() {
        let hasher = KeyedHasher::spinner(b"secret");
        assert_ne!(hasher.hash(&["a", "b"]), hasher.hash(&["b", "a"]));
    }

    #[test]
    fn test_hash_accepts_owned_parts() {
        let hasher = KeyedHasher::spinner(b"secret");
        let owned = vec!["1700000000".to_string(), "session".to_string()];
        assert_eq!(hasher.hash(&owned), hasher.hash(&["1700000000", "session"]));
    }

    #[test]
    fn test_part_boundaries_matter() {
        let hasher = KeyedHasher::field_token(b"secret");
        assert_ne!(hasher.hash(&["ab", "c"]), hasher.hash(&["a", "bc"]));
        assert_ne!(hasher.hash(&["abc"]), hasher.hash(&["abc", ""]));
    }

    #[test]
    fn test_matches_length_prefixed_keyed_hash() {
        let key = blake3::derive_key(contexts::SPINNER, b"secret");
        let mut message = Vec::new();
        for part in ["1700000000", "ctx"] {
            message.extend_from_slice(&(part.len() as u32).to_le_bytes());
            message.extend_from_slice(part.as_bytes());
        }
        let expected = blake3::keyed_hash(&key, &message).to_hex().to_string();
        assert_eq!(KeyedHasher::spinner(b"secret").hash(&["1700000000", "ctx"]), expected);
    }

    #[test]
    fn test_contexts_prefixed() {
        for ctx in contexts::ALL_CONTEXTS {
            assert!(ctx.starts_with("honeyform v1 "), "context {ctx:?} has wrong prefix");
        }
    }

    #[test]
    fn test_debug_hides_key() {
        let hasher = KeyedHasher::spinner(b"secret");
        assert_eq!(format!("{hasher:?}"), "KeyedHasher { .. }");
    }
}
