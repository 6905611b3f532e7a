//! The application secret that keys every derivation.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Input to the fallback secret digest.
const FALLBACK_SEED: &[u8] = b"this_is_a_secret_key";

/// Length in bytes of a generated secret before hex encoding.
pub const GENERATED_SECRET_LEN: usize = 32;

/// Application secret. Zeroized on drop and redacted in `Debug` output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    /// Wrap a caller-supplied secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Generate a fresh random secret (hex of 32 bytes from the OS RNG).
    pub fn generate() -> Self {
        let mut bytes = [0u8; GENERATED_SECRET_LEN];
        rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut bytes);
        let secret = Self(hex::encode(bytes));
        bytes.zeroize();
        secret
    }

    /// The fixed, publicly known fallback secret.
    ///
    /// Only suitable for tests and local development.
    pub fn fallback() -> Self {
        Self(blake3::hash(FALLBACK_SEED).to_hex().to_string())
    }

    /// Whether this is the publicly known fallback secret.
    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }

    /// Borrow the secret string.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Borrow the secret as key material.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl From<&str> for Secret {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl From<String> for Secret {
    fn from(secret: String) -> Self {
        Self(secret)
    }
}
