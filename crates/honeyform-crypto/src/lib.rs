//! # honeyform-crypto
//!
//! Hashing primitives for honeyform field obfuscation.
//!
//! Every opaque name a form is rendered with (field tokens and the spinner)
//! comes out of a [`KeyedHasher`]: a BLAKE3 keyed hash whose key is derived
//! from the application secret under a per-purpose context string.
//!
//! ## Modules
//!
//! - [`keyed`] — [`KeyedHasher`] and the registered key derivation contexts
//! - [`secret`] — [`Secret`], the zeroizing application secret

pub mod keyed;
pub mod secret;

pub use keyed::{KeyedHasher, TOKEN_HEX_LEN};
pub use secret::Secret;
