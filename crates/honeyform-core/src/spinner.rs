//! Spinner derivation.
//!
//! The spinner seals one render of a form: it binds the render timestamp,
//! the application secret, and any caller context (a session id, say).
//! It is never stored; validation re-derives it from the submitted
//! timestamp and compares.
//!
//! `spinner = hex(BLAKE3::keyed_hash(derive_key("honeyform v1 spinner", secret),
//!                LP(timestamp, context[0], context[1], ...)))`

use honeyform_crypto::{KeyedHasher, Secret};

/// Derive the spinner for a render.
///
/// The same `context` must be supplied at render time and at validation.
pub fn derive_spinner<S: AsRef<str>>(timestamp: i64, secret: &Secret, context: &[S]) -> String {
    let mut parts = Vec::with_capacity(1 + context.len());
    parts.push(timestamp.to_string());
    parts.extend(context.iter().map(|c| c.as_ref().to_string()));
    KeyedHasher::spinner(secret.as_bytes()).hash(&parts)
}
