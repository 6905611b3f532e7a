//! # honeyform-core
//!
//! Negative CAPTCHA engine: renders form fields under opaque, session-bound
//! names and validates submissions against them.
//!
//! A human's browser only fills the visible inputs, which carry derived
//! tokens as their names. A naive bot fills every input it finds by its
//! literal name, including the hidden decoys that keep the plain names, and
//! is rejected.
//!
//! ## Modules
//!
//! - [`spinner`] — Per-render spinner derivation
//! - [`tokens`] — Field token tree construction
//! - [`validator`] — Timestamp, spinner and honeypot checks, value extraction
//! - [`captcha`] — [`NegativeCaptcha`], one instance per request
//! - [`config`] — TOML configuration

pub mod captcha;
pub mod config;
pub mod spinner;
pub mod tokens;
pub mod validator;

pub use captcha::{CaptchaOptions, NegativeCaptcha, DEFAULT_MESSAGE};
pub use config::CaptchaConfig;
pub use honeyform_crypto::Secret;
pub use honeyform_types::{FieldSpec, Node, ParamValue, Params, SpecError};
pub use tokens::{TokenMode, TokenTree};
pub use validator::{Rejection, RejectionKind, ValueTree, TIMESTAMP_WINDOW_SECS};

/// Top-level parameter names reserved for the captcha itself.
pub const RESERVED_NAMES: &[&str] = &[validator::TIMESTAMP_PARAM, validator::SPINNER_PARAM];

/// Errors raised while setting up a captcha.
///
/// Submissions never produce these; a rejected submission is a
/// [`Rejection`].
#[derive(Debug, thiserror::Error)]
pub enum HoneyformError {
    /// The field specification is malformed.
    #[error("invalid field spec: {0}")]
    Spec(#[from] SpecError),

    /// A top-level field collides with a captcha parameter.
    #[error("field name {0:?} is reserved")]
    ReservedName(String),

    /// Reading the configuration file failed.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for [`CaptchaConfig`].
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Convenience result type for honeyform operations.
pub type Result<T> = std::result::Result<T, HoneyformError>;
