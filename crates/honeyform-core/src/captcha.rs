//! Per-request negative CAPTCHA instances.
//!
//! One [`NegativeCaptcha`] is built when a form is rendered and another when
//! it is submitted. The render side hands the token tree, timestamp and
//! spinner to the markup renderer; the submit side is built with the
//! submitted parameters and validates them immediately.

use std::time::{SystemTime, UNIX_EPOCH};

use honeyform_crypto::Secret;
use honeyform_types::{FieldSpec, Node, ParamValue, Params};

use crate::spinner::derive_spinner;
use crate::tokens::{build_token_tree, TokenMode, TokenTree};
use crate::validator::{
    self, submitted_timestamp, Rejection, RejectionKind, ValueTree, SPINNER_PARAM,
    TIMESTAMP_PARAM,
};
use crate::{HoneyformError, Result, RESERVED_NAMES};

/// Hint appended to every rejection unless the caller supplies one.
pub const DEFAULT_MESSAGE: &str = "Please try again.\n\
This usually happens because an automated script attempted to submit this form.\n";

/// Construction options for [`NegativeCaptcha`].
#[derive(Debug, Clone)]
pub struct CaptchaOptions {
    fields: FieldSpec,
    secret: Option<Secret>,
    message: Option<String>,
    spinner_context: Vec<String>,
    params: Option<Params>,
    timestamp: Option<i64>,
    now: Option<i64>,
    mode: TokenMode,
}

impl CaptchaOptions {
    /// Options for a form with the given fields and every other option at
    /// its default.
    pub fn new(fields: FieldSpec) -> Self {
        Self {
            fields,
            secret: None,
            message: None,
            spinner_context: Vec::new(),
            params: None,
            timestamp: None,
            now: None,
            mode: TokenMode::Hashed,
        }
    }

    /// Secret keying every derivation. Defaults to [`Secret::fallback`].
    pub fn secret(mut self, secret: impl Into<Secret>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Hint appended to rejection text. Defaults to [`DEFAULT_MESSAGE`].
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Extra strings folded into the spinner, e.g. a session id.
    pub fn spinner_context<I, S>(mut self, context: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spinner_context = context.into_iter().map(Into::into).collect();
        self
    }

    /// Submitted parameters. Validation runs on construction when they
    /// carry a `timestamp` or `spinner`.
    pub fn params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    /// Render timestamp, overriding the submitted one and the clock.
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Current time used by validation on construction.
    pub fn now(mut self, now: i64) -> Self {
        self.now = Some(now);
        self
    }

    /// Render tokens as `test-<name>` instead of hashes.
    pub fn test_mode(mut self, enabled: bool) -> Self {
        self.mode = if enabled {
            TokenMode::Test
        } else {
            TokenMode::Hashed
        };
        self
    }
}

/// A negative CAPTCHA bound to one render: secret, timestamp, spinner and
/// token tree, plus the outcome of the latest validation.
///
/// Validation takes `&mut self`; use one instance per request.
#[derive(Debug, Clone)]
pub struct NegativeCaptcha {
    fields: TokenTree,
    values: ValueTree,
    secret: Secret,
    spinner: String,
    spinner_context: Vec<String>,
    message: String,
    timestamp: i64,
    error: Option<Rejection>,
}

impl NegativeCaptcha {
    /// Build an instance, validating `options.params` when they carry a
    /// timestamp or spinner.
    ///
    /// The render timestamp is the explicit override, else the submitted
    /// timestamp, else the current time.
    ///
    /// # Errors
    ///
    /// - [`HoneyformError::ReservedName`] if a top-level field is named
    ///   `timestamp` or `spinner`
    /// - [`HoneyformError::Spec`] if a level of `fields` declares a name twice
    pub fn new(options: CaptchaOptions) -> Result<Self> {
        if let Some(reserved) = options
            .fields
            .iter()
            .map(|decl| decl.name())
            .find(|name| RESERVED_NAMES.contains(name))
        {
            return Err(HoneyformError::ReservedName(reserved.to_string()));
        }

        let secret = options.secret.unwrap_or_else(|| {
            tracing::warn!("no secret configured, using the public fallback secret (dev only)");
            Secret::fallback()
        });
        let now = options.now.unwrap_or_else(unix_now);
        let timestamp = options
            .timestamp
            .or_else(|| options.params.as_ref().and_then(submitted_timestamp))
            .unwrap_or(now);
        let spinner = derive_spinner(timestamp, &secret, &options.spinner_context);
        let fields = build_token_tree(&options.fields, &spinner, &secret, options.mode)?;

        let mut captcha = Self {
            fields,
            values: ValueTree::new(),
            secret,
            spinner,
            spinner_context: options.spinner_context,
            message: options.message.unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            timestamp,
            error: None,
        };
        captcha.error = Some(captcha.reject(RejectionKind::MissingParams));

        if let Some(params) = &options.params {
            if params.contains(TIMESTAMP_PARAM) || params.contains(SPINNER_PARAM) {
                captcha.validate_at(params, now);
            }
        }
        Ok(captcha)
    }

    /// Validate a submission against the current time.
    pub fn validate(&mut self, params: &Params) -> bool {
        self.validate_at(params, unix_now())
    }

    /// Validate a submission at time `now` (Unix seconds).
    ///
    /// Replaces the previous outcome; on rejection the value tree is
    /// emptied. Returns whether the submission is valid.
    pub fn validate_at(&mut self, params: &Params, now: i64) -> bool {
        match validator::validate(&self.fields, &self.spinner, params, now) {
            Ok(values) => {
                self.values = values;
                self.error = None;
            }
            Err(kind) => {
                self.values = ValueTree::new();
                self.error = Some(self.reject(kind));
            }
        }
        self.is_valid()
    }

    /// The token tree to render.
    pub fn fields(&self) -> &TokenTree {
        &self.fields
    }

    /// A top-level entry of the token tree.
    pub fn field(&self, name: &str) -> Option<&Node<String>> {
        self.fields.get(name)
    }

    /// Values from the latest successful validation; empty otherwise.
    pub fn values(&self) -> &ValueTree {
        &self.values
    }

    /// The secret keying this instance.
    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    /// The spinner to render in a hidden field.
    pub fn spinner(&self) -> &str {
        &self.spinner
    }

    /// Context folded into the spinner.
    pub fn spinner_context(&self) -> &[String] {
        &self.spinner_context
    }

    /// The render timestamp to echo in a hidden field.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Hint appended to rejection text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The latest rejection; `None` once a submission validated.
    pub fn error(&self) -> Option<&Rejection> {
        self.error.as_ref()
    }

    /// Rendered rejection text; empty iff valid.
    pub fn error_message(&self) -> String {
        self.error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Whether the latest validation succeeded.
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Token for a field path such as `address[city]`.
    pub fn key_for_field(&self, path: &str) -> Option<&str> {
        self.fields.resolve_leaf(path).map(String::as_str)
    }

    /// Validated value for a field path such as `address[city]`.
    pub fn value_for_field(&self, path: &str) -> Option<&ParamValue> {
        self.values.resolve_leaf(path)
    }

    /// Hidden inputs the renderer must echo back: `(name, value)` pairs for
    /// the timestamp and the spinner.
    pub fn hidden_fields(&self) -> [(&'static str, String); 2] {
        [
            (TIMESTAMP_PARAM, self.timestamp.to_string()),
            (SPINNER_PARAM, self.spinner.clone()),
        ]
    }

    fn reject(&self, kind: RejectionKind) -> Rejection {
        Rejection {
            kind,
            message: self.message.clone(),
        }
    }
}

/// Current Unix time in seconds.
fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}
