//! Configuration file management.
//!
//! ```toml
//! secret = "0f1e..."
//! message = "Please reload the page and try again."
//! spinner_context = ["checkout"]
//! test_mode = false
//! fields = ["name", "email", { address = ["city", "zip"] }]
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::captcha::{CaptchaOptions, DEFAULT_MESSAGE};
use crate::{FieldSpec, Result};

/// Environment variable overriding an empty `secret`.
pub const SECRET_ENV: &str = "HONEYFORM_SECRET";

/// Captcha configuration for one form.
///
/// `Debug` output redacts the secret.
#[derive(Clone, Serialize, Deserialize)]
pub struct CaptchaConfig {
    /// Secret keying every derivation. Empty = `$HONEYFORM_SECRET`, then the
    /// public fallback.
    #[serde(default)]
    pub secret: String,
    /// Hint appended to rejection text.
    #[serde(default = "default_message")]
    pub message: String,
    /// Extra strings folded into the spinner.
    #[serde(default)]
    pub spinner_context: Vec<String>,
    /// Render `test-<name>` tokens. Never enable in production.
    #[serde(default)]
    pub test_mode: bool,
    /// Declared form fields.
    #[serde(default)]
    pub fields: FieldSpec,
}

fn default_message() -> String {
    DEFAULT_MESSAGE.to_string()
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            message: default_message(),
            spinner_context: Vec::new(),
            test_mode: false,
            fields: FieldSpec::default(),
        }
    }
}

impl fmt::Debug for CaptchaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = if self.secret.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("CaptchaConfig")
            .field("secret", &secret)
            .field("message", &self.message)
            .field("spinner_context", &self.spinner_context)
            .field("test_mode", &self.test_mode)
            .field("fields", &self.fields)
            .finish()
    }
}

impl CaptchaConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from `path`.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml_str(&content)
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// The configured secret, else `$HONEYFORM_SECRET`, if either is set.
    pub fn resolved_secret(&self) -> Option<String> {
        if !self.secret.is_empty() {
            return Some(self.secret.clone());
        }
        std::env::var(SECRET_ENV).ok().filter(|s| !s.is_empty())
    }

    /// Construction options for a render or submission of this form.
    pub fn options(&self) -> CaptchaOptions {
        let mut options = CaptchaOptions::new(self.fields.clone())
            .message(self.message.clone())
            .spinner_context(self.spinner_context.iter().cloned())
            .test_mode(self.test_mode);
        if let Some(secret) = self.resolved_secret() {
            options = options.secret(secret);
        }
        options
    }
}
