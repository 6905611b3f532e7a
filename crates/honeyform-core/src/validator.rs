//! Submission validation.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. Timestamp: present, numeric, within [`TIMESTAMP_WINDOW_SECS`] of now
//! 2. Spinner: equal to the spinner derived for the render
//! 3. Honeypot: no non-blank value under any plain field name
//! 4. Values are extracted from the token-named entries
//!
//! Whitespace-only values under plain names are tolerated; browser autofill
//! sometimes writes them into hidden inputs.

use honeyform_types::params::is_blank;
use honeyform_types::{Node, ParamValue, Params, Tree};
use serde::Serialize;

use crate::tokens::TokenTree;

/// Maximum distance between the submitted timestamp and now, in seconds.
pub const TIMESTAMP_WINDOW_SECS: u64 = 86_400;

/// Parameter carrying the render timestamp.
pub const TIMESTAMP_PARAM: &str = "timestamp";

/// Parameter carrying the render spinner.
pub const SPINNER_PARAM: &str = "spinner";

/// Validated values keyed by plain field names.
pub type ValueTree = Tree<ParamValue>;

/// Why a submission was rejected.
///
/// Callers translating messages should match on this rather than on the
/// rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// Nothing has been submitted yet.
    #[error("No params provided")]
    MissingParams,

    /// Timestamp missing, unparseable, or outside the window.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Spinner missing or different from the derived one.
    #[error("Invalid spinner")]
    InvalidSpinner,

    /// A honeypot field was filled in.
    #[error("Hidden form fields were submitted that should not have been")]
    InvalidFields,
}

/// A rejection with the caller's hint attached.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Error: {kind}.  {message}")]
pub struct Rejection {
    /// Classification of the failure.
    pub kind: RejectionKind,
    /// Caller-supplied hint appended to the rendered text.
    pub message: String,
}

/// The timestamp submitted with `params`, if present and numeric.
pub fn submitted_timestamp(params: &Params) -> Option<i64> {
    params.value(TIMESTAMP_PARAM)?.trim().parse().ok()
}

/// Validate `params` against a render's tokens and spinner at time `now`.
///
/// # Errors
///
/// - [`RejectionKind::InvalidTimestamp`] if the timestamp is missing or stale
/// - [`RejectionKind::InvalidSpinner`] if the spinner does not match
/// - [`RejectionKind::InvalidFields`] if a honeypot field was filled
pub fn validate(
    tokens: &TokenTree,
    spinner: &str,
    params: &Params,
    now: i64,
) -> Result<ValueTree, RejectionKind> {
    let outcome = run_checks(tokens, spinner, params, now);
    match &outcome {
        Ok(values) => tracing::info!(
            declared = tokens.leaf_count(),
            submitted = values.leaf_count(),
            "submission accepted"
        ),
        Err(kind) => tracing::debug!(?kind, "submission rejected"),
    }
    outcome
}

fn run_checks(
    tokens: &TokenTree,
    spinner: &str,
    params: &Params,
    now: i64,
) -> Result<ValueTree, RejectionKind> {
    check_timestamp(params, now)?;
    check_spinner(params, spinner)?;
    if honeypot_triggered(tokens, params) {
        return Err(RejectionKind::InvalidFields);
    }
    Ok(extract_values(tokens, params))
}

fn check_timestamp(params: &Params, now: i64) -> Result<(), RejectionKind> {
    match submitted_timestamp(params) {
        Some(timestamp) if now.abs_diff(timestamp) <= TIMESTAMP_WINDOW_SECS => Ok(()),
        _ => Err(RejectionKind::InvalidTimestamp),
    }
}

fn check_spinner(params: &Params, spinner: &str) -> Result<(), RejectionKind> {
    if params.value(SPINNER_PARAM) == Some(spinner) {
        Ok(())
    } else {
        Err(RejectionKind::InvalidSpinner)
    }
}

/// Whether any declared field carries a non-blank value under its plain
/// name.
///
/// Fields and parameters are walked together level by level. A leaf trips
/// on any non-blank string under its name, however deeply nested; a group
/// trips on a non-blank string in place of its mapping.
pub fn honeypot_triggered(tokens: &TokenTree, params: &Params) -> bool {
    let mut triggered = false;
    tokens.walk_with(params, |path, field, submitted| {
        let tripped = match (field, submitted) {
            (_, None) => false,
            (Node::Leaf(_), Some(value)) => value.has_non_blank(),
            (Node::Group(_), Some(value)) => value.as_str().is_some_and(|v| !is_blank(v)),
        };
        if tripped {
            tracing::debug!(field = %bracket_path(path), "honeypot field filled");
            triggered = true;
        }
    });
    triggered
}

/// Copy token-named entries into a tree keyed by plain names.
///
/// Every declared group appears in the result, even with no values; leaves
/// that were not submitted are left out.
pub fn extract_values(tokens: &TokenTree, params: &Params) -> ValueTree {
    let empty = Params::new();
    let mut values = ValueTree::new();
    for (name, node) in tokens.iter() {
        match node {
            Node::Leaf(token) => {
                if let Some(value) = params.get(token) {
                    values.insert(name, Node::Leaf(value.clone()));
                }
            }
            Node::Group(children) => {
                let nested = params.get(name).and_then(Node::as_group).unwrap_or(&empty);
                values.insert(name, Node::Group(extract_values(children, nested)));
            }
        }
    }
    values
}

fn bracket_path(path: &[&str]) -> String {
    let mut rendered = String::new();
    for (index, segment) in path.iter().enumerate() {
        if index == 0 {
            rendered.push_str(segment);
        } else {
            rendered.push('[');
            rendered.push_str(segment);
            rendered.push(']');
        }
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{build_token_tree, TokenMode};
    use honeyform_crypto::Secret;
    use honeyform_types::FieldSpec;

    const NOW: i64 = 1_700_000_000;
    const SPINNER: &str = "spinner-value";

    fn tokens() -> TokenTree {
        let spec = FieldSpec::builder()
            .leaf("name")
            .group("nest", |g| g.leaf("two").group("deep", |g| g.leaf("three")))
            .build()
            .expect("spec");
        build_token_tree(&spec, SPINNER, &Secret::new("secret"), TokenMode::Test)
            .expect("tokens")
    }

    fn submission(extra: &[(&str, &str)]) -> Params {
        let timestamp = NOW.to_string();
        let mut pairs: Vec<(&str, &str)> = vec![
            ("timestamp", timestamp.as_str()),
            ("spinner", SPINNER),
            ("test-name", "Ada"),
            ("nest[test-two]", "2"),
            ("nest[deep][test-three]", "3"),
        ];
        pairs.extend_from_slice(extra);
        Params::from_pairs(pairs)
    }

    #[test]
    fn test_valid_submission_extracts_values() {
        let values = validate(&tokens(), SPINNER, &submission(&[]), NOW).expect("valid");
        assert_eq!(values.resolve_leaf("name").and_then(Node::as_str), Some("Ada"));
        assert_eq!(
            values
                .resolve_leaf("nest[deep][three]")
                .and_then(Node::as_str),
            Some("3")
        );
    }

    #[test]
    fn test_timestamp_window_boundary() {
        let window = TIMESTAMP_WINDOW_SECS as i64;
        let params = submission(&[]);
        assert!(validate(&tokens(), SPINNER, &params, NOW + window).is_ok());
        assert!(validate(&tokens(), SPINNER, &params, NOW - window).is_ok());
        assert_eq!(
            validate(&tokens(), SPINNER, &params, NOW + window + 1).expect_err("stale"),
            RejectionKind::InvalidTimestamp
        );
        assert_eq!(
            validate(&tokens(), SPINNER, &params, NOW - window - 1).expect_err("future"),
            RejectionKind::InvalidTimestamp
        );
    }

    #[test]
    fn test_missing_or_garbled_timestamp() {
        let params = Params::from_pairs([("spinner", SPINNER)]);
        assert_eq!(
            validate(&tokens(), SPINNER, &params, NOW).expect_err("missing"),
            RejectionKind::InvalidTimestamp
        );
        let params = Params::from_pairs([("spinner", SPINNER), ("timestamp", "soon")]);
        assert_eq!(
            validate(&tokens(), SPINNER, &params, NOW).expect_err("garbled"),
            RejectionKind::InvalidTimestamp
        );
    }

    #[test]
    fn test_spinner_mismatch() {
        let mut params = submission(&[]);
        params.insert("spinner", Node::Leaf("spinner-valuf".to_string()));
        assert_eq!(
            validate(&tokens(), SPINNER, &params, NOW).expect_err("spinner"),
            RejectionKind::InvalidSpinner
        );
        let mut params = submission(&[]);
        let nested: Params = Params::from_pairs([("x", SPINNER)]);
        params.insert("spinner", Node::Group(nested));
        assert_eq!(
            validate(&tokens(), SPINNER, &params, NOW).expect_err("spinner"),
            RejectionKind::InvalidSpinner
        );
    }

    #[test]
    fn test_first_failure_wins() {
        let params = Params::from_pairs([("spinner", "wrong"), ("name", "bot")]);
        assert_eq!(
            validate(&tokens(), SPINNER, &params, NOW).expect_err("timestamp first"),
            RejectionKind::InvalidTimestamp
        );
        let timestamp = NOW.to_string();
        let params = Params::from_pairs([
            ("timestamp", timestamp.as_str()),
            ("spinner", "wrong"),
            ("name", "bot"),
        ]);
        assert_eq!(
            validate(&tokens(), SPINNER, &params, NOW).expect_err("spinner second"),
            RejectionKind::InvalidSpinner
        );
    }

    #[test]
    fn test_honeypot_top_level() {
        let params = submission(&[("name", "Bot")]);
        assert!(honeypot_triggered(&tokens(), &params));
        assert_eq!(
            validate(&tokens(), SPINNER, &params, NOW).expect_err("honeypot"),
            RejectionKind::InvalidFields
        );
    }

    #[test]
    fn test_honeypot_nested_leaf() {
        let params = submission(&[("nest[deep][three]", "x")]);
        assert!(honeypot_triggered(&tokens(), &params));
    }

    #[test]
    fn test_honeypot_mapping_under_leaf_name() {
        let params = submission(&[("name[anything]", "x")]);
        assert!(honeypot_triggered(&tokens(), &params));
    }

    #[test]
    fn test_honeypot_string_in_place_of_group() {
        let timestamp = NOW.to_string();
        let params = Params::from_pairs([
            ("timestamp", timestamp.as_str()),
            ("spinner", SPINNER),
            ("nest", "flat"),
        ]);
        assert!(honeypot_triggered(&tokens(), &params));
    }

    #[test]
    fn test_whitespace_tolerated() {
        let params = submission(&[
            ("name", " "),
            ("nest[two]", "\r\n"),
            ("nest[deep][three]", "\n"),
        ]);
        assert!(!honeypot_triggered(&tokens(), &params));
        assert!(validate(&tokens(), SPINNER, &params, NOW).is_ok());
    }

    #[test]
    fn test_undeclared_names_ignored() {
        let params = submission(&[("utf8", "✓"), ("commit", "Send")]);
        assert!(!honeypot_triggered(&tokens(), &params));
    }

    #[test]
    fn test_missing_leaf_absent_groups_present() {
        let timestamp = NOW.to_string();
        let params = Params::from_pairs([("timestamp", timestamp.as_str()), ("spinner", SPINNER)]);
        let values = validate(&tokens(), SPINNER, &params, NOW).expect("valid");
        assert!(values.get("name").is_none());
        let nest = values.resolve("nest").and_then(Node::as_group).expect("nest");
        assert!(nest.get("two").is_none());
        let deep = nest.get("deep").and_then(Node::as_group).expect("deep");
        assert!(deep.is_empty());
    }

    #[test]
    fn test_rejection_display() {
        let rejection = Rejection {
            kind: RejectionKind::InvalidSpinner,
            message: "Please try again.".to_string(),
        };
        assert_eq!(
            rejection.to_string(),
            "Error: Invalid spinner.  Please try again."
        );
    }

    #[test]
    fn test_bracket_path() {
        assert_eq!(bracket_path(&["a"]), "a");
        assert_eq!(bracket_path(&["a", "b", "c"]), "a[b][c]");
    }
}
