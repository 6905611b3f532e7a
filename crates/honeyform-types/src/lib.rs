//! # honeyform-types
//!
//! Shared data types for the honeyform workspace: the declared shape of a
//! form, the ordered trees derived from it, and submitted parameters.

pub mod params;
pub mod path;
pub mod spec;
pub mod tree;

pub use params::{ParamValue, Params, MAX_PARAM_DEPTH};
pub use path::parse_path;
pub use spec::{FieldDecl, FieldSpec, FieldSpecBuilder};
pub use tree::{Node, Tree};

/// Errors raised for malformed field specifications.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    /// Two declarations share one name at the same level.
    #[error("duplicate field name {name:?} at one level")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },

    /// A name that could never be addressed in a submission.
    #[error("invalid field name {name:?}: {reason}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Convenience result type for field declaration operations.
pub type Result<T> = std::result::Result<T, SpecError>;
