//! Field token trees.
//!
//! Every leaf of a [`FieldSpec`] gets an opaque token derived from its name,
//! the spinner and the secret. Group names are kept verbatim, so a field
//! `address[city]` is rendered as `address[<token>]`.

use honeyform_crypto::{KeyedHasher, Secret};
use honeyform_types::{FieldDecl, FieldSpec, Node, SpecError, Tree};

/// Field names mapped to their rendered tokens.
pub type TokenTree = Tree<String>;

/// Prefix of tokens in [`TokenMode::Test`].
pub const TEST_TOKEN_PREFIX: &str = "test-";

/// How leaf tokens are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenMode {
    /// Keyed hash of (name, spinner) under the secret.
    #[default]
    Hashed,
    /// `"test-" + name`, for fixtures that should not depend on hashes.
    Test,
}

/// Build the token tree for `spec`.
///
/// # Errors
///
/// - [`SpecError::DuplicateName`] if a level declares a name twice
pub fn build_token_tree(
    spec: &FieldSpec,
    spinner: &str,
    secret: &Secret,
    mode: TokenMode,
) -> Result<TokenTree, SpecError> {
    let hasher = KeyedHasher::field_token(secret.as_bytes());
    let token_for = |name: &str| match mode {
        TokenMode::Hashed => hasher.hash(&[name, spinner]),
        TokenMode::Test => format!("{TEST_TOKEN_PREFIX}{name}"),
    };
    build_level(spec, &token_for)
}

fn build_level<F>(spec: &FieldSpec, token_for: &F) -> Result<TokenTree, SpecError>
where
    F: Fn(&str) -> String,
{
    let mut tree = TokenTree::new();
    for decl in spec {
        match decl {
            FieldDecl::Leaf(name) => {
                tree.try_insert(name.as_str(), Node::Leaf(token_for(name.as_str())))?;
            }
            FieldDecl::Group { name, children } => {
                tree.try_insert(name.as_str(), Node::Group(build_level(children, token_for)?))?;
            }
        }
    }
    Ok(tree)
}
