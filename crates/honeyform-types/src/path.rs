//! Bracket-notation field paths.
//!
//! A path such as `address[street][line1]` names the leaf `line1` inside the
//! group `street` inside the group `address`. This is the same notation HTML
//! form-encoded parameters use for nested names.

use crate::tree::{Node, Tree};

/// Split a bracket-notation path into its segments.
///
/// Delimiters are `[`, `][` and `]`; consecutive delimiters never produce
/// empty segments, so `a[b][c]`, `a[b]][c` and `a[b][c][]` all yield
/// `["a", "b", "c"]`.
pub fn parse_path(path: &str) -> Vec<&str> {
    path.split(['[', ']'])
        .filter(|segment| !segment.is_empty())
        .collect()
}

impl<T> Tree<T> {
    /// Resolve a bracket-notation path to the node it names.
    ///
    /// Returns `None` when a segment is missing, when the path tries to
    /// descend through a leaf, or when the path has no segments.
    pub fn resolve(&self, path: &str) -> Option<&Node<T>> {
        let mut segments = parse_path(path).into_iter();
        let mut node = self.get(segments.next()?)?;
        for segment in segments {
            node = node.as_group()?.get(segment)?;
        }
        Some(node)
    }

    /// Resolve a path that must end at a leaf.
    pub fn resolve_leaf(&self, path: &str) -> Option<&T> {
        self.resolve(path).and_then(Node::as_leaf)
    }
}
