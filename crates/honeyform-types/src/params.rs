//! Submitted form parameters.
//!
//! A submission is a [`Tree`] of strings with the same nesting as HTML
//! form-encoded parameters (`name`, `group[child]`, `group[child][leaf]`).
//!
//! Nesting is capped at [`MAX_PARAM_DEPTH`] segments. Deeper keys and JSON
//! values are dropped on the way in, so every later walk over a submission
//! is bounded.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::path::parse_path;
use crate::tree::{Node, Tree};

/// Maximum number of segments in one submitted key (`a[b][c]` has three).
pub const MAX_PARAM_DEPTH: usize = 32;

/// A submitted parameter tree.
pub type Params = Tree<String>;

/// A single submitted value: a string, or a nested mapping of values.
pub type ParamValue = Node<String>;

impl Node<String> {
    /// The submitted string, if this value is not a mapping.
    pub fn as_str(&self) -> Option<&str> {
        self.as_leaf().map(String::as_str)
    }

    /// Whether any string in this value, at any depth, has a
    /// non-whitespace character.
    pub fn has_non_blank(&self) -> bool {
        match self {
            Node::Leaf(value) => !is_blank(value),
            Node::Group(tree) => tree.iter().any(|(_, node)| node.has_non_blank()),
        }
    }
}

impl Tree<String> {
    /// Assemble parameters from decoded form key/value pairs.
    ///
    /// Keys use bracket notation. A later pair overwrites an earlier one at
    /// the same path, and a nested key overwrites a plain string under its
    /// parent name (and the reverse). Keys with no segments, and keys with
    /// more than [`MAX_PARAM_DEPTH`] segments, are skipped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Params::new();
        for (key, value) in pairs {
            insert_path(&mut params, &parse_path(key.as_ref()), value.into());
        }
        params
    }

    /// The string submitted directly under `name`, if any.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Node::as_str)
    }
}

/// Whether `value` is empty or whitespace only.
pub fn is_blank(value: &str) -> bool {
    value.chars().all(char::is_whitespace)
}

fn insert_path(tree: &mut Params, segments: &[&str], value: String) {
    if segments.len() > MAX_PARAM_DEPTH {
        tracing::debug!(
            depth = segments.len(),
            limit = MAX_PARAM_DEPTH,
            "dropping over-nested parameter"
        );
        return;
    }
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut level = tree;
    for segment in parents {
        let slot = level.get_or_insert_with(*segment, || Node::Group(Tree::new()));
        if !slot.is_group() {
            *slot = Node::Group(Tree::new());
        }
        let Some(child) = slot.as_group_mut() else {
            return;
        };
        level = child;
    }
    level.insert(*last, Node::Leaf(value));
}

/// JSON-ish shape accepted on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawParam {
    Null,
    Text(String),
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    List(Vec<RawParam>),
    Map(BTreeMap<String, RawParam>),
}

impl RawParam {
    /// Convert a value found `depth` segments below the top level.
    fn into_node(self, depth: usize) -> Option<ParamValue> {
        if depth > MAX_PARAM_DEPTH {
            return None;
        }
        let node = match self {
            RawParam::Null => return None,
            RawParam::Text(value) => Node::Leaf(value),
            RawParam::Bool(value) => Node::Leaf(value.to_string()),
            RawParam::Integer(value) => Node::Leaf(value.to_string()),
            RawParam::Unsigned(value) => Node::Leaf(value.to_string()),
            RawParam::Float(value) => Node::Leaf(value.to_string()),
            RawParam::List(items) => Node::Group(
                items
                    .into_iter()
                    .enumerate()
                    .filter_map(|(index, item)| {
                        Some((index.to_string(), item.into_node(depth + 1)?))
                    })
                    .collect(),
            ),
            RawParam::Map(entries) => Node::Group(collect_entries(entries, depth + 1)),
        };
        Some(node)
    }
}

fn collect_entries(entries: BTreeMap<String, RawParam>, depth: usize) -> Params {
    entries
        .into_iter()
        .filter_map(|(name, raw)| Some((name, raw.into_node(depth)?)))
        .collect()
}

impl<'de> Deserialize<'de> for Tree<String> {
    /// Objects become groups, strings become values. Numbers and booleans
    /// are kept as their string form, arrays become groups keyed by index,
    /// and `null` entries are dropped, as are values nested deeper than
    /// [`MAX_PARAM_DEPTH`].
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, RawParam>::deserialize(deserializer)?;
        Ok(collect_entries(entries, 1))
    }
}
