//! Ordered name trees.
//!
//! A [`Tree`] maps names to [`Node`]s, where a node is either a leaf value
//! or a nested group. The same shape carries field tokens, validated values
//! and submitted parameters:
//!
//! | Alias        | Leaf payload               |
//! |--------------|----------------------------|
//! | token tree   | `String` (opaque token)    |
//! | [`Params`]   | `String` (submitted value) |
//! | value tree   | [`ParamValue`]             |
//!
//! Entries keep insertion order so a renderer can emit fields in the order
//! they were declared.
//!
//! [`Params`]: crate::Params
//! [`ParamValue`]: crate::ParamValue

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::{Result, SpecError};

/// One entry of a [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<T> {
    /// A leaf carrying a payload.
    Leaf(T),
    /// A named group of further entries.
    Group(Tree<T>),
}

impl<T> Node<T> {
    /// The leaf payload, if this is a leaf.
    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Group(_) => None,
        }
    }

    /// The nested tree, if this is a group.
    pub fn as_group(&self) -> Option<&Tree<T>> {
        match self {
            Node::Leaf(_) => None,
            Node::Group(tree) => Some(tree),
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut Tree<T>> {
        match self {
            Node::Leaf(_) => None,
            Node::Group(tree) => Some(tree),
        }
    }

    /// Whether this node is a group.
    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }
}

/// An insertion-ordered mapping from names to [`Node`]s.
///
/// Lookups are constant time. Equality compares entries regardless of
/// their order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree<T> {
    entries: IndexMap<String, Node<T>>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<T> Tree<T> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `node` under `name`, replacing an existing entry in place.
    ///
    /// Returns the replaced node, if any.
    pub fn insert(&mut self, name: impl Into<String>, node: Node<T>) -> Option<Node<T>> {
        self.entries.insert(name.into(), node)
    }

    /// Insert `node` under `name`, rejecting a name already present.
    pub fn try_insert(&mut self, name: impl Into<String>, node: Node<T>) -> Result<()> {
        match self.entries.entry(name.into()) {
            Entry::Occupied(occupied) => Err(SpecError::DuplicateName {
                name: occupied.key().clone(),
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(node);
                Ok(())
            }
        }
    }

    /// The entry under `name`, inserting `default()` first if absent.
    pub fn get_or_insert_with<F>(&mut self, name: impl Into<String>, default: F) -> &mut Node<T>
    where
        F: FnOnce() -> Node<T>,
    {
        self.entries.entry(name.into()).or_insert_with(default)
    }

    /// Look up a direct child by name.
    pub fn get(&self, name: &str) -> Option<&Node<T>> {
        self.entries.get(name)
    }

    /// Mutable lookup of a direct child by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node<T>> {
        self.entries.get_mut(name)
    }

    /// Whether a direct child named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate direct children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node<T>)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    /// Names of the direct children in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree has no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of leaves at every depth.
    pub fn leaf_count(&self) -> usize {
        self.entries
            .values()
            .map(|node| match node {
                Node::Leaf(_) => 1,
                Node::Group(tree) => tree.leaf_count(),
            })
            .sum()
    }

    /// Walk this tree depth-first in lock-step with `other`.
    ///
    /// `visit` is called for every node of `self` (groups before their
    /// children) with the node's path, the node, and the node at the same
    /// position in `other`, if there is one. Descending into a group of
    /// `self` continues in `other` only while `other` also has a group there.
    pub fn walk_with<U, F>(&self, other: &Tree<U>, mut visit: F)
    where
        F: FnMut(&[&str], &Node<T>, Option<&Node<U>>),
    {
        let mut path = Vec::new();
        self.walk_inner(Some(other), &mut path, &mut visit);
    }

    fn walk_inner<'a, U, F>(
        &'a self,
        other: Option<&Tree<U>>,
        path: &mut Vec<&'a str>,
        visit: &mut F,
    ) where
        F: FnMut(&[&str], &Node<T>, Option<&Node<U>>),
    {
        for (name, node) in &self.entries {
            let theirs = other.and_then(|tree| tree.get(name));
            path.push(name);
            visit(path, node, theirs);
            if let Node::Group(children) = node {
                children.walk_inner(theirs.and_then(Node::as_group), path, visit);
            }
            path.pop();
        }
    }
}

impl<T> FromIterator<(String, Node<T>)> for Tree<T> {
    /// Collect entries; a repeated name replaces the earlier entry.
    fn from_iter<I: IntoIterator<Item = (String, Node<T>)>>(iter: I) -> Self {
        let mut tree = Tree::new();
        for (name, node) in iter {
            tree.insert(name, node);
        }
        tree
    }
}

impl<T: Serialize> Serialize for Tree<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, node) in &self.entries {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

impl<T: Serialize> Serialize for Node<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Node::Leaf(value) => value.serialize(serializer),
            Node::Group(tree) => tree.serialize(serializer),
        }
    }
}
