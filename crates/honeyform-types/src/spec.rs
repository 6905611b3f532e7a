//! Declared form shape.
//!
//! A [`FieldSpec`] is an ordered list of declarations, each either a leaf
//! field or a named group of further declarations. Specs are validated on
//! construction: names must be non-empty, free of `[`/`]`, and unique among
//! siblings.
//!
//! ```text
//! FieldSpec::builder()
//!     .leaf("name")
//!     .group("address", |g| g.leaf("city").leaf("zip"))
//!     .build()
//! ```
//!
//! In configuration files the same spec is written as a mixed array of
//! strings and single-key tables:
//!
//! ```toml
//! fields = ["name", { address = ["city", "zip"] }]
//! ```

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Result, SpecError};

/// One declaration in a [`FieldSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDecl {
    /// A single form input.
    Leaf(String),
    /// A named group of inputs, rendered as `name[child]`.
    Group {
        /// Group name, never obfuscated.
        name: String,
        /// Declarations nested in this group.
        children: FieldSpec,
    },
}

impl FieldDecl {
    /// The declared name.
    pub fn name(&self) -> &str {
        match self {
            FieldDecl::Leaf(name) => name,
            FieldDecl::Group { name, .. } => name,
        }
    }
}

/// A validated, ordered form specification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldSpec {
    decls: Vec<FieldDecl>,
}

impl FieldSpec {
    /// Validate a list of declarations.
    ///
    /// Nested [`FieldSpec`]s were validated when they were built, so only
    /// this level is checked.
    pub fn new(decls: Vec<FieldDecl>) -> Result<Self> {
        for (index, decl) in decls.iter().enumerate() {
            check_name(decl.name())?;
            if decls[..index].iter().any(|d| d.name() == decl.name()) {
                return Err(SpecError::DuplicateName {
                    name: decl.name().to_string(),
                });
            }
        }
        Ok(Self { decls })
    }

    /// A flat spec of leaf fields.
    pub fn leaves<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(|n| FieldDecl::Leaf(n.into())).collect())
    }

    /// Start building a spec.
    pub fn builder() -> FieldSpecBuilder {
        FieldSpecBuilder::default()
    }

    /// Declarations at this level.
    pub fn decls(&self) -> &[FieldDecl] {
        &self.decls
    }

    /// Iterate declarations at this level.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldDecl> {
        self.decls.iter()
    }

    /// Number of declarations at this level.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether the spec declares nothing.
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

impl<'a> IntoIterator for &'a FieldSpec {
    type Item = &'a FieldDecl;
    type IntoIter = std::slice::Iter<'a, FieldDecl>;

    fn into_iter(self) -> Self::IntoIter {
        self.decls.iter()
    }
}

fn check_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.contains(['[', ']']) {
        "name contains a bracket"
    } else {
        return Ok(());
    };
    Err(SpecError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

/// Builder for [`FieldSpec`]. Validation runs once, in [`build`].
///
/// [`build`]: FieldSpecBuilder::build
#[derive(Debug, Default)]
pub struct FieldSpecBuilder {
    decls: Vec<PendingDecl>,
}

#[derive(Debug)]
enum PendingDecl {
    Leaf(String),
    Group(String, FieldSpecBuilder),
}

impl FieldSpecBuilder {
    /// Declare a leaf field.
    pub fn leaf(mut self, name: impl Into<String>) -> Self {
        self.decls.push(PendingDecl::Leaf(name.into()));
        self
    }

    /// Declare several leaf fields.
    pub fn leaves<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.decls
            .extend(names.into_iter().map(|n| PendingDecl::Leaf(n.into())));
        self
    }

    /// Declare a group whose children are declared by `children`.
    pub fn group<F>(mut self, name: impl Into<String>, children: F) -> Self
    where
        F: FnOnce(FieldSpecBuilder) -> FieldSpecBuilder,
    {
        self.decls.push(PendingDecl::Group(
            name.into(),
            children(FieldSpecBuilder::default()),
        ));
        self
    }

    /// Validate every level and produce the spec.
    pub fn build(self) -> Result<FieldSpec> {
        let decls = self
            .decls
            .into_iter()
            .map(|decl| match decl {
                PendingDecl::Leaf(name) => Ok(FieldDecl::Leaf(name)),
                PendingDecl::Group(name, children) => Ok(FieldDecl::Group {
                    name,
                    children: children.build()?,
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        FieldSpec::new(decls)
    }
}

/// Loose on-disk form: a name, or a table of group names to children.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDecl {
    Leaf(String),
    Groups(BTreeMap<String, Vec<RawDecl>>),
}

fn from_raw(raw: Vec<RawDecl>) -> Result<FieldSpec> {
    let mut decls = Vec::with_capacity(raw.len());
    for item in raw {
        match item {
            RawDecl::Leaf(name) => decls.push(FieldDecl::Leaf(name)),
            // Tables with several keys declare several groups, in key order.
            RawDecl::Groups(groups) => {
                for (name, children) in groups {
                    decls.push(FieldDecl::Group {
                        name,
                        children: from_raw(children)?,
                    });
                }
            }
        }
    }
    FieldSpec::new(decls)
}

impl<'de> Deserialize<'de> for FieldSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Vec::<RawDecl>::deserialize(deserializer)?;
        from_raw(raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for FieldDecl {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldDecl::Leaf(name) => serializer.serialize_str(name),
            FieldDecl::Group { name, children } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(name, children)?;
                map.end()
            }
        }
    }
}

impl Serialize for FieldSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.decls.serialize(serializer)
    }
}
