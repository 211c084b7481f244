//! Field values
//!
//! What the keyframe forests store. Metadata fields hold `Option<_>`, where
//! `None` means the entity is extinct at that point in history.

use crate::ids::ModuleId;
use biome_versions::{kind, Atom};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Module-level facts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    /// Modules this module imports
    pub dependencies: BTreeSet<ModuleId>,
}

impl ModuleMetadata {
    /// Create metadata with the given dependencies
    #[must_use]
    pub fn new(dependencies: impl IntoIterator<Item = ModuleId>) -> Self {
        Self {
            dependencies: dependencies.into_iter().collect(),
        }
    }
}

/// Symbol-level relationships
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMetadata {
    /// Protocols and superclasses the symbol plays a role in
    pub roles: BTreeSet<Atom<kind::Symbol>>,
    /// Members declared in the symbol's own module
    pub primary: BTreeSet<Atom<kind::Symbol>>,
    /// Members contributed by other modules, by contributing module
    pub accepted: BTreeMap<Atom<kind::Module>, BTreeSet<Atom<kind::Symbol>>>,
}

/// Features an extension attaches to a host symbol
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayMetadata {
    /// Feature symbols
    pub features: BTreeSet<Atom<kind::Symbol>>,
}

/// Article-level facts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    /// Title text
    pub headline: String,
    /// Path components below the module
    pub path: Vec<String>,
}

/// Rendered declaration of a symbol
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Declaration fragments in source order
    pub fragments: Vec<String>,
    /// Generic parameter names
    pub generics: Vec<String>,
    /// Availability annotation
    pub availability: Option<String>,
}

impl Declaration {
    /// A declaration with a single fragment
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            fragments: vec![text.into()],
            ..Self::default()
        }
    }
}

/// Documentation attached to an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Documentation {
    /// Documentation written for this entity
    Comment(String),
    /// Documentation inherited from another symbol
    Inherits(Atom<kind::Symbol>),
}

impl Documentation {
    /// A doc comment
    #[inline]
    #[must_use]
    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment(text.into())
    }
}
