//! Branch elements
//!
//! The entity kinds stored in intrinsic buffers. [`BranchElement`] ties each
//! kind to its identifier, its heads record, its buffer on a [`Branch`] and
//! its metadata forest, so buffer and trunk code is written once and
//! monomorphized per kind.

use crate::branch::Branch;
use crate::buffer::IntrinsicBuffer;
use crate::fields::{ArticleField, ArticleHeads, Heads, ModuleField, ModuleHeads, SymbolField, SymbolHeads};
use crate::histories::Histories;
use crate::ids::{ArticleId, ModuleId, SymbolId};
use crate::ring::Ring;
use crate::values::{ArticleMetadata, ModuleMetadata, SymbolMetadata};
use biome_history::History;
use biome_versions::{kind, Atom, Kind, PackageIndex};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// An entity kind stored in a branch's intrinsic buffer
pub trait BranchElement: Clone + Debug + 'static {
    /// Atom kind
    type Kind: Kind;
    /// External identifier
    type Id: Clone + Eq + Hash + Debug;
    /// Per-field heads record
    type Heads: Heads;
    /// Metadata value; `None` in the forest marks extinction
    type Metadata: PartialEq + Debug;

    /// Field holding the metadata
    const METADATA: <Self::Heads as Heads>::Field;

    /// External identifier
    fn id(&self) -> &Self::Id;

    /// Culture the entity was created under
    fn culture(&self) -> <Self::Kind as Kind>::Culture;

    /// This kind's buffer on a branch
    fn buffer(branch: &Branch) -> &IntrinsicBuffer<Self>;

    /// This kind's buffer on a branch, mutably
    fn buffer_mut(branch: &mut Branch) -> &mut IntrinsicBuffer<Self>;

    /// This kind's end offset in a ring
    fn end(ring: &Ring) -> u32;

    /// Forest holding this kind's metadata
    fn metadata(histories: &Histories) -> &History<Option<Self::Metadata>>;

    /// Forest holding this kind's metadata, mutably
    fn metadata_mut(histories: &mut Histories) -> &mut History<Option<Self::Metadata>>;
}

/// A module of a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    id: ModuleId,
    culture: PackageIndex,
}

impl Module {
    /// Create a module
    #[inline]
    #[must_use]
    pub fn new(id: ModuleId, culture: PackageIndex) -> Self {
        Self { id, culture }
    }
}

impl BranchElement for Module {
    type Kind = kind::Module;
    type Id = ModuleId;
    type Heads = ModuleHeads;
    type Metadata = ModuleMetadata;

    const METADATA: ModuleField = ModuleField::Metadata;

    fn id(&self) -> &ModuleId {
        &self.id
    }

    fn culture(&self) -> PackageIndex {
        self.culture
    }

    fn buffer(branch: &Branch) -> &IntrinsicBuffer<Self> {
        &branch.modules
    }

    fn buffer_mut(branch: &mut Branch) -> &mut IntrinsicBuffer<Self> {
        &mut branch.modules
    }

    fn end(ring: &Ring) -> u32 {
        ring.modules
    }

    fn metadata(histories: &Histories) -> &History<Option<ModuleMetadata>> {
        &histories.module_metadata
    }

    fn metadata_mut(histories: &mut Histories) -> &mut History<Option<ModuleMetadata>> {
        &mut histories.module_metadata
    }
}

/// A declared symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    id: SymbolId,
    culture: Atom<kind::Module>,
    /// Lexical path, outermost scope first
    pub path: Vec<String>,
}

impl Symbol {
    /// Create a symbol
    #[must_use]
    pub fn new(id: SymbolId, culture: Atom<kind::Module>, path: Vec<String>) -> Self {
        Self { id, culture, path }
    }
}

impl BranchElement for Symbol {
    type Kind = kind::Symbol;
    type Id = SymbolId;
    type Heads = SymbolHeads;
    type Metadata = SymbolMetadata;

    const METADATA: SymbolField = SymbolField::Metadata;

    fn id(&self) -> &SymbolId {
        &self.id
    }

    fn culture(&self) -> Atom<kind::Module> {
        self.culture
    }

    fn buffer(branch: &Branch) -> &IntrinsicBuffer<Self> {
        &branch.symbols
    }

    fn buffer_mut(branch: &mut Branch) -> &mut IntrinsicBuffer<Self> {
        &mut branch.symbols
    }

    fn end(ring: &Ring) -> u32 {
        ring.symbols
    }

    fn metadata(histories: &Histories) -> &History<Option<SymbolMetadata>> {
        &histories.symbol_metadata
    }

    fn metadata_mut(histories: &mut Histories) -> &mut History<Option<SymbolMetadata>> {
        &mut histories.symbol_metadata
    }
}

/// A standalone documentation article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    id: ArticleId,
    culture: Atom<kind::Module>,
    /// Article file stem
    pub name: String,
}

impl Article {
    /// Create an article
    #[must_use]
    pub fn new(id: ArticleId, culture: Atom<kind::Module>, name: impl Into<String>) -> Self {
        Self {
            id,
            culture,
            name: name.into(),
        }
    }
}

impl BranchElement for Article {
    type Kind = kind::Article;
    type Id = ArticleId;
    type Heads = ArticleHeads;
    type Metadata = ArticleMetadata;

    const METADATA: ArticleField = ArticleField::Metadata;

    fn id(&self) -> &ArticleId {
        &self.id
    }

    fn culture(&self) -> Atom<kind::Module> {
        self.culture
    }

    fn buffer(branch: &Branch) -> &IntrinsicBuffer<Self> {
        &branch.articles
    }

    fn buffer_mut(branch: &mut Branch) -> &mut IntrinsicBuffer<Self> {
        &mut branch.articles
    }

    fn end(ring: &Ring) -> u32 {
        ring.articles
    }

    fn metadata(histories: &Histories) -> &History<Option<ArticleMetadata>> {
        &histories.article_metadata
    }

    fn metadata_mut(histories: &mut Histories) -> &mut History<Option<ArticleMetadata>> {
        &mut histories.article_metadata
    }
}
