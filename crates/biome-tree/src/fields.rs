//! Per-field heads records
//!
//! Every entity kind has a fixed set of historical fields. A heads record
//! holds one optional [`Head`] per field: on the entity's own branch it is
//! the entity's local history, on a descendant branch it is a divergence
//! record, present only for fields the descendant changed.
//!
//! Fields are addressed by plain enums and dispatched with `match`.

use crate::histories::{Erosion, ForestKind};
use biome_history::Head;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Identifier of one historical field
pub trait FieldKey: Copy + Eq + Hash + Debug + 'static {
    /// Forest the field's keyframes live in
    fn forest(self) -> ForestKind;
}

/// One optional head per field of an entity kind
pub trait Heads: Clone + Default + Debug + PartialEq {
    /// Field identifier for this record
    type Field: FieldKey;

    /// Every field, in declaration order
    const FIELDS: &'static [Self::Field];

    /// Head of one field
    fn head(&self, field: Self::Field) -> Option<Head>;

    /// Mutable head of one field
    fn head_mut(&mut self, field: Self::Field) -> &mut Option<Head>;

    /// True exactly when no field has a head
    fn is_empty(&self) -> bool {
        Self::FIELDS.iter().all(|&field| self.head(field).is_none())
    }

    /// Roll every head back through an erosion
    fn revert(&mut self, erosion: &Erosion) {
        for &field in Self::FIELDS {
            erosion.apply(field, self.head_mut(field));
        }
    }

    /// Every present head, with the forest it lives in
    fn present(&self) -> Vec<(ForestKind, Head)> {
        Self::FIELDS
            .iter()
            .filter_map(|&field| self.head(field).map(|head| (field.forest(), head)))
            .collect()
    }
}

/// Module fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleField {
    /// `Option<ModuleMetadata>`
    Metadata,
    /// `BTreeSet<Atom<Symbol>>`
    TopLevelSymbols,
    /// `BTreeSet<Atom<Article>>`
    TopLevelArticles,
    /// `Documentation`
    Documentation,
}

impl FieldKey for ModuleField {
    fn forest(self) -> ForestKind {
        match self {
            Self::Metadata => ForestKind::ModuleMetadata,
            Self::TopLevelSymbols => ForestKind::TopLevelSymbols,
            Self::TopLevelArticles => ForestKind::TopLevelArticles,
            Self::Documentation => ForestKind::Documentation,
        }
    }
}

/// Heads of one module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleHeads {
    metadata: Option<Head>,
    top_level_symbols: Option<Head>,
    top_level_articles: Option<Head>,
    documentation: Option<Head>,
}

impl Heads for ModuleHeads {
    type Field = ModuleField;

    const FIELDS: &'static [ModuleField] = &[
        ModuleField::Metadata,
        ModuleField::TopLevelSymbols,
        ModuleField::TopLevelArticles,
        ModuleField::Documentation,
    ];

    fn head(&self, field: ModuleField) -> Option<Head> {
        match field {
            ModuleField::Metadata => self.metadata,
            ModuleField::TopLevelSymbols => self.top_level_symbols,
            ModuleField::TopLevelArticles => self.top_level_articles,
            ModuleField::Documentation => self.documentation,
        }
    }

    fn head_mut(&mut self, field: ModuleField) -> &mut Option<Head> {
        match field {
            ModuleField::Metadata => &mut self.metadata,
            ModuleField::TopLevelSymbols => &mut self.top_level_symbols,
            ModuleField::TopLevelArticles => &mut self.top_level_articles,
            ModuleField::Documentation => &mut self.documentation,
        }
    }
}

/// Symbol fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolField {
    /// `Option<SymbolMetadata>`
    Metadata,
    /// `Declaration`
    Declaration,
    /// `Documentation`
    Documentation,
}

impl FieldKey for SymbolField {
    fn forest(self) -> ForestKind {
        match self {
            Self::Metadata => ForestKind::SymbolMetadata,
            Self::Declaration => ForestKind::Declaration,
            Self::Documentation => ForestKind::Documentation,
        }
    }
}

/// Heads of one symbol
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolHeads {
    metadata: Option<Head>,
    declaration: Option<Head>,
    documentation: Option<Head>,
}

impl Heads for SymbolHeads {
    type Field = SymbolField;

    const FIELDS: &'static [SymbolField] = &[
        SymbolField::Metadata,
        SymbolField::Declaration,
        SymbolField::Documentation,
    ];

    fn head(&self, field: SymbolField) -> Option<Head> {
        match field {
            SymbolField::Metadata => self.metadata,
            SymbolField::Declaration => self.declaration,
            SymbolField::Documentation => self.documentation,
        }
    }

    fn head_mut(&mut self, field: SymbolField) -> &mut Option<Head> {
        match field {
            SymbolField::Metadata => &mut self.metadata,
            SymbolField::Declaration => &mut self.declaration,
            SymbolField::Documentation => &mut self.documentation,
        }
    }
}

/// Article fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArticleField {
    /// `Option<ArticleMetadata>`
    Metadata,
    /// `Documentation`
    Documentation,
}

impl FieldKey for ArticleField {
    fn forest(self) -> ForestKind {
        match self {
            Self::Metadata => ForestKind::ArticleMetadata,
            Self::Documentation => ForestKind::Documentation,
        }
    }
}

/// Heads of one article
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleHeads {
    metadata: Option<Head>,
    documentation: Option<Head>,
}

impl Heads for ArticleHeads {
    type Field = ArticleField;

    const FIELDS: &'static [ArticleField] = &[ArticleField::Metadata, ArticleField::Documentation];

    fn head(&self, field: ArticleField) -> Option<Head> {
        match field {
            ArticleField::Metadata => self.metadata,
            ArticleField::Documentation => self.documentation,
        }
    }

    fn head_mut(&mut self, field: ArticleField) -> &mut Option<Head> {
        match field {
            ArticleField::Metadata => &mut self.metadata,
            ArticleField::Documentation => &mut self.documentation,
        }
    }
}

/// Overlay fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayField {
    /// `Option<OverlayMetadata>`
    Metadata,
}

impl FieldKey for OverlayField {
    fn forest(self) -> ForestKind {
        match self {
            Self::Metadata => ForestKind::OverlayMetadata,
        }
    }
}

/// Heads of one diacritic's overlay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayHeads {
    metadata: Option<Head>,
}

impl Heads for OverlayHeads {
    type Field = OverlayField;

    const FIELDS: &'static [OverlayField] = &[OverlayField::Metadata];

    fn head(&self, field: OverlayField) -> Option<Head> {
        match field {
            OverlayField::Metadata => self.metadata,
        }
    }

    fn head_mut(&mut self, field: OverlayField) -> &mut Option<Head> {
        match field {
            OverlayField::Metadata => &mut self.metadata,
        }
    }
}
