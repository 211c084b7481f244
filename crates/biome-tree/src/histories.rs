//! Keyframe forests of one package
//!
//! Each value type gets its own typed [`History`]. Fields that store the same
//! type share a forest (every documentation field lives in one). Erosion goes
//! through [`Forest`] so a revert can sweep all of them uniformly.

use crate::fields::FieldKey;
use crate::values::{
    ArticleMetadata, Declaration, Documentation, ModuleMetadata, OverlayMetadata, SymbolMetadata,
};
use biome_history::{Forest, Head, History, Rollbacks};
use biome_versions::{kind, Atom, RevisionIndex};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::{self, Display, Formatter};

/// Which forest a field's keyframes live in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ForestKind {
    /// Module metadata
    ModuleMetadata,
    /// Module top-level symbol sets
    TopLevelSymbols,
    /// Module top-level article sets
    TopLevelArticles,
    /// Documentation of every kind
    Documentation,
    /// Symbol metadata
    SymbolMetadata,
    /// Symbol declarations
    Declaration,
    /// Article metadata
    ArticleMetadata,
    /// Overlay metadata
    OverlayMetadata,
}

impl ForestKind {
    /// Every forest
    pub const ALL: [Self; 8] = [
        Self::ModuleMetadata,
        Self::TopLevelSymbols,
        Self::TopLevelArticles,
        Self::Documentation,
        Self::SymbolMetadata,
        Self::Declaration,
        Self::ArticleMetadata,
        Self::OverlayMetadata,
    ];
}

impl Display for ForestKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ModuleMetadata => "module-metadata",
            Self::TopLevelSymbols => "top-level-symbols",
            Self::TopLevelArticles => "top-level-articles",
            Self::Documentation => "documentation",
            Self::SymbolMetadata => "symbol-metadata",
            Self::Declaration => "declaration",
            Self::ArticleMetadata => "article-metadata",
            Self::OverlayMetadata => "overlay-metadata",
        };
        f.write_str(name)
    }
}

/// Heads grouped by the forest they live in
pub type HeadsByForest = BTreeMap<ForestKind, Vec<Head>>;

/// Rollbacks from eroding every forest of a package
#[derive(Debug, Clone, Default)]
pub struct Erosion {
    forests: HashMap<ForestKind, Rollbacks>,
}

impl Erosion {
    /// Roll back one field's head in place
    pub fn apply<F: FieldKey>(&self, field: F, head: &mut Option<Head>) {
        if let Some(rollbacks) = self.forests.get(&field.forest()) {
            rollbacks.apply(head);
        }
    }

    /// Number of heads affected across all forests
    #[must_use]
    pub fn len(&self) -> usize {
        self.forests.values().map(Rollbacks::len).sum()
    }

    /// Whether no head was affected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forests.values().all(Rollbacks::is_empty)
    }
}

/// Every keyframe forest of one package
#[derive(Debug, Clone, Default)]
pub struct Histories {
    pub(crate) module_metadata: History<Option<ModuleMetadata>>,
    pub(crate) top_level_symbols: History<BTreeSet<Atom<kind::Symbol>>>,
    pub(crate) top_level_articles: History<BTreeSet<Atom<kind::Article>>>,
    pub(crate) documentation: History<Documentation>,
    pub(crate) symbol_metadata: History<Option<SymbolMetadata>>,
    pub(crate) declarations: History<Declaration>,
    pub(crate) article_metadata: History<Option<ArticleMetadata>>,
    pub(crate) overlay_metadata: History<Option<OverlayMetadata>>,
}

impl Histories {
    /// Create forests with room for `capacity` keyframes each
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            module_metadata: History::with_capacity(capacity),
            top_level_symbols: History::with_capacity(capacity),
            top_level_articles: History::with_capacity(capacity),
            documentation: History::with_capacity(capacity),
            symbol_metadata: History::with_capacity(capacity),
            declarations: History::with_capacity(capacity),
            article_metadata: History::with_capacity(capacity),
            overlay_metadata: History::with_capacity(capacity),
        }
    }

    /// One forest, type-erased
    #[must_use]
    pub fn forest(&self, kind: ForestKind) -> &dyn Forest {
        match kind {
            ForestKind::ModuleMetadata => &self.module_metadata,
            ForestKind::TopLevelSymbols => &self.top_level_symbols,
            ForestKind::TopLevelArticles => &self.top_level_articles,
            ForestKind::Documentation => &self.documentation,
            ForestKind::SymbolMetadata => &self.symbol_metadata,
            ForestKind::Declaration => &self.declarations,
            ForestKind::ArticleMetadata => &self.article_metadata,
            ForestKind::OverlayMetadata => &self.overlay_metadata,
        }
    }

    fn forest_mut(&mut self, kind: ForestKind) -> &mut dyn Forest {
        match kind {
            ForestKind::ModuleMetadata => &mut self.module_metadata,
            ForestKind::TopLevelSymbols => &mut self.top_level_symbols,
            ForestKind::TopLevelArticles => &mut self.top_level_articles,
            ForestKind::Documentation => &mut self.documentation,
            ForestKind::SymbolMetadata => &mut self.symbol_metadata,
            ForestKind::Declaration => &mut self.declarations,
            ForestKind::ArticleMetadata => &mut self.article_metadata,
            ForestKind::OverlayMetadata => &mut self.overlay_metadata,
        }
    }

    /// Live keyframes across every forest
    #[must_use]
    pub fn keyframes(&self) -> usize {
        ForestKind::ALL
            .iter()
            .map(|&kind| self.forest(kind).keyframes())
            .sum()
    }

    /// Erode the given chains back to `until`
    pub fn erode(&mut self, heads: &HeadsByForest, until: Option<RevisionIndex>) -> Erosion {
        let mut erosion = Erosion::default();
        for (&kind, heads) in heads {
            let rollbacks = self.forest_mut(kind).erode(heads, until);
            if !rollbacks.is_empty() {
                tracing::debug!(forest = %kind, heads = rollbacks.len(), "rolled back heads");
                erosion.forests.insert(kind, rollbacks);
            }
        }
        erosion
    }

    /// Module metadata forest
    #[inline]
    #[must_use]
    pub fn module_metadata(&self) -> &History<Option<ModuleMetadata>> {
        &self.module_metadata
    }

    /// Documentation forest
    #[inline]
    #[must_use]
    pub fn documentation(&self) -> &History<Documentation> {
        &self.documentation
    }

    /// Symbol metadata forest
    #[inline]
    #[must_use]
    pub fn symbol_metadata(&self) -> &History<Option<SymbolMetadata>> {
        &self.symbol_metadata
    }

    /// Declaration forest
    #[inline]
    #[must_use]
    pub fn declarations(&self) -> &History<Declaration> {
        &self.declarations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Heads, ModuleField, ModuleHeads, SymbolField, SymbolHeads};

    #[test]
    fn erosion_is_scoped_per_forest() {
        let mut histories = Histories::with_capacity(4);
        let mut module = ModuleHeads::default();
        let mut symbol = SymbolHeads::default();

        let r0 = RevisionIndex::new(0);
        let r1 = RevisionIndex::new(1);
        histories
            .module_metadata
            .push(Some(ModuleMetadata::default()), r0, module.head_mut(ModuleField::Metadata));
        histories.documentation.push(
            Documentation::comment("old"),
            r0,
            module.head_mut(ModuleField::Documentation),
        );
        histories.documentation.push(
            Documentation::comment("new"),
            r1,
            symbol.head_mut(SymbolField::Documentation),
        );
        assert_eq!(histories.keyframes(), 3);

        let mut gathered = HeadsByForest::new();
        for (kind, head) in module.present().into_iter().chain(symbol.present()) {
            gathered.entry(kind).or_default().push(head);
        }
        let erosion = histories.erode(&gathered, Some(r0));
        module.revert(&erosion);
        symbol.revert(&erosion);

        assert_eq!(erosion.len(), 1);
        assert!(symbol.is_empty());
        assert!(module.head(ModuleField::Metadata).is_some());
        assert!(module.head(ModuleField::Documentation).is_some());
        assert_eq!(histories.keyframes(), 2);
    }
}
