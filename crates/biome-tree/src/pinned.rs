//! Pinned read views
//!
//! A [`Pinned`] view answers every read as of one committed version. It
//! borrows the package immutably, so any number of views can coexist while
//! no writer does.

use crate::elements::{Article, BranchElement, Module, Symbol};
use crate::error::TreeError;
use crate::evolution::{self, EvolutionRow};
use crate::fasces::Fasces;
use crate::fields::{ArticleField, Heads, ModuleField, SymbolField};
use crate::ids::{ArticleId, ModuleId, SymbolId};
use crate::package::Package;
use crate::routes::Route;
use crate::values::{
    ArticleMetadata, Declaration, Documentation, ModuleMetadata, OverlayMetadata, SymbolMetadata,
};
use biome_history::History;
use biome_versions::{kind, Atom, Composite, Diacritic, Position, Version};
use std::collections::BTreeSet;

/// Reads as of one committed version of a package
#[derive(Debug, Clone)]
pub struct Pinned<'a> {
    package: &'a Package,
    version: Version,
    fasces: Fasces<'a>,
}

impl<'a> Pinned<'a> {
    pub(crate) fn new(package: &'a Package, version: Version) -> Result<Self, TreeError> {
        let fasces = package.tree().fasces_through(version)?;
        Ok(Self {
            package,
            version,
            fasces,
        })
    }

    /// The pinned version
    #[inline]
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// The package being read
    #[inline]
    #[must_use]
    pub fn package(&self) -> &'a Package {
        self.package
    }

    /// Trunk the reads run in
    #[inline]
    #[must_use]
    pub fn fasces(&self) -> &Fasces<'a> {
        &self.fasces
    }

    fn value<E: BranchElement, V>(
        &self,
        history: &'a History<V>,
        atom: Atom<E::Kind>,
        field: <E::Heads as Heads>::Field,
    ) -> Option<&'a V> {
        history.value_in(self.fasces.segments::<E>(atom, field))
    }

    /// Module metadata, if the module exists here
    #[must_use]
    pub fn metadata(&self, module: Atom<kind::Module>) -> Option<&'a ModuleMetadata> {
        let histories = self.package.histories();
        self.value::<Module, _>(&histories.module_metadata, module, ModuleField::Metadata)
            .and_then(Option::as_ref)
    }

    /// Symbol metadata, if the symbol exists here
    #[must_use]
    pub fn symbol_metadata(&self, symbol: Atom<kind::Symbol>) -> Option<&'a SymbolMetadata> {
        let histories = self.package.histories();
        self.value::<Symbol, _>(&histories.symbol_metadata, symbol, SymbolField::Metadata)
            .and_then(Option::as_ref)
    }

    /// Article metadata, if the article exists here
    #[must_use]
    pub fn article_metadata(&self, article: Atom<kind::Article>) -> Option<&'a ArticleMetadata> {
        let histories = self.package.histories();
        self.value::<Article, _>(&histories.article_metadata, article, ArticleField::Metadata)
            .and_then(Option::as_ref)
    }

    /// Features an extension attaches to a host symbol
    #[must_use]
    pub fn overlay_metadata(&self, diacritic: &Diacritic) -> Option<&'a OverlayMetadata> {
        self.package
            .histories()
            .overlay_metadata
            .value_in(self.fasces.overlay_segments(diacritic))
            .and_then(Option::as_ref)
    }

    /// Symbol declaration
    #[must_use]
    pub fn declaration(&self, symbol: Atom<kind::Symbol>) -> Option<&'a Declaration> {
        let histories = self.package.histories();
        self.value::<Symbol, _>(&histories.declarations, symbol, SymbolField::Declaration)
    }

    /// Symbol documentation
    #[must_use]
    pub fn documentation(&self, symbol: Atom<kind::Symbol>) -> Option<&'a Documentation> {
        let histories = self.package.histories();
        self.value::<Symbol, _>(&histories.documentation, symbol, SymbolField::Documentation)
    }

    /// Module documentation
    #[must_use]
    pub fn module_documentation(&self, module: Atom<kind::Module>) -> Option<&'a Documentation> {
        let histories = self.package.histories();
        self.value::<Module, _>(&histories.documentation, module, ModuleField::Documentation)
    }

    /// Article documentation
    #[must_use]
    pub fn article_documentation(&self, article: Atom<kind::Article>) -> Option<&'a Documentation> {
        let histories = self.package.histories();
        self.value::<Article, _>(&histories.documentation, article, ArticleField::Documentation)
    }

    /// Top-level symbols of a module
    #[must_use]
    pub fn top_level_symbols(&self, module: Atom<kind::Module>) -> Option<&'a BTreeSet<Atom<kind::Symbol>>> {
        let histories = self.package.histories();
        self.value::<Module, _>(&histories.top_level_symbols, module, ModuleField::TopLevelSymbols)
    }

    /// Top-level articles of a module
    #[must_use]
    pub fn top_level_articles(&self, module: Atom<kind::Module>) -> Option<&'a BTreeSet<Atom<kind::Article>>> {
        let histories = self.package.histories();
        self.value::<Module, _>(&histories.top_level_articles, module, ModuleField::TopLevelArticles)
    }

    /// Whether the entity has metadata at this version
    #[must_use]
    pub fn exists<E: BranchElement>(&self, atom: Atom<E::Kind>) -> bool {
        let histories = self.package.histories();
        self.value::<E, _>(E::metadata(histories), atom, E::METADATA)
            .is_some_and(Option::is_some)
    }

    /// Most recent version, up to this one, at which the entity existed
    #[must_use]
    pub fn excavate<E: BranchElement>(&self, atom: Atom<E::Kind>) -> Option<Version> {
        E::metadata(self.package.histories())
            .latest_version_in(self.fasces.segments::<E>(atom, E::METADATA), Option::is_some)
    }

    /// Resolve a module identifier
    #[must_use]
    pub fn find_module(&self, id: &ModuleId) -> Option<Position<kind::Module>> {
        self.fasces.find::<Module>(id)
    }

    /// Resolve a module identifier, or fail
    ///
    /// # Errors
    /// If no module with that identifier is visible here.
    pub fn module(&self, id: &ModuleId) -> Result<Position<kind::Module>, TreeError> {
        self.find_module(id)
            .ok_or_else(|| TreeError::UnknownModule(id.clone()))
    }

    /// Resolve a symbol identifier
    #[must_use]
    pub fn find_symbol(&self, id: &SymbolId) -> Option<Position<kind::Symbol>> {
        self.fasces.find::<Symbol>(id)
    }

    /// Resolve an article identifier
    #[must_use]
    pub fn find_article(&self, id: &ArticleId) -> Option<Position<kind::Article>> {
        self.fasces.find::<Article>(id)
    }

    /// The stored entity at `atom`, if visible here
    #[must_use]
    pub fn element<E: BranchElement>(&self, atom: Atom<E::Kind>) -> Option<&'a E> {
        self.fasces.element::<E>(atom)
    }

    /// Composites bound under `route`
    #[must_use]
    pub fn select(&self, route: &Route) -> Vec<Composite> {
        self.fasces.select(route)
    }

    /// Evolution report of an entity visible here
    ///
    /// Empty if the entity is not visible from this version.
    #[must_use]
    pub fn evolution<E: BranchElement>(&self, atom: Atom<E::Kind>) -> Vec<EvolutionRow> {
        match self.fasces.locate::<E>(atom) {
            Some(founder) => {
                evolution::evolution::<E>(self.package.tree(), self.package.histories(), founder)
            }
            None => Vec::new(),
        }
    }
}
