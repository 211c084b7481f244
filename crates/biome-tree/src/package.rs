//! Packages
//!
//! A [`Package`] owns one branch tree and the keyframe forests every branch
//! of that tree writes into. It is the single writer: entities are
//! registered, fields updated, revisions committed and reverted through
//! `&mut Package`, while readers take [`Pinned`] views.
//!
//! Writes always land in the branch's pending revision. Committing locks the
//! pending revision in; reverting erodes every chain the branch owns and
//! truncates its buffers, which also discards uncommitted writes.

use crate::branch::Branch;
use crate::buffer::Update;
use crate::config::PackageConfig;
use crate::elements::{Article, BranchElement, Module, Symbol};
use crate::error::TreeError;
use crate::fasces::Fasces;
use crate::fields::{ArticleField, Heads, ModuleField, SymbolField};
use crate::histories::Histories;
use crate::ids::{ModuleId, PackageId};
use crate::pinned::Pinned;
use crate::revision::{Commit, Pins, Revision};
use crate::routes::Route;
use crate::tree::Tree;
use crate::values::{
    ArticleMetadata, Declaration, Documentation, ModuleMetadata, OverlayMetadata, SymbolMetadata,
};
use biome_history::History;
use biome_versions::{
    kind, Atom, BranchIndex, Composite, Diacritic, Kind, PackageIndex, RevisionIndex, Tag, Version,
    VersionSelector,
};
use std::collections::BTreeSet;
use tracing::{debug, info, trace};

/// One package: its branch tree and keyframe forests
///
/// ```rust
/// use biome_tree::{Commit, ModuleId, ModuleMetadata, Package, PackageConfig, Pins};
/// use biome_versions::PackageIndex;
///
/// let mut package = Package::new(PackageIndex::new(0), "swift-nio".into(), PackageConfig::new());
/// let main = package.branch("main".parse().unwrap(), None).unwrap();
/// let module = package.add_module(main, ModuleId::from("NIOCore")).unwrap();
/// package
///     .update_module_metadata(main, module, Some(ModuleMetadata::default()))
///     .unwrap();
/// let v0 = package.commit(main, Commit::new("a1b2c3"), Pins::new()).unwrap();
///
/// let pinned = package.pinned(v0).unwrap();
/// assert!(pinned.metadata(module).is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Package {
    index: PackageIndex,
    id: PackageId,
    config: PackageConfig,
    tree: Tree,
    histories: Histories,
    tokens: u64,
}

impl Package {
    /// Create an empty package
    #[must_use]
    pub fn new(index: PackageIndex, id: PackageId, config: PackageConfig) -> Self {
        let histories = Histories::with_capacity(config.keyframe_capacity);
        Self {
            index,
            id,
            config,
            tree: Tree::new(),
            histories,
            tokens: 0,
        }
    }

    /// Index within the ecosystem
    #[inline]
    #[must_use]
    pub fn index(&self) -> PackageIndex {
        self.index
    }

    /// Package identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &PackageId {
        &self.id
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    /// Branch tree
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Keyframe forests
    #[inline]
    #[must_use]
    pub fn histories(&self) -> &Histories {
        &self.histories
    }

    /// Live keyframes across every forest
    #[must_use]
    pub fn keyframes(&self) -> usize {
        self.histories.keyframes()
    }

    /// Get or create the branch called `name`
    ///
    /// # Errors
    /// If `fork` is not a committed version, or the branch limit is reached.
    pub fn branch(&mut self, name: Tag, fork: Option<Version>) -> Result<BranchIndex, TreeError> {
        self.tree.branch(fork, name, self.config.max_branches)
    }

    /// Register a module, or return the atom it already has in the trunk
    ///
    /// # Errors
    /// If the branch does not exist.
    pub fn add_module(&mut self, branch: BranchIndex, id: ModuleId) -> Result<Atom<kind::Module>, TreeError> {
        let culture = self.index;
        let (branch, ancestors) = self.tree.split(branch)?;
        Ok(register(branch, &ancestors, Module::new(id, culture)))
    }

    /// Register symbols, reusing atoms the trunk already has
    ///
    /// # Errors
    /// If the branch does not exist, or a symbol's culture module is not
    /// visible from it. Symbols before the failing one stay registered.
    pub fn add_symbols(
        &mut self,
        branch: BranchIndex,
        symbols: impl IntoIterator<Item = Symbol>,
    ) -> Result<Vec<Atom<kind::Symbol>>, TreeError> {
        let package = self.index;
        let (branch, ancestors) = self.tree.split(branch)?;
        symbols
            .into_iter()
            .map(|symbol| {
                check_culture(package, branch, &ancestors, symbol.culture())?;
                Ok(register(branch, &ancestors, symbol))
            })
            .collect()
    }

    /// Register articles, reusing atoms the trunk already has
    ///
    /// # Errors
    /// If the branch does not exist, or an article's culture module is not
    /// visible from it.
    pub fn add_extensions(
        &mut self,
        branch: BranchIndex,
        articles: impl IntoIterator<Item = Article>,
    ) -> Result<Vec<Atom<kind::Article>>, TreeError> {
        let package = self.index;
        let (branch, ancestors) = self.tree.split(branch)?;
        articles
            .into_iter()
            .map(|article| {
                check_culture(package, branch, &ancestors, article.culture())?;
                Ok(register(branch, &ancestors, article))
            })
            .collect()
    }

    /// Bind `composite` under `route`; returns false if the trunk already has it
    ///
    /// # Errors
    /// If the branch does not exist.
    pub fn add_route(
        &mut self,
        branch: BranchIndex,
        route: Route,
        composite: Composite,
    ) -> Result<bool, TreeError> {
        let (branch, ancestors) = self.tree.split(branch)?;
        if ancestors.select(&route).contains(&composite) {
            return Ok(false);
        }
        let revision = branch.pending();
        Ok(branch.routes.insert(route, composite, revision))
    }

    /// Write module metadata; `None` marks the module extinct
    ///
    /// # Errors
    /// If the branch does not exist or the module is not visible from it.
    pub fn update_module_metadata(
        &mut self,
        branch: BranchIndex,
        module: Atom<kind::Module>,
        metadata: Option<ModuleMetadata>,
    ) -> Result<Update, TreeError> {
        self.update::<Module, _>(branch, module, ModuleField::Metadata, metadata, |histories| {
            &mut histories.module_metadata
        })
    }

    /// Write a module's top-level symbols
    ///
    /// # Errors
    /// If the branch does not exist or the module is not visible from it.
    pub fn update_top_level_symbols(
        &mut self,
        branch: BranchIndex,
        module: Atom<kind::Module>,
        symbols: BTreeSet<Atom<kind::Symbol>>,
    ) -> Result<Update, TreeError> {
        self.update::<Module, _>(branch, module, ModuleField::TopLevelSymbols, symbols, |histories| {
            &mut histories.top_level_symbols
        })
    }

    /// Write a module's top-level articles
    ///
    /// # Errors
    /// If the branch does not exist or the module is not visible from it.
    pub fn update_top_level_articles(
        &mut self,
        branch: BranchIndex,
        module: Atom<kind::Module>,
        articles: BTreeSet<Atom<kind::Article>>,
    ) -> Result<Update, TreeError> {
        self.update::<Module, _>(branch, module, ModuleField::TopLevelArticles, articles, |histories| {
            &mut histories.top_level_articles
        })
    }

    /// Write module documentation
    ///
    /// # Errors
    /// If the branch does not exist or the module is not visible from it.
    pub fn update_module_documentation(
        &mut self,
        branch: BranchIndex,
        module: Atom<kind::Module>,
        documentation: Documentation,
    ) -> Result<Update, TreeError> {
        self.update::<Module, _>(branch, module, ModuleField::Documentation, documentation, |histories| {
            &mut histories.documentation
        })
    }

    /// Write symbol metadata; `None` marks the symbol extinct
    ///
    /// # Errors
    /// If the branch does not exist or the symbol is not visible from it.
    pub fn update_symbol_metadata(
        &mut self,
        branch: BranchIndex,
        symbol: Atom<kind::Symbol>,
        metadata: Option<SymbolMetadata>,
    ) -> Result<Update, TreeError> {
        self.update::<Symbol, _>(branch, symbol, SymbolField::Metadata, metadata, |histories| {
            &mut histories.symbol_metadata
        })
    }

    /// Write a symbol's declaration
    ///
    /// # Errors
    /// If the branch does not exist or the symbol is not visible from it.
    pub fn update_declaration(
        &mut self,
        branch: BranchIndex,
        symbol: Atom<kind::Symbol>,
        declaration: Declaration,
    ) -> Result<Update, TreeError> {
        self.update::<Symbol, _>(branch, symbol, SymbolField::Declaration, declaration, |histories| {
            &mut histories.declarations
        })
    }

    /// Write symbol documentation
    ///
    /// # Errors
    /// If the branch does not exist or the symbol is not visible from it.
    pub fn update_symbol_documentation(
        &mut self,
        branch: BranchIndex,
        symbol: Atom<kind::Symbol>,
        documentation: Documentation,
    ) -> Result<Update, TreeError> {
        self.update::<Symbol, _>(branch, symbol, SymbolField::Documentation, documentation, |histories| {
            &mut histories.documentation
        })
    }

    /// Write article metadata; `None` marks the article extinct
    ///
    /// # Errors
    /// If the branch does not exist or the article is not visible from it.
    pub fn update_article_metadata(
        &mut self,
        branch: BranchIndex,
        article: Atom<kind::Article>,
        metadata: Option<ArticleMetadata>,
    ) -> Result<Update, TreeError> {
        self.update::<Article, _>(branch, article, ArticleField::Metadata, metadata, |histories| {
            &mut histories.article_metadata
        })
    }

    /// Write article documentation
    ///
    /// # Errors
    /// If the branch does not exist or the article is not visible from it.
    pub fn update_article_documentation(
        &mut self,
        branch: BranchIndex,
        article: Atom<kind::Article>,
        documentation: Documentation,
    ) -> Result<Update, TreeError> {
        self.update::<Article, _>(branch, article, ArticleField::Documentation, documentation, |histories| {
            &mut histories.documentation
        })
    }

    /// Write the features an extension attaches to a host symbol
    ///
    /// # Errors
    /// If the branch does not exist, or the perpetrating module is not
    /// visible from it.
    pub fn update_overlay_metadata(
        &mut self,
        branch: BranchIndex,
        diacritic: Diacritic,
        metadata: Option<OverlayMetadata>,
    ) -> Result<Update, TreeError> {
        let package = self.index;
        let (branch, ancestors) = self.tree.split(branch)?;
        check_culture(package, branch, &ancestors, diacritic.culture)?;
        let update = branch.update_overlay(
            &mut self.histories.overlay_metadata,
            diacritic,
            metadata,
            &ancestors,
        );
        trace!(branch = %branch.index(), host = %diacritic.host, ?update, "wrote overlay");
        Ok(update)
    }

    fn update<E, V>(
        &mut self,
        branch: BranchIndex,
        atom: Atom<E::Kind>,
        field: <E::Heads as Heads>::Field,
        value: V,
        forest: fn(&mut Histories) -> &mut History<V>,
    ) -> Result<Update, TreeError>
    where
        E: BranchElement,
        V: PartialEq,
    {
        let (branch, ancestors) = self.tree.split(branch)?;
        let revision = branch.pending();
        let update = E::buffer_mut(branch).update(
            forest(&mut self.histories),
            atom,
            field,
            value,
            revision,
            &ancestors,
        )?;
        trace!(
            branch = %branch.index(),
            %atom,
            ?field,
            %revision,
            ?update,
            "wrote field"
        );
        Ok(update)
    }

    /// Lock in the branch's pending revision
    ///
    /// A tag on the commit becomes a release tag of the tree, replacing any
    /// earlier version it pointed at.
    ///
    /// # Errors
    /// If the branch does not exist.
    pub fn commit(&mut self, branch: BranchIndex, commit: Commit, pins: Pins) -> Result<Version, TreeError> {
        let token = self.tokens;
        let tag = commit.tag.clone();
        let version = self.tree.get_mut(branch)?.commit(token, commit, pins);
        self.tokens += 1;
        if let Some(tag) = tag {
            self.tree.tag(tag, version);
        }
        info!(
            package = %self.index,
            %version,
            token,
            keyframes = self.histories.keyframes(),
            "committed revision"
        );
        if self.config.verify_invariants {
            self.tree.check_invariants();
        }
        Ok(version)
    }

    /// Roll a branch back so that `to` is its newest revision
    ///
    /// `None` removes every revision. Keyframes newer than `to` are freed,
    /// entities registered after it are dropped, and tags pointing past it
    /// are removed. Uncommitted writes are always discarded, so reverting to
    /// the current head is how a failed ingestion is abandoned.
    ///
    /// # Panics
    /// If another branch forks from, or another package pins, a revision
    /// that would be removed.
    ///
    /// # Errors
    /// If the branch does not exist or `to` was never committed on it.
    pub fn revert(&mut self, branch: BranchIndex, to: Option<RevisionIndex>) -> Result<(), TreeError> {
        let target = self.tree.get(branch)?;
        if let Some(to) = to {
            target.version(to)?;
        }
        let mut removed = 0_usize;
        for (revision, record) in target.revisions().after(to) {
            assert!(
                !record.is_referenced(),
                "cannot revert {}: alternates {:?} and consumers {:?} depend on it",
                Version::new(branch, revision),
                record.alternates,
                record.consumers,
            );
            removed += 1;
        }

        let heads = target.gather();
        let erosion = self.histories.erode(&heads, to);
        self.tree.get_mut(branch)?.truncate(to, &erosion);
        let untagged = self.tree.untag_after(branch, to);
        debug!(%branch, rolled_back = erosion.len(), "applied erosion");
        info!(
            package = %self.index,
            %branch,
            to = ?to,
            removed,
            untagged,
            keyframes = self.histories.keyframes(),
            "reverted branch"
        );
        if self.config.verify_invariants {
            self.tree.check_invariants();
        }
        Ok(())
    }

    /// Read view as of a committed version
    ///
    /// # Errors
    /// If the version was never committed.
    pub fn pinned(&self, version: Version) -> Result<Pinned<'_>, TreeError> {
        Pinned::new(self, version)
    }

    /// Read view as of a tag or branch name
    ///
    /// # Errors
    /// If the tag does not resolve.
    pub fn pinned_tag(&self, tag: &Tag) -> Result<Pinned<'_>, TreeError> {
        self.pinned(self.tree.find(tag)?)
    }

    /// Read view as of a selector
    ///
    /// # Errors
    /// If the selector does not resolve.
    pub fn pinned_selector(&self, selector: &VersionSelector) -> Result<Pinned<'_>, TreeError> {
        self.pinned(self.tree.find_selector(selector)?)
    }

    pub(crate) fn revision_mut(&mut self, version: Version) -> Option<&mut Revision> {
        self.tree
            .get_mut(version.branch)
            .ok()?
            .revisions
            .get_mut(version.revision)
    }
}

fn register<E: BranchElement>(branch: &mut Branch, ancestors: &Fasces<'_>, element: E) -> Atom<E::Kind> {
    if let Some(position) = ancestors.find::<E>(element.id()) {
        return position.contemporary;
    }
    let id = element.id().clone();
    let culture = element.culture();
    E::buffer_mut(branch).insert(id, culture, move || element)
}

fn check_culture(
    package: PackageIndex,
    branch: &Branch,
    ancestors: &Fasces<'_>,
    culture: Atom<kind::Module>,
) -> Result<(), TreeError> {
    let visible = culture.package() == package
        && (branch.modules().contains(culture) || ancestors.contains::<Module>(culture));
    if visible {
        Ok(())
    } else {
        Err(TreeError::InvisibleAtom {
            kind: kind::Module::NAME,
            offset: culture.offset(),
            branch: branch.index(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SymbolId;

    fn package() -> Package {
        Package::new(
            PackageIndex::new(0),
            PackageId::from("test"),
            PackageConfig::new().with_verify_invariants(true),
        )
    }

    fn tag(name: &str) -> Tag {
        name.parse().unwrap()
    }

    #[test]
    fn registration_reuses_inherited_atoms() {
        let mut package = package();
        let main = package.branch(tag("main"), None).unwrap();
        let module = package.add_module(main, ModuleId::from("A")).unwrap();
        let v0 = package.commit(main, Commit::new("a"), Pins::new()).unwrap();

        let feature = package.branch(tag("feature"), Some(v0)).unwrap();
        assert_eq!(package.add_module(feature, ModuleId::from("A")).unwrap(), module);
        let other = package.add_module(feature, ModuleId::from("B")).unwrap();
        assert_eq!(other.offset(), 1);
        assert!(package.tree().get(feature).unwrap().modules().contains(other));
    }

    #[test]
    fn symbols_need_a_visible_culture() {
        let mut package = package();
        let main = package.branch(tag("main"), None).unwrap();
        let missing = Atom::<kind::Module>::new(PackageIndex::new(0), 3);
        let result = package.add_symbols(
            main,
            [Symbol::new(SymbolId::from("s:x"), missing, vec!["x".to_owned()])],
        );
        assert_eq!(
            result,
            Err(TreeError::InvisibleAtom {
                kind: "module",
                offset: 3,
                branch: main,
            })
        );
    }

    #[test]
    fn revert_to_head_discards_uncommitted_writes() {
        let mut package = package();
        let main = package.branch(tag("main"), None).unwrap();
        let module = package.add_module(main, ModuleId::from("A")).unwrap();
        package
            .update_module_metadata(main, module, Some(ModuleMetadata::default()))
            .unwrap();
        let v0 = package.commit(main, Commit::new("a"), Pins::new()).unwrap();

        package
            .update_module_metadata(main, module, Some(ModuleMetadata::new([ModuleId::from("B")])))
            .unwrap();
        package.add_module(main, ModuleId::from("C")).unwrap();
        assert_eq!(package.keyframes(), 2);

        package.revert(main, Some(v0.revision)).unwrap();
        assert_eq!(package.keyframes(), 1);
        assert_eq!(package.tree().get(main).unwrap().modules().len(), 1);
        let pinned = package.pinned(v0).unwrap();
        assert_eq!(pinned.metadata(module), Some(&ModuleMetadata::default()));
    }

    #[test]
    fn revert_to_uncommitted_revision_fails() {
        let mut package = package();
        let main = package.branch(tag("main"), None).unwrap();
        let missing = Version::new(main, RevisionIndex::new(0));
        assert_eq!(
            package.revert(main, Some(missing.revision)),
            Err(TreeError::UnknownVersion(missing))
        );
    }

    #[test]
    fn commit_tokens_are_monotonic_across_reverts() {
        let mut package = package();
        let main = package.branch(tag("main"), None).unwrap();
        package.commit(main, Commit::new("a"), Pins::new()).unwrap();
        package.revert(main, None).unwrap();
        let v = package.commit(main, Commit::new("b"), Pins::new()).unwrap();
        assert_eq!(package.tree().get(main).unwrap().revisions()[v.revision].token, 1);
    }
}
