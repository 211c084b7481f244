//! Branches
//!
//! A [`Branch`] owns its commit log, the three intrinsic buffers of entities
//! created on it, the overlay table of diacritics it recorded features for,
//! and its routing table. A forked branch fixes its fork point at creation;
//! its buffers start numbering at the fork ring.

use crate::buffer::{IntrinsicBuffer, Update};
use crate::elements::{Article, Module, Symbol};
use crate::error::TreeError;
use crate::fasces::Fasces;
use crate::fields::{Heads, OverlayField, OverlayHeads};
use crate::histories::{Erosion, HeadsByForest};
use crate::revision::{Commit, Pins, Revision, Revisions};
use crate::ring::Ring;
use crate::routes::RouteTable;
use crate::values::OverlayMetadata;
use biome_history::History;
use biome_versions::{BranchIndex, Diacritic, RevisionIndex, Tag, Version};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};

/// Where a branch was forked from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fork {
    /// Parent version the branch starts from
    pub version: Version,
    /// Parent ring at that version
    pub ring: Ring,
}

/// One named line of history in a package
#[derive(Debug, Clone)]
pub struct Branch {
    id: Tag,
    index: BranchIndex,
    fork: Option<Fork>,
    pub(crate) revisions: Revisions,
    pub(crate) modules: IntrinsicBuffer<Module>,
    pub(crate) symbols: IntrinsicBuffer<Symbol>,
    pub(crate) articles: IntrinsicBuffer<Article>,
    pub(crate) overlays: HashMap<Diacritic, OverlayHeads>,
    pub(crate) routes: RouteTable,
}

impl Branch {
    pub(crate) fn new(id: Tag, index: BranchIndex, fork: Option<Fork>) -> Self {
        let start = fork.map(|fork| fork.ring).unwrap_or_default();
        Self {
            id,
            index,
            fork,
            revisions: Revisions::default(),
            modules: IntrinsicBuffer::new(index, start.modules),
            symbols: IntrinsicBuffer::new(index, start.symbols),
            articles: IntrinsicBuffer::new(index, start.articles),
            overlays: HashMap::new(),
            routes: RouteTable::default(),
        }
    }

    /// Branch name
    #[inline]
    #[must_use]
    pub fn id(&self) -> &Tag {
        &self.id
    }

    /// Index within the tree
    #[inline]
    #[must_use]
    pub fn index(&self) -> BranchIndex {
        self.index
    }

    /// Fork point, if this branch was forked
    #[inline]
    #[must_use]
    pub fn fork(&self) -> Option<Fork> {
        self.fork
    }

    /// Commit log
    #[inline]
    #[must_use]
    pub fn revisions(&self) -> &Revisions {
        &self.revisions
    }

    /// Module buffer
    #[inline]
    #[must_use]
    pub fn modules(&self) -> &IntrinsicBuffer<Module> {
        &self.modules
    }

    /// Symbol buffer
    #[inline]
    #[must_use]
    pub fn symbols(&self) -> &IntrinsicBuffer<Symbol> {
        &self.symbols
    }

    /// Article buffer
    #[inline]
    #[must_use]
    pub fn articles(&self) -> &IntrinsicBuffer<Article> {
        &self.articles
    }

    /// Routing table
    #[inline]
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Overlay heads recorded on this branch for a diacritic
    #[must_use]
    pub fn overlay(&self, diacritic: &Diacritic) -> Option<&OverlayHeads> {
        self.overlays.get(diacritic)
    }

    /// Ring the buffers started at
    #[must_use]
    pub fn start(&self) -> Ring {
        self.fork.map(|fork| fork.ring).unwrap_or_default()
    }

    /// Current buffer ends, including uncommitted entities
    #[must_use]
    pub fn ring(&self) -> Ring {
        Ring::new(self.modules.end(), self.symbols.end(), self.articles.end())
    }

    /// Newest committed version
    #[must_use]
    pub fn head(&self) -> Option<Version> {
        self.revisions
            .head()
            .map(|revision| Version::new(self.index, revision))
    }

    /// Revision that writes currently go to
    #[inline]
    #[must_use]
    pub fn pending(&self) -> RevisionIndex {
        self.revisions.pending()
    }

    /// Committed revision as a version
    ///
    /// # Errors
    /// If the revision was not committed on this branch.
    pub fn version(&self, revision: RevisionIndex) -> Result<Version, TreeError> {
        let version = Version::new(self.index, revision);
        match self.revisions.get(revision) {
            Some(_) => Ok(version),
            None => Err(TreeError::UnknownVersion(version)),
        }
    }

    pub(crate) fn commit(&mut self, token: u64, commit: Commit, pins: Pins) -> Version {
        let ring = self.ring();
        let revision = self.revisions.push(Revision {
            token,
            ring,
            pins,
            alternates: SmallVec::new(),
            consumers: BTreeMap::new(),
            commit,
        });
        Version::new(self.index, revision)
    }

    pub(crate) fn add_alternate(&mut self, revision: RevisionIndex, alternate: BranchIndex) {
        match self.revisions.get_mut(revision) {
            Some(revision) => revision.alternates.push(alternate),
            None => panic!("{alternate} forked from uncommitted {revision} of {}", self.index),
        }
    }

    /// Every head stored on this branch, grouped by forest
    pub(crate) fn gather(&self) -> HeadsByForest {
        let mut heads = HeadsByForest::new();
        self.modules.gather(&mut heads);
        self.symbols.gather(&mut heads);
        self.articles.gather(&mut heads);
        for overlay in self.overlays.values() {
            for (forest, head) in overlay.present() {
                heads.entry(forest).or_default().push(head);
            }
        }
        heads
    }

    /// Drop everything newer than `to` after the forests were eroded
    pub(crate) fn truncate(&mut self, to: Option<RevisionIndex>, erosion: &Erosion) {
        let ring = match to {
            Some(to) => self.revisions[to].ring,
            None => self.start(),
        };
        self.modules.revert(ring.modules, erosion);
        self.symbols.revert(ring.symbols, erosion);
        self.articles.revert(ring.articles, erosion);
        self.overlays.retain(|_, heads| {
            heads.revert(erosion);
            !heads.is_empty()
        });
        self.routes.revert(to);
        self.revisions.truncate(to);
    }

    /// Write the overlay metadata of a diacritic
    ///
    /// Overlays of hosts created on this branch keep local history. Overlays
    /// of inherited hosts diverge only when the value differs from what the
    /// ancestors show.
    pub fn update_overlay(
        &mut self,
        history: &mut History<Option<OverlayMetadata>>,
        diacritic: Diacritic,
        value: Option<OverlayMetadata>,
        ancestors: &Fasces<'_>,
    ) -> Update {
        let field = OverlayField::Metadata;
        let revision = self.pending();
        let contemporary = diacritic.host.branch == self.index;
        if let Some(heads) = self.overlays.get_mut(&diacritic) {
            if let Some(current) = heads.head(field) {
                if *history.newest(current) == value {
                    return Update::Unchanged;
                }
                if !contemporary
                    && current.since() == revision
                    && history.value_in(ancestors.overlay_segments(&diacritic)) == Some(&value)
                {
                    *heads.head_mut(field) = history.erode_chain(current, revision.predecessor());
                    if heads.is_empty() {
                        self.overlays.remove(&diacritic);
                    }
                    tracing::debug!(
                        branch = %self.index,
                        host = %diacritic.host,
                        "overlay rejoined ancestor"
                    );
                    return Update::Unchanged;
                }
                history.push(value, revision, heads.head_mut(field));
                return Update::Advanced;
            }
        }

        if !contemporary && history.value_in(ancestors.overlay_segments(&diacritic)) == Some(&value) {
            return Update::Unchanged;
        }
        let heads = self.overlays.entry(diacritic).or_default();
        history.push(value, revision, heads.head_mut(field));
        if contemporary {
            Update::Advanced
        } else {
            tracing::debug!(branch = %self.index, host = %diacritic.host, "overlay diverged from ancestor");
            Update::Diverged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ModuleId;
    use biome_versions::PackageIndex;

    fn tag(name: &str) -> Tag {
        name.parse().unwrap()
    }

    #[test]
    fn forked_buffers_start_at_fork_ring() {
        let fork = Fork {
            version: Version::new(BranchIndex::new(0), RevisionIndex::new(2)),
            ring: Ring::new(3, 10, 1),
        };
        let branch = Branch::new(tag("feature"), BranchIndex::new(1), Some(fork));
        assert_eq!(branch.start(), Ring::new(3, 10, 1));
        assert_eq!(branch.ring(), Ring::new(3, 10, 1));
        assert_eq!(branch.symbols().start(), 10);
        assert_eq!(branch.head(), None);
    }

    #[test]
    fn commit_locks_in_current_ring() {
        let mut branch = Branch::new(tag("main"), BranchIndex::new(0), None);
        let package = PackageIndex::new(0);
        let id = ModuleId::from("A");
        branch
            .modules
            .insert(id.clone(), package, || Module::new(id, package));

        let version = branch.commit(0, Commit::new("a"), Pins::new());
        assert_eq!(version, Version::new(BranchIndex::new(0), RevisionIndex::new(0)));
        assert_eq!(branch.revisions()[version.revision].ring, Ring::new(1, 0, 0));
        assert_eq!(branch.pending(), RevisionIndex::new(1));
        assert!(branch.version(RevisionIndex::new(1)).is_err());
    }

    #[test]
    fn truncate_to_nothing_restores_start() {
        let mut branch = Branch::new(tag("main"), BranchIndex::new(0), None);
        let package = PackageIndex::new(0);
        let id = ModuleId::from("A");
        branch
            .modules
            .insert(id.clone(), package, || Module::new(id, package));
        branch.commit(0, Commit::new("a"), Pins::new());

        branch.truncate(None, &Erosion::default());
        assert!(branch.revisions().is_empty());
        assert!(branch.modules().is_empty());
        assert_eq!(branch.ring(), Ring::default());
    }

    #[test]
    fn cloned_branch_keeps_its_buffers() {
        let mut branch = Branch::new(tag("main"), BranchIndex::new(0), None);
        let package = PackageIndex::new(0);
        let id = ModuleId::from("A");
        let atom = branch
            .modules
            .insert(id.clone(), package, || Module::new(id.clone(), package));

        let copy = branch.clone();
        assert_eq!(copy.modules().atom(&id), Some(atom));
        assert_eq!(copy.modules().prefix(copy.modules().end()).len(), 1);
        assert!(format!("{copy:?}").contains("modules"));
    }
}
