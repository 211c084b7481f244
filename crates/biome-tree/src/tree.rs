//! Branch trees
//!
//! A [`Tree`] holds every branch of one package, the name index, and the
//! release tags. It resolves tags and selectors to versions and builds the
//! trunks historical lookups run in.
//!
//! There is no default branch: which branch a bare package reference means is
//! up to the caller.

use crate::branch::{Branch, Fork};
use crate::error::TreeError;
use crate::fasces::Fasces;
use biome_versions::{BranchIndex, RevisionIndex, Tag, Version, VersionSelector};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Every branch of one package
#[derive(Debug, Clone, Default)]
pub struct Tree {
    branches: Vec<Branch>,
    names: HashMap<Tag, BranchIndex>,
    tags: IndexMap<Tag, Version>,
}

impl Tree {
    /// Create an empty tree
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of branches
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Whether the tree has no branches
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// All branches, by index
    #[inline]
    #[must_use]
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// One branch
    ///
    /// # Errors
    /// If the index is out of range.
    pub fn get(&self, branch: BranchIndex) -> Result<&Branch, TreeError> {
        self.branches
            .get(branch.as_usize())
            .ok_or(TreeError::UnknownBranch(branch))
    }

    pub(crate) fn get_mut(&mut self, branch: BranchIndex) -> Result<&mut Branch, TreeError> {
        self.branches
            .get_mut(branch.as_usize())
            .ok_or(TreeError::UnknownBranch(branch))
    }

    /// Branch with the given name
    #[must_use]
    pub fn named(&self, name: &Tag) -> Option<&Branch> {
        self.names.get(name).map(|&index| &self.branches[index.as_usize()])
    }

    /// Release tags in the order they were created
    pub fn tags(&self) -> impl Iterator<Item = (&Tag, Version)> + '_ {
        self.tags.iter().map(|(tag, &version)| (tag, version))
    }

    /// Get or create the branch called `name`
    ///
    /// A new branch forked from `fork` starts its buffers at the fork
    /// version's ring and is recorded as an alternate of that revision. An
    /// existing branch is returned as is, whatever `fork` says.
    ///
    /// # Errors
    /// If `fork` is not a committed version, or the tree already holds
    /// `limit` branches.
    pub fn branch(
        &mut self,
        fork: Option<Version>,
        name: Tag,
        limit: usize,
    ) -> Result<BranchIndex, TreeError> {
        if let Some(&existing) = self.names.get(&name) {
            return Ok(existing);
        }
        if self.branches.len() >= limit {
            return Err(TreeError::BranchLimit(limit));
        }
        let fork = match fork {
            Some(version) => {
                let parent = self.get(version.branch)?;
                let revision = parent
                    .revisions
                    .get(version.revision)
                    .ok_or(TreeError::UnknownVersion(version))?;
                Some(Fork {
                    version,
                    ring: revision.ring,
                })
            }
            None => None,
        };

        let index = BranchIndex::new(
            u32::try_from(self.branches.len())
                .unwrap_or_else(|_| panic!("tree exceeds u32 branches")),
        );
        if let Some(fork) = fork {
            self.branches[fork.version.branch.as_usize()].add_alternate(fork.version.revision, index);
        }
        tracing::info!(
            branch = %index,
            name = %name,
            fork = ?fork.map(|fork| fork.version),
            "created branch"
        );
        self.names.insert(name.clone(), index);
        self.branches.push(Branch::new(name, index, fork));
        Ok(index)
    }

    pub(crate) fn tag(&mut self, tag: Tag, version: Version) {
        if let Some(previous) = self.tags.insert(tag.clone(), version) {
            tracing::debug!(%tag, %previous, %version, "moved tag");
        }
    }

    /// Remove tags pointing past `to` on `branch`; returns how many
    pub(crate) fn untag_after(&mut self, branch: BranchIndex, to: Option<RevisionIndex>) -> usize {
        let before = self.tags.len();
        self.tags.retain(|_, version| {
            version.branch != branch || to.is_some_and(|to| version.revision <= to)
        });
        before - self.tags.len()
    }

    /// Resolve a tag
    ///
    /// Explicit release tags win; otherwise a branch of the same name
    /// resolves to its newest commit.
    ///
    /// # Errors
    /// If neither exists, or the branch has no commits.
    pub fn find(&self, tag: &Tag) -> Result<Version, TreeError> {
        if let Some(&version) = self.tags.get(tag) {
            return Ok(version);
        }
        self.named(tag)
            .and_then(Branch::head)
            .ok_or_else(|| TreeError::UnknownTag(tag.clone()))
    }

    /// Resolve a selector
    ///
    /// Masks pick the highest semantic version among the release tags that
    /// match. Dates pick the first commit carrying that date, scanning
    /// branches in index order.
    ///
    /// # Errors
    /// If nothing matches.
    pub fn find_selector(&self, selector: &VersionSelector) -> Result<Version, TreeError> {
        let found = match selector {
            VersionSelector::Tag(tag) => return self.find(tag),
            VersionSelector::Version(mask) => self
                .tags
                .iter()
                .filter_map(|(tag, &version)| {
                    let semantic = tag.semantic_version()?;
                    mask.matches(semantic).then_some((semantic, version))
                })
                .max_by_key(|&(semantic, _)| semantic)
                .map(|(_, version)| version),
            VersionSelector::Date(date) => self.branches.iter().find_map(|branch| {
                branch
                    .revisions
                    .iter()
                    .find(|(_, revision)| revision.commit.date.as_ref() == Some(date))
                    .map(|(revision, _)| Version::new(branch.index(), revision))
            }),
        };
        found.ok_or_else(|| TreeError::UnmatchedSelector(selector.clone()))
    }

    /// Trunk from `version` back to the root
    ///
    /// # Errors
    /// If `version` is not a committed version.
    pub fn fasces_through(&self, version: Version) -> Result<Fasces<'_>, TreeError> {
        Fasces::through(&self.branches, version)
    }

    /// Trunk of the ancestors of `branch`, starting at its fork point
    ///
    /// # Errors
    /// If the branch does not exist.
    pub fn fasces_up_to(&self, branch: BranchIndex) -> Result<Fasces<'_>, TreeError> {
        let branch = self.get(branch)?;
        Ok(Fasces::ancestors(&self.branches, branch))
    }

    /// A branch, mutably, together with the trunk of its ancestors
    pub(crate) fn split(
        &mut self,
        branch: BranchIndex,
    ) -> Result<(&mut Branch, Fasces<'_>), TreeError> {
        if branch.as_usize() >= self.branches.len() {
            return Err(TreeError::UnknownBranch(branch));
        }
        let (ancestors, rest) = self.branches.split_at_mut(branch.as_usize());
        let ancestors: &[Branch] = ancestors;
        let branch = &mut rest[0];
        let fasces = Fasces::ancestors(ancestors, branch);
        Ok((branch, fasces))
    }

    /// Panic if the tree's structure is inconsistent
    ///
    /// Checks branch indices and names, fork pointers and fork rings,
    /// alternate bookkeeping, buffer start offsets, and ring monotonicity.
    pub fn check_invariants(&self) {
        for (position, branch) in self.branches.iter().enumerate() {
            let index = branch.index();
            assert_eq!(index.as_usize(), position, "{index} stored at position {position}");
            assert_eq!(self.names.get(branch.id()), Some(&index), "{index} missing from name index");

            let start = branch.start();
            assert_eq!(branch.modules().start(), start.modules, "{index} module buffer start");
            assert_eq!(branch.symbols().start(), start.symbols, "{index} symbol buffer start");
            assert_eq!(branch.articles().start(), start.articles, "{index} article buffer start");

            if let Some(fork) = branch.fork() {
                assert!(
                    fork.version.branch < index,
                    "{index} forks from later {}",
                    fork.version.branch
                );
                let parent = &self.branches[fork.version.branch.as_usize()];
                let Some(revision) = parent.revisions().get(fork.version.revision) else {
                    panic!("{index} forks from missing {}", fork.version)
                };
                assert_eq!(revision.ring, fork.ring, "{index} fork ring differs from parent");
                assert!(
                    revision.alternates.contains(&index),
                    "{} does not list {index} as an alternate",
                    fork.version
                );
            }

            let mut previous = start;
            for (revision, record) in branch.revisions().iter() {
                assert!(
                    record.ring.contains(&previous),
                    "ring shrinks at {}",
                    Version::new(index, revision)
                );
                previous = record.ring;
                for alternate in &record.alternates {
                    let forked = self.branches[alternate.as_usize()].fork().map(|fork| fork.version);
                    assert_eq!(
                        forked,
                        Some(Version::new(index, revision)),
                        "{alternate} listed as alternate of the wrong revision"
                    );
                }
            }
            assert!(branch.ring().contains(&previous), "{index} buffers shrank after commit");
        }
        for version in self.tags.values() {
            assert!(
                self.get(version.branch)
                    .is_ok_and(|branch| branch.revisions().get(version.revision).is_some()),
                "tag points at missing {version}"
            );
        }
    }
}
