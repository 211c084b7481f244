//! Revisions
//!
//! A [`Revision`] is one commit on a branch: the ring it locked in, the
//! versions of other packages it was built against, and the bookkeeping that
//! keeps it from being reverted while something still depends on it.

use crate::ring::Ring;
use biome_versions::{BranchIndex, Date, PackageIndex, RevisionIndex, Tag, Version};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Index;

/// Source-control information for one commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit hash
    pub hash: String,
    /// Toolchain snapshot date, if the commit is a toolchain build
    pub date: Option<Date>,
    /// Release tag, if the commit is tagged
    pub tag: Option<Tag>,
}

impl Commit {
    /// Untagged, undated commit
    #[inline]
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            date: None,
            tag: None,
        }
    }

    /// With release tag
    #[inline]
    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// With toolchain date
    #[inline]
    #[must_use]
    pub fn with_date(mut self, date: Date) -> Self {
        self.date = Some(date);
        self
    }
}

/// Versions of other packages a commit was built against
pub type Pins = BTreeMap<PackageIndex, Version>;

/// One commit on a branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Monotonic per-package commit token
    pub token: u64,
    /// Buffer ends at commit time
    pub ring: Ring,
    /// Cross-package pins active at commit time
    pub pins: Pins,
    /// Branches forked from exactly this revision
    pub alternates: SmallVec<[BranchIndex; 1]>,
    /// Versions of other packages that pinned this revision
    pub consumers: BTreeMap<PackageIndex, BTreeSet<Version>>,
    /// Source-control information
    pub commit: Commit,
}

impl Revision {
    /// Whether anything still depends on this revision
    #[inline]
    #[must_use]
    pub fn is_referenced(&self) -> bool {
        !self.alternates.is_empty() || self.consumers.values().any(|versions| !versions.is_empty())
    }

    pub(crate) fn add_consumer(&mut self, package: PackageIndex, version: Version) {
        self.consumers.entry(package).or_default().insert(version);
    }

    pub(crate) fn remove_consumer(&mut self, package: PackageIndex, version: Version) {
        if let Some(versions) = self.consumers.get_mut(&package) {
            versions.remove(&version);
            if versions.is_empty() {
                self.consumers.remove(&package);
            }
        }
    }
}

/// Append-only commit log of one branch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revisions {
    revisions: Vec<Revision>,
}

impl Revisions {
    /// Number of commits
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    /// Whether nothing was committed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    /// Index the next commit will get
    #[must_use]
    pub fn pending(&self) -> RevisionIndex {
        RevisionIndex::new(index(self.revisions.len()))
    }

    /// Newest revision index
    #[must_use]
    pub fn head(&self) -> Option<RevisionIndex> {
        self.pending().predecessor()
    }

    /// Look up one revision
    #[inline]
    #[must_use]
    pub fn get(&self, revision: RevisionIndex) -> Option<&Revision> {
        self.revisions.get(revision.as_usize())
    }

    pub(crate) fn get_mut(&mut self, revision: RevisionIndex) -> Option<&mut Revision> {
        self.revisions.get_mut(revision.as_usize())
    }

    /// Revisions with their indices, oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (RevisionIndex, &Revision)> + '_ {
        self.revisions
            .iter()
            .enumerate()
            .map(|(i, revision)| (RevisionIndex::new(index(i)), revision))
    }

    /// Revisions strictly after `to`, or all of them for `None`
    pub fn after(&self, to: Option<RevisionIndex>) -> impl Iterator<Item = (RevisionIndex, &Revision)> + '_ {
        let skip = to.map_or(0, |to| to.as_usize() + 1);
        self.iter().skip(skip)
    }

    pub(crate) fn push(&mut self, revision: Revision) -> RevisionIndex {
        let index = self.pending();
        self.revisions.push(revision);
        index
    }

    pub(crate) fn truncate(&mut self, to: Option<RevisionIndex>) {
        self.revisions.truncate(to.map_or(0, |to| to.as_usize() + 1));
    }
}

impl Index<RevisionIndex> for Revisions {
    type Output = Revision;

    fn index(&self, revision: RevisionIndex) -> &Revision {
        &self.revisions[revision.as_usize()]
    }
}

fn index(position: usize) -> u32 {
    u32::try_from(position).unwrap_or_else(|_| panic!("revision log exceeds u32 entries"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revision(token: u64) -> Revision {
        Revision {
            token,
            ring: Ring::default(),
            pins: Pins::new(),
            alternates: SmallVec::new(),
            consumers: BTreeMap::new(),
            commit: Commit::new(format!("{token:040x}")),
        }
    }

    #[test]
    fn pending_and_head() {
        let mut revisions = Revisions::default();
        assert_eq!(revisions.head(), None);
        assert_eq!(revisions.push(revision(0)), RevisionIndex::new(0));
        assert_eq!(revisions.push(revision(1)), RevisionIndex::new(1));
        assert_eq!(revisions.head(), Some(RevisionIndex::new(1)));
        assert_eq!(revisions.pending(), RevisionIndex::new(2));
    }

    #[test]
    fn after_and_truncate() {
        let mut revisions = Revisions::default();
        for token in 0..4 {
            revisions.push(revision(token));
        }
        let tokens: Vec<u64> = revisions
            .after(Some(RevisionIndex::new(1)))
            .map(|(_, r)| r.token)
            .collect();
        assert_eq!(tokens, vec![2, 3]);

        revisions.truncate(Some(RevisionIndex::new(1)));
        assert_eq!(revisions.len(), 2);
        revisions.truncate(None);
        assert!(revisions.is_empty());
    }

    #[test]
    fn consumers_reference_a_revision() {
        let mut r = revision(0);
        assert!(!r.is_referenced());
        let version = Version::new(BranchIndex::new(0), RevisionIndex::new(3));
        r.add_consumer(PackageIndex::new(2), version);
        assert!(r.is_referenced());
        r.remove_consumer(PackageIndex::new(2), version);
        assert!(!r.is_referenced());
        assert!(r.consumers.is_empty());
    }
}
