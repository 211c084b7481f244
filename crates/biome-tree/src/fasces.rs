//! Trunks of branch periods
//!
//! A [`Fasces`] is the scope every historical lookup runs in: the periods
//! reachable by walking fork pointers back from one version, newest first.
//! Each [`Period`] is one branch cut off at the latest version visible
//! through the trunk. Fork pointers strictly decrease branch indices, so the
//! walk always terminates.

use crate::branch::{Branch, Fork};
use crate::buffer::BufferSlice;
use crate::elements::BranchElement;
use crate::error::TreeError;
use crate::fields::{Heads, OverlayField};
use crate::ring::Ring;
use crate::routes::Route;
use biome_history::{Origin, Segment};
use biome_versions::{Atom, Composite, Diacritic, Position, Version};
use smallvec::SmallVec;

/// One branch of a trunk, up to a version
#[derive(Debug, Clone, Copy)]
pub struct Period<'a> {
    /// The branch
    pub branch: &'a Branch,
    /// Latest version of the branch visible through the trunk
    pub latest: Version,
    /// Buffer ends at `latest`
    pub ring: Ring,
}

impl<'a> Period<'a> {
    /// Fork point of the period's branch
    #[inline]
    #[must_use]
    pub fn fork(&self) -> Option<Fork> {
        self.branch.fork()
    }

    /// The part of one buffer visible in this period
    #[must_use]
    pub fn slice<E: BranchElement>(&self) -> BufferSlice<'a, E> {
        E::buffer(self.branch).prefix(E::end(&self.ring))
    }
}

/// Ordered periods from a version back to the root branch
#[derive(Debug, Clone, Default)]
pub struct Fasces<'a> {
    periods: SmallVec<[Period<'a>; 4]>,
}

impl<'a> Fasces<'a> {
    /// Walk fork pointers back from `version`
    ///
    /// `branches` must contain every branch up to `version.branch`.
    ///
    /// # Errors
    /// If `version` is not a committed version.
    pub(crate) fn through(branches: &'a [Branch], version: Version) -> Result<Self, TreeError> {
        let mut periods = SmallVec::new();
        let mut cursor = Some(version);
        while let Some(version) = cursor {
            let branch = branches
                .get(version.branch.as_usize())
                .ok_or(TreeError::UnknownBranch(version.branch))?;
            let revision = branch
                .revisions
                .get(version.revision)
                .ok_or(TreeError::UnknownVersion(version))?;
            periods.push(Period {
                branch,
                latest: version,
                ring: revision.ring,
            });
            cursor = branch.fork().map(|fork| fork.version);
        }
        Ok(Self { periods })
    }

    /// Ancestors of `branch`, starting at its fork point
    pub(crate) fn ancestors(branches: &'a [Branch], branch: &Branch) -> Self {
        match branch.fork() {
            Some(fork) => Self::through(branches, fork.version).unwrap_or_else(|error| {
                panic!("fork point of {} is gone: {error}", branch.index())
            }),
            None => Self::default(),
        }
    }

    /// Periods, newest first
    #[inline]
    #[must_use]
    pub fn periods(&self) -> &[Period<'a>] {
        &self.periods
    }

    /// Number of periods
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Whether the trunk has no periods
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Newest version of the trunk
    #[must_use]
    pub fn latest(&self) -> Option<Version> {
        self.periods.first().map(|period| period.latest)
    }

    /// Period whose branch created `atom`, if `atom` is visible
    #[must_use]
    pub fn founder<E: BranchElement>(&self, atom: Atom<E::Kind>) -> Option<&Period<'a>> {
        let period = self
            .periods
            .iter()
            .find(|period| !E::buffer(period.branch).is_inherited(atom))?;
        period.slice::<E>().contains(atom).then_some(period)
    }

    /// Where `atom` is stored, if it is visible
    #[must_use]
    pub fn locate<E: BranchElement>(&self, atom: Atom<E::Kind>) -> Option<Position<E::Kind>> {
        self.founder::<E>(atom)
            .map(|period| atom.positioned(period.branch.index()))
    }

    /// Whether `atom` is visible
    #[must_use]
    pub fn contains<E: BranchElement>(&self, atom: Atom<E::Kind>) -> bool {
        self.founder::<E>(atom).is_some()
    }

    /// The entity at `atom`, if it is visible
    #[must_use]
    pub fn element<E: BranchElement>(&self, atom: Atom<E::Kind>) -> Option<&'a E> {
        let period = self.founder::<E>(atom)?;
        period.slice::<E>().get(atom).map(|entry| &entry.element)
    }

    /// Resolve an external identifier
    #[must_use]
    pub fn find<E: BranchElement>(&self, id: &E::Id) -> Option<Position<E::Kind>> {
        self.periods.iter().find_map(|period| {
            period
                .slice::<E>()
                .find(id)
                .map(|atom| atom.positioned(period.branch.index()))
        })
    }

    /// Trunk segments one field of `atom` is read through
    ///
    /// Stops at the period that created the atom.
    #[must_use]
    pub fn segments<E: BranchElement>(
        &self,
        atom: Atom<E::Kind>,
        field: <E::Heads as Heads>::Field,
    ) -> SmallVec<[Segment; 4]> {
        let mut segments = SmallVec::new();
        for period in &self.periods {
            let buffer = E::buffer(period.branch);
            if buffer.is_inherited(atom) {
                segments.push(Segment {
                    head: buffer.divergence(atom).and_then(|heads| heads.head(field)),
                    latest: period.latest,
                    origin: Origin::Inherited,
                });
            } else {
                let head = period
                    .slice::<E>()
                    .get(atom)
                    .and_then(|entry| entry.heads.head(field));
                segments.push(Segment {
                    head,
                    latest: period.latest,
                    origin: Origin::Contemporary,
                });
                break;
            }
        }
        segments
    }

    /// Trunk segments the overlay metadata of `diacritic` is read through
    #[must_use]
    pub fn overlay_segments(&self, diacritic: &Diacritic) -> SmallVec<[Segment; 4]> {
        let mut segments = SmallVec::new();
        for period in &self.periods {
            let contemporary = period.branch.index() == diacritic.host.branch;
            segments.push(Segment {
                head: period
                    .branch
                    .overlay(diacritic)
                    .and_then(|heads| heads.head(OverlayField::Metadata)),
                latest: period.latest,
                origin: if contemporary {
                    Origin::Contemporary
                } else {
                    Origin::Inherited
                },
            });
            if contemporary {
                break;
            }
        }
        segments
    }

    /// Composites bound under `route`, newest period first, without repeats
    #[must_use]
    pub fn select(&self, route: &Route) -> Vec<Composite> {
        let mut selected = Vec::new();
        for period in &self.periods {
            for composite in period.branch.routes.select(route, period.latest.revision) {
                if !selected.contains(&composite) {
                    selected.push(composite);
                }
            }
        }
        selected
    }
}
