//! Ecosystems of packages
//!
//! Packages pin versions of other packages when they commit. The ecosystem
//! validates those pins and records every pinning revision as a consumer of
//! the pinned one, so a pinned revision cannot be reverted from under its
//! dependents.

use crate::config::PackageConfig;
use crate::error::EcosystemError;
use crate::ids::PackageId;
use crate::package::Package;
use crate::revision::{Commit, Pins};
use biome_versions::{BranchIndex, PackageIndex, RevisionIndex, Version};
use std::collections::HashMap;
use tracing::{debug, info};

/// Every package known to one documentation database
#[derive(Debug, Clone, Default)]
pub struct Ecosystem {
    config: PackageConfig,
    packages: Vec<Package>,
    ids: HashMap<PackageId, PackageIndex>,
}

impl Ecosystem {
    /// Create an empty ecosystem; new packages get `config`
    #[must_use]
    pub fn new(config: PackageConfig) -> Self {
        Self {
            config,
            packages: Vec::new(),
            ids: HashMap::new(),
        }
    }

    /// Number of packages
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether no package is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Packages, by index
    pub fn packages(&self) -> impl Iterator<Item = &Package> + '_ {
        self.packages.iter()
    }

    /// Index of `id`, registering a new package if needed
    pub fn register(&mut self, id: PackageId) -> PackageIndex {
        if let Some(&index) = self.ids.get(&id) {
            return index;
        }
        let index = PackageIndex::new(
            u32::try_from(self.packages.len()).unwrap_or_else(|_| panic!("ecosystem exceeds u32 packages")),
        );
        info!(package = %index, id = %id, "registered package");
        self.packages.push(Package::new(index, id.clone(), self.config.clone()));
        self.ids.insert(id, index);
        index
    }

    /// Index of a registered package
    ///
    /// # Errors
    /// If no package has this identifier.
    pub fn index(&self, id: &PackageId) -> Result<PackageIndex, EcosystemError> {
        self.ids
            .get(id)
            .copied()
            .ok_or_else(|| EcosystemError::UnknownPackageId(id.clone()))
    }

    /// One package
    ///
    /// # Errors
    /// If the index is out of range.
    pub fn package(&self, package: PackageIndex) -> Result<&Package, EcosystemError> {
        self.packages
            .get(package.as_usize())
            .ok_or(EcosystemError::UnknownPackage(package))
    }

    /// One package, mutably
    ///
    /// Commits and reverts that involve pins should go through
    /// [`Ecosystem::commit`] and [`Ecosystem::revert`] instead.
    ///
    /// # Errors
    /// If the index is out of range.
    pub fn package_mut(&mut self, package: PackageIndex) -> Result<&mut Package, EcosystemError> {
        self.packages
            .get_mut(package.as_usize())
            .ok_or(EcosystemError::UnknownPackage(package))
    }

    /// Commit a package's pending revision with dependency pins
    ///
    /// # Errors
    /// If a pin names an unknown package or version, or the package pins
    /// itself. Nothing is committed in that case.
    pub fn commit(
        &mut self,
        package: PackageIndex,
        branch: BranchIndex,
        commit: Commit,
        pins: Pins,
    ) -> Result<Version, EcosystemError> {
        for (&pinned, &version) in &pins {
            if pinned == package {
                return Err(EcosystemError::SelfPin(package));
            }
            let exists = self
                .package(pinned)?
                .tree()
                .get(version.branch)
                .is_ok_and(|branch| branch.revisions().get(version.revision).is_some());
            if !exists {
                return Err(EcosystemError::UnknownPin {
                    package: pinned,
                    version,
                });
            }
        }

        let version = self.package_mut(package)?.commit(branch, commit, pins.clone())?;
        for (pinned, pinned_version) in pins {
            let revision = self.packages[pinned.as_usize()].revision_mut(pinned_version);
            match revision {
                Some(revision) => revision.add_consumer(package, version),
                None => unreachable!("pin {pinned} -> {pinned_version} vanished during commit"),
            }
            debug!(%package, %version, %pinned, %pinned_version, "recorded consumer");
        }
        Ok(version)
    }

    /// Revert a package's branch, withdrawing the pins of the removed revisions
    ///
    /// # Panics
    /// If another package pins a revision that would be removed.
    ///
    /// # Errors
    /// If the package or branch does not exist, or `to` was never committed.
    pub fn revert(
        &mut self,
        package: PackageIndex,
        branch: BranchIndex,
        to: Option<RevisionIndex>,
    ) -> Result<(), EcosystemError> {
        let target = self.package(package)?.tree().get(branch)?;
        if let Some(to) = to {
            target.version(to)?;
        }
        let withdrawn: Vec<(Version, Pins)> = target
            .revisions()
            .after(to)
            .map(|(revision, record)| (Version::new(branch, revision), record.pins.clone()))
            .collect();

        for (version, pins) in withdrawn {
            for (pinned, pinned_version) in pins {
                if let Some(revision) = self
                    .packages
                    .get_mut(pinned.as_usize())
                    .and_then(|pinned| pinned.revision_mut(pinned_version))
                {
                    revision.remove_consumer(package, version);
                }
            }
        }
        self.package_mut(package)?.revert(branch, to)?;
        Ok(())
    }
}
