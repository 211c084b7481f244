//! Error types for Biome Tree
//!
//! Provides typed errors for the not-found cases callers are expected to
//! handle:
//! - Unresolved tags, selectors, branches and versions
//! - Atoms that are not visible from the branch being written
//! - Unknown packages and pins in an ecosystem
//! - Malformed configuration
//!
//! Broken internal invariants are not errors; they panic.

use crate::ids::{ModuleId, PackageId};
use biome_versions::{BranchIndex, PackageIndex, Tag, Version, VersionSelector};

/// Errors from tree and package operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// No tag and no branch has this name, or the branch has no commits
    #[error("unknown tag: {0}")]
    UnknownTag(Tag),

    /// No release tag or commit date matches the selector
    #[error("no version matches selector {0}")]
    UnmatchedSelector(VersionSelector),

    /// Branch index out of range
    #[error("unknown branch: {0}")]
    UnknownBranch(BranchIndex),

    /// Revision does not exist on its branch
    #[error("unknown version: {0}")]
    UnknownVersion(Version),

    /// Atom is not part of the branch's trunk
    #[error("{kind}@{offset} is not visible from {branch}")]
    InvisibleAtom {
        /// Entity kind name
        kind: &'static str,
        /// Atom offset
        offset: u32,
        /// Branch the atom was used on
        branch: BranchIndex,
    },

    /// Module identifier not registered in the trunk
    #[error("unknown module: {0}")]
    UnknownModule(ModuleId),

    /// Creating another branch would exceed the configured limit
    #[error("branch limit reached (max: {0})")]
    BranchLimit(usize),
}

impl TreeError {
    /// Check if the error is a lookup miss rather than bad input
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        !matches!(self, Self::BranchLimit(_))
    }
}

/// Errors from multi-package operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcosystemError {
    /// Package index out of range
    #[error("unknown package: {0}")]
    UnknownPackage(PackageIndex),

    /// Package identifier not registered
    #[error("unknown package id: {0}")]
    UnknownPackageId(PackageId),

    /// A pin names a version its package does not have
    #[error("pin {package} -> {version} does not exist")]
    UnknownPin {
        /// Pinned package
        package: PackageIndex,
        /// Pinned version
        version: Version,
    },

    /// A package tried to pin one of its own versions
    #[error("{0} cannot pin itself")]
    SelfPin(PackageIndex),

    /// Error from the package's own tree
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML could not be parsed
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use biome_versions::RevisionIndex;

    #[test]
    fn tree_error_converts_into_ecosystem_error() {
        let version = Version::new(BranchIndex::new(1), RevisionIndex::new(4));
        let error: EcosystemError = TreeError::UnknownVersion(version).into();
        assert_eq!(error.to_string(), "tree error: unknown version: branch#1:r4");
    }

    #[test]
    fn branch_limit_is_not_a_lookup_miss() {
        assert!(!TreeError::BranchLimit(4).is_not_found());
        assert!(TreeError::UnknownBranch(BranchIndex::new(0)).is_not_found());
    }
}
