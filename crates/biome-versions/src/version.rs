//! Version coordinates
//!
//! Provides [`Version`], the global "point in time on a branch" coordinate,
//! and the index newtypes it is made of.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Index of a package within an ecosystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageIndex(u32);

/// Index of a branch within one package's tree
///
/// Fork pointers always reference a strictly smaller branch index, because a
/// branch can only fork from a branch that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BranchIndex(u32);

/// Branch-relative index of a revision (commit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RevisionIndex(u32);

macro_rules! index_newtype {
    ($name:ident, $prefix:literal) => {
        impl $name {
            /// Create from raw value
            #[inline]
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Raw value
            #[inline]
            #[must_use]
            pub const fn value(self) -> u32 {
                self.0
            }

            /// Raw value as a storage offset
            #[inline]
            #[must_use]
            pub const fn as_usize(self) -> usize {
                self.0 as usize
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

index_newtype!(PackageIndex, "package#");
index_newtype!(BranchIndex, "branch#");
index_newtype!(RevisionIndex, "r");

impl RevisionIndex {
    /// The revision immediately before this one, if any
    #[inline]
    #[must_use]
    pub const fn predecessor(self) -> Option<Self> {
        match self.0.checked_sub(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// The revision immediately after this one
    #[inline]
    #[must_use]
    pub const fn successor(self) -> Self {
        Self(self.0 + 1)
    }
}

/// A point in time on one branch
///
/// Ordering is lexicographic (branch, then revision); it is only meaningful
/// between versions of the same branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Branch this version lives on
    pub branch: BranchIndex,
    /// Revision within that branch
    pub revision: RevisionIndex,
}

impl Version {
    /// Create a version
    #[inline]
    #[must_use]
    pub const fn new(branch: BranchIndex, revision: RevisionIndex) -> Self {
        Self { branch, revision }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.branch, self.revision)
    }
}
