//! Biome Versions
//!
//! Identity and position scheme for branch-aware fact storage.
//!
//! # Core Concepts
//!
//! - [`Atom<K>`]: opaque per-lineage offset of one entity of kind `K`
//! - [`Position<K>`]: an atom plus the branch whose buffer holds it
//! - [`Diacritic`], [`Composite`], [`Compound`]: symbols seen through the
//!   module that perpetrated them
//! - [`Version`]: `(branch, revision)`, a point in time on one branch
//! - [`Tag`] and [`VersionSelector`]: already-parsed names readers ask for
//!
//! # Example
//!
//! ```rust
//! use biome_versions::{kind, Atom, BranchIndex, PackageIndex, Version, RevisionIndex};
//!
//! let module = Atom::<kind::Module>::new(PackageIndex::new(0), 0);
//! let symbol = Atom::<kind::Symbol>::new(module, 12);
//! let position = symbol.positioned(BranchIndex::new(1));
//!
//! assert_eq!(position.culture(), module);
//! assert_eq!(
//!     Version::new(BranchIndex::new(1), RevisionIndex::new(3)).to_string(),
//!     "branch#1:r3"
//! );
//! ```

#![warn(missing_docs)]

mod atom;
mod diacritic;
mod selector;
mod tag;
mod version;

pub use atom::{kind, Atom, Kind, Position};
pub use diacritic::{Composite, Compound, Diacritic};
pub use selector::{Date, MaskedVersion, SelectorError, VersionSelector};
pub use tag::{SemanticVersion, Tag, TagError, MAX_TAG_LENGTH};
pub use version::{BranchIndex, PackageIndex, RevisionIndex, Version};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn valid_tags_round_trip_through_display(text in "[A-Za-z0-9._/-]{1,64}") {
            let tag: Tag = text.parse().unwrap();
            prop_assert_eq!(tag.to_string(), text);
        }

        #[test]
        fn semantic_tags_match_their_own_mask(major in 0u16..100, minor in 0u16..100, patch in 0u16..100) {
            let tag: Tag = format!("v{major}.{minor}.{patch}").parse().unwrap();
            let version = tag.semantic_version().unwrap();
            prop_assert!(MaskedVersion::Patch(major, minor, patch).matches(version));
            prop_assert!(MaskedVersion::Major(major).matches(version));
        }
    }
}
