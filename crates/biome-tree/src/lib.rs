//! Biome Tree - branch-aware documentation storage
//!
//! Stores the facts extracted from every revision of every branch of a
//! package:
//! - Modules, symbols and articles live in per-branch intrinsic buffers
//! - Field values live in keyframe forests shared by all branches
//! - Forked branches inherit their parent's entities and diverge per field
//! - Reverts erode keyframes and truncate buffers back to a revision
//! - Pinned views answer reads as of any committed version
//!
//! # Example
//!
//! ```rust
//! use biome_tree::{Commit, ModuleId, ModuleMetadata, Package, PackageConfig, Pins, Update};
//! use biome_versions::PackageIndex;
//!
//! let mut package = Package::new(PackageIndex::new(0), "swift-collections".into(), PackageConfig::new());
//! let main = package.branch("main".parse().unwrap(), None).unwrap();
//! let deque = package.add_module(main, ModuleId::from("DequeModule")).unwrap();
//! package
//!     .update_module_metadata(main, deque, Some(ModuleMetadata::default()))
//!     .unwrap();
//! let v0 = package.commit(main, Commit::new("4c1e5a"), Pins::new()).unwrap();
//!
//! // A fork sees the module without copying it
//! let feature = package.branch("feature".parse().unwrap(), Some(v0)).unwrap();
//! let update = package
//!     .update_module_metadata(feature, deque, Some(ModuleMetadata::default()))
//!     .unwrap();
//! assert_eq!(update, Update::Unchanged);
//! let f0 = package.commit(feature, Commit::new("9b07d2"), Pins::new()).unwrap();
//!
//! assert!(package.pinned(f0).unwrap().metadata(deque).is_some());
//! assert_eq!(package.keyframes(), 1);
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod branch;
pub mod buffer;
pub mod config;
pub mod ecosystem;
pub mod elements;
pub mod error;
pub mod evolution;
pub mod fasces;
pub mod fields;
pub mod histories;
pub mod ids;
pub mod package;
pub mod pinned;
pub mod revision;
pub mod ring;
pub mod routes;
pub mod tree;
pub mod values;

pub use branch::{Branch, Fork};
pub use buffer::{BufferSlice, Entry, IntrinsicBuffer, Update};
pub use config::PackageConfig;
pub use ecosystem::Ecosystem;
pub use elements::{Article, BranchElement, Module, Symbol};
pub use error::{ConfigError, EcosystemError, TreeError};
pub use evolution::{EvolutionRow, Presence};
pub use fasces::{Fasces, Period};
pub use fields::{
    ArticleField, ArticleHeads, FieldKey, Heads, ModuleField, ModuleHeads, OverlayField,
    OverlayHeads, SymbolField, SymbolHeads,
};
pub use histories::{Erosion, ForestKind, Histories, HeadsByForest};
pub use ids::{ArticleId, ModuleId, PackageId, SymbolId};
pub use package::Package;
pub use pinned::Pinned;
pub use revision::{Commit, Pins, Revision, Revisions};
pub use ring::Ring;
pub use routes::{Binding, Route, RouteTable};
pub use tree::Tree;
pub use values::{
    ArticleMetadata, Declaration, Documentation, ModuleMetadata, OverlayMetadata, SymbolMetadata,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for writing and reading packages
    pub use crate::{
        Article, Commit, Documentation, Ecosystem, Module, ModuleId, ModuleMetadata, Package,
        PackageConfig, PackageId, Pinned, Pins, Symbol, SymbolId, SymbolMetadata, TreeError,
        Update,
    };
    pub use biome_versions::{BranchIndex, PackageIndex, RevisionIndex, Tag, Version};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
