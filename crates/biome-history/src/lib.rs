//! Biome History
//!
//! Compressed per-field timelines. Every field of every entity records only
//! the revisions where its value changed, as a chain of [`Keyframe`]s linked
//! newest to oldest inside a typed [`History`] arena. Branches that never
//! touched a field share their ancestor's chain by reading through a trunk of
//! [`Segment`]s.
//!
//! # Example
//!
//! ```rust
//! use biome_history::History;
//! use biome_versions::RevisionIndex;
//!
//! let mut history = History::new();
//! let mut head = None;
//! history.push("A", RevisionIndex::new(0), &mut head);
//! history.push("B", RevisionIndex::new(1), &mut head);
//!
//! let head = head.unwrap();
//! assert_eq!(history.value(head, RevisionIndex::new(0)), Some(&"A"));
//! assert_eq!(history.value(head, RevisionIndex::new(5)), Some(&"B"));
//! ```

#![warn(missing_docs)]

mod history;
mod keyframe;
mod rollback;
mod trunk;

pub use history::{Chain, Forest, History};
pub use keyframe::{Head, Keyframe};
pub use rollback::Rollbacks;
pub use trunk::{Origin, Segment};
