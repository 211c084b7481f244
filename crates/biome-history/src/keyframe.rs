//! Keyframes and heads
//!
//! A [`Keyframe`] records that a field held a value from some revision on.
//! Keyframes of one field on one branch form a chain linked from newest to
//! oldest; a [`Head`] addresses the newest keyframe of a chain.

use biome_versions::RevisionIndex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Arena slot index of a keyframe
pub(crate) type Slot = u32;

/// One entry in a field's history
///
/// Valid from `since` up to, but not including, the `since` of the next newer
/// keyframe in the same chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyframe<V> {
    /// Value the field held
    pub value: V,
    /// First revision the value was visible in
    pub since: RevisionIndex,
    pub(crate) previous: Option<Slot>,
}

impl<V> Keyframe<V> {
    /// Whether an older keyframe exists in this chain
    #[inline]
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

/// Handle to the newest keyframe of one chain
///
/// `since` is the revision of the chain's *oldest* keyframe: a head covers a
/// revision bound exactly when `since <= bound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Head {
    pub(crate) index: Slot,
    since: RevisionIndex,
}

impl Head {
    #[inline]
    pub(crate) const fn new(index: Slot, since: RevisionIndex) -> Self {
        Self { index, since }
    }

    /// Revision of the oldest keyframe in this chain
    #[inline]
    #[must_use]
    pub fn since(&self) -> RevisionIndex {
        self.since
    }

    /// Whether this chain has a keyframe at or before `bound`
    #[inline]
    #[must_use]
    pub fn covers(&self, bound: RevisionIndex) -> bool {
        self.since <= bound
    }
}

impl Display for Head {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "keyframe#{} (since {})", self.index, self.since)
    }
}
