//! Lookups across a trunk of branch segments
//!
//! A trunk lists, newest first, the segments a field's value may be inherited
//! through: the branch being read, then its fork parent up to the fork point,
//! then the grandparent, and so on. Each [`Segment`] carries the head the
//! field has on that branch (its own chain or a divergence chain) and the
//! latest version of that branch visible in the trunk.

use crate::history::History;
use crate::keyframe::Head;
use biome_versions::{RevisionIndex, Version};

/// How an entity relates to a segment's branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The entity was created on this branch; no older segment knows it
    Contemporary,
    /// The entity predates this branch; older segments may hold its value
    Inherited,
}

/// One branch segment of a trunk, as seen by one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// The field's head on this branch, if it has one
    pub head: Option<Head>,
    /// Latest version of this branch visible in the trunk
    pub latest: Version,
    /// Whether older segments should be consulted
    pub origin: Origin,
}

impl Segment {
    /// Revision bound of this segment
    #[inline]
    #[must_use]
    pub fn bound(&self) -> RevisionIndex {
        self.latest.revision
    }

    fn covering(&self) -> Option<Head> {
        self.head.filter(|head| head.covers(self.bound()))
    }
}

impl<V> History<V> {
    /// Value of a field as seen through a trunk
    ///
    /// The newest segment whose head covers its bound answers. A contemporary
    /// segment without a covering head ends the walk.
    ///
    /// # Panics
    /// If a head covers its bound but holds no keyframe within it.
    pub fn value_in<I>(&self, trunk: I) -> Option<&V>
    where
        I: IntoIterator<Item = Segment>,
    {
        for segment in trunk {
            if let Some(head) = segment.covering() {
                let Some(value) = self.value(head, segment.bound()) else {
                    unreachable!("{head} covers {} but has no keyframe there", segment.latest)
                };
                return Some(value);
            }
            if segment.origin == Origin::Contemporary {
                break;
            }
        }
        None
    }

    /// Most recent version at which a field's value satisfied `predicate`
    ///
    /// Scans keyframes newest first. The first satisfying keyframe answers
    /// with the last version that still displayed it: the revision before the
    /// next newer keyframe of its chain, or, for the newest keyframe, the
    /// latest version of the newest segment that inherited it.
    pub fn latest_version_in<I, F>(&self, trunk: I, mut predicate: F) -> Option<Version>
    where
        I: IntoIterator<Item = Segment>,
        F: FnMut(&V) -> bool,
    {
        let mut ceiling: Option<Version> = None;
        for segment in trunk {
            let branch = segment.latest.branch;
            let Some(head) = segment.covering() else {
                if segment.origin == Origin::Contemporary {
                    return None;
                }
                ceiling = ceiling.or(Some(segment.latest));
                continue;
            };

            let mut newer: Option<RevisionIndex> = None;
            for keyframe in self.chain(head) {
                if keyframe.since > segment.bound() {
                    continue;
                }
                if predicate(&keyframe.value) {
                    return Some(match newer {
                        Some(newer) => {
                            let Some(last) = newer.predecessor() else {
                                unreachable!("keyframe newer than {} at r0", keyframe.since)
                            };
                            Version::new(branch, last)
                        }
                        None => ceiling.unwrap_or(segment.latest),
                    });
                }
                newer = Some(keyframe.since);
            }

            if segment.origin == Origin::Contemporary {
                return None;
            }
            ceiling = head
                .since()
                .predecessor()
                .map(|revision| Version::new(branch, revision));
        }
        None
    }
}
