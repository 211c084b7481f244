//! Keyframe arena
//!
//! Provides [`History`], the forest of keyframe chains for every field that
//! stores values of one type. Chains are addressed by [`Head`]s kept outside
//! the arena (in intrinsic buffers and divergence records); the arena itself
//! knows nothing about branches.

use crate::keyframe::{Head, Keyframe, Slot};
use crate::rollback::Rollbacks;
use biome_versions::RevisionIndex;

/// Forest of keyframe chains for values of type `V`
///
/// Slots freed by erosion are recycled by later pushes.
#[derive(Debug, Clone)]
pub struct History<V> {
    slots: Vec<Option<Keyframe<V>>>,
    free: Vec<Slot>,
    live: usize,
}

impl<V> Default for History<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> History<V> {
    /// Create an empty forest
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Create an empty forest with room for `capacity` keyframes
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Number of live keyframes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether no keyframe is live
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of arena slots, live or vacant
    #[inline]
    #[must_use]
    pub fn slots(&self) -> usize {
        self.slots.len()
    }

    /// Keyframes of one chain, newest first
    #[inline]
    #[must_use]
    pub fn chain(&self, head: Head) -> Chain<'_, V> {
        Chain {
            history: self,
            cursor: Some(head.index),
        }
    }

    /// Most recent value of a chain
    #[inline]
    #[must_use]
    pub fn newest(&self, head: Head) -> &V {
        &self.keyframe(head.index).value
    }

    /// Value of a chain as of `bound`, if the chain had begun by then
    #[must_use]
    pub fn value(&self, head: Head, bound: RevisionIndex) -> Option<&V> {
        self.chain(head)
            .find(|keyframe| keyframe.since <= bound)
            .map(|keyframe| &keyframe.value)
    }

    /// Roll one chain back to its newest keyframe at or before `until`
    ///
    /// Every newer keyframe is freed. `until = None` frees the whole chain.
    /// Returns the rolled-back head, or `None` if nothing survives.
    pub fn erode_chain(&mut self, head: Head, until: Option<RevisionIndex>) -> Option<Head> {
        let mut cursor = Some(head.index);
        while let Some(slot) = cursor {
            let keyframe = self.keyframe(slot);
            if until.is_some_and(|until| keyframe.since <= until) {
                return Some(Head::new(slot, head.since()));
            }
            cursor = keyframe.previous;
            self.release(slot);
        }
        None
    }

    fn keyframe(&self, slot: Slot) -> &Keyframe<V> {
        match self.slots.get(slot as usize) {
            Some(Some(keyframe)) => keyframe,
            _ => panic!("keyframe slot {slot} is vacant; a head outlived its chain"),
        }
    }

    fn keyframe_mut(&mut self, slot: Slot) -> &mut Keyframe<V> {
        match self.slots.get_mut(slot as usize) {
            Some(Some(keyframe)) => keyframe,
            _ => panic!("keyframe slot {slot} is vacant; a head outlived its chain"),
        }
    }

    fn allocate(&mut self, keyframe: Keyframe<V>) -> Slot {
        self.live += 1;
        if let Some(slot) = self.free.pop() {
            self.slots[slot as usize] = Some(keyframe);
            return slot;
        }
        let slot = Slot::try_from(self.slots.len())
            .unwrap_or_else(|_| panic!("keyframe arena exceeds u32 slots"));
        self.slots.push(Some(keyframe));
        slot
    }

    fn release(&mut self, slot: Slot) {
        if self.slots[slot as usize].take().is_some() {
            self.live -= 1;
            self.free.push(slot);
        }
    }
}

impl<V: PartialEq> History<V> {
    /// Prepend a keyframe to the chain at `head`
    ///
    /// Starts a new chain when `head` is `None`. A push in the same revision
    /// as the current newest keyframe replaces that keyframe instead, and
    /// drops it entirely if the replacement equals the next older value.
    ///
    /// # Panics
    /// If `revision` is older than the chain's newest keyframe.
    pub fn push(&mut self, value: V, revision: RevisionIndex, head: &mut Option<Head>) {
        let Some(current) = *head else {
            let slot = self.allocate(Keyframe {
                value,
                since: revision,
                previous: None,
            });
            tracing::trace!(slot, %revision, "started keyframe chain");
            *head = Some(Head::new(slot, revision));
            return;
        };

        let newest = self.keyframe(current.index);
        assert!(
            newest.since <= revision,
            "keyframe pushed at {revision} behind newest keyframe at {}",
            newest.since
        );

        if newest.since < revision {
            let slot = self.allocate(Keyframe {
                value,
                since: revision,
                previous: Some(current.index),
            });
            tracing::trace!(slot, %revision, "pushed keyframe");
            *head = Some(Head::new(slot, current.since()));
            return;
        }

        if let Some(previous) = newest.previous {
            if self.keyframe(previous).value == value {
                self.release(current.index);
                tracing::trace!(slot = previous, %revision, "collapsed same-revision keyframe");
                *head = Some(Head::new(previous, current.since()));
                return;
            }
        }
        self.keyframe_mut(current.index).value = value;
    }
}

/// Forest operations that do not depend on the value type
///
/// Lets a package erode every forest it owns through one dispatch table.
pub trait Forest {
    /// Roll each chain back to the boundary `until`
    ///
    /// Heads that are unaffected do not appear in the result.
    fn erode(&mut self, heads: &[Head], until: Option<RevisionIndex>) -> Rollbacks;

    /// Number of live keyframes
    fn keyframes(&self) -> usize;
}

impl<V> Forest for History<V> {
    fn erode(&mut self, heads: &[Head], until: Option<RevisionIndex>) -> Rollbacks {
        let mut rollbacks = Rollbacks::new();
        let before = self.live;
        for &head in heads {
            if rollbacks.contains(head) {
                continue;
            }
            let rolled = self.erode_chain(head, until);
            if rolled != Some(head) {
                rollbacks.insert(head, rolled);
            }
        }
        if before != self.live {
            tracing::debug!(
                freed = before - self.live,
                rolled_back = rollbacks.len(),
                until = ?until,
                "eroded keyframe forest"
            );
        }
        rollbacks
    }

    fn keyframes(&self) -> usize {
        self.live
    }
}

/// Iterator over one keyframe chain, newest first
#[derive(Debug, Clone)]
pub struct Chain<'a, V> {
    history: &'a History<V>,
    cursor: Option<Slot>,
}

impl<'a, V> Iterator for Chain<'a, V> {
    type Item = &'a Keyframe<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let keyframe = self.history.keyframe(self.cursor?);
        self.cursor = keyframe.previous;
        Some(keyframe)
    }
}
