//! Intrinsic buffers
//!
//! An [`IntrinsicBuffer`] is the append-only store of one entity kind on one
//! branch. Entities created on the branch live in `entries`, at offsets
//! counted from the branch's fork ring. Entities inherited from ancestors are
//! never copied; when the branch changes one of their fields, the new chain
//! goes into a divergence record in a side table keyed by atom.

use crate::elements::BranchElement;
use crate::error::TreeError;
use crate::fasces::Fasces;
use crate::fields::Heads;
use crate::histories::{Erosion, HeadsByForest};
use biome_history::History;
use biome_versions::{Atom, BranchIndex, Kind, Position, RevisionIndex};
use std::collections::HashMap;
use std::ops::Index;

/// What an update did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Update {
    /// The visible value already matched; nothing was written
    Unchanged,
    /// A keyframe was added to an existing chain on this branch
    Advanced,
    /// An inherited field got its first keyframe on this branch
    Diverged,
}

/// One entity created on a branch, with its local heads
#[derive(Debug, Clone)]
pub struct Entry<E: BranchElement> {
    /// The entity
    pub element: E,
    /// Heads of the entity's own history
    pub heads: E::Heads,
}

/// Append-only storage for one entity kind on one branch
#[derive(Debug, Clone)]
pub struct IntrinsicBuffer<E: BranchElement> {
    branch: BranchIndex,
    start: u32,
    entries: Vec<Entry<E>>,
    atoms: HashMap<E::Id, Atom<E::Kind>>,
    divergences: HashMap<Atom<E::Kind>, E::Heads>,
}

impl<E: BranchElement> IntrinsicBuffer<E> {
    pub(crate) fn new(branch: BranchIndex, start: u32) -> Self {
        Self {
            branch,
            start,
            entries: Vec::new(),
            atoms: HashMap::new(),
            divergences: HashMap::new(),
        }
    }

    /// Branch owning this buffer
    #[inline]
    #[must_use]
    pub fn branch(&self) -> BranchIndex {
        self.branch
    }

    /// First offset this buffer assigns
    #[inline]
    #[must_use]
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Offset the next entity will get
    #[inline]
    #[must_use]
    pub fn end(&self) -> u32 {
        self.start + offset(self.entries.len())
    }

    /// Number of entities created on this branch
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entity was created on this branch
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `atom` was created on this branch's lineage before it forked
    #[inline]
    #[must_use]
    pub fn is_inherited(&self, atom: Atom<E::Kind>) -> bool {
        atom.offset() < self.start
    }

    /// Whether `atom` is stored in this buffer
    #[inline]
    #[must_use]
    pub fn contains(&self, atom: Atom<E::Kind>) -> bool {
        (self.start..self.end()).contains(&atom.offset())
    }

    /// Atom registered here under `id`
    #[must_use]
    pub fn atom(&self, id: &E::Id) -> Option<Atom<E::Kind>> {
        self.atoms.get(id).copied()
    }

    /// Entry stored at `atom`
    #[must_use]
    pub fn get(&self, atom: Atom<E::Kind>) -> Option<&Entry<E>> {
        if self.is_inherited(atom) {
            return None;
        }
        self.entries.get((atom.offset() - self.start) as usize)
    }

    /// Divergence record of an inherited entity
    #[must_use]
    pub fn divergence(&self, atom: Atom<E::Kind>) -> Option<&E::Heads> {
        self.divergences.get(&atom)
    }

    /// Number of divergence records
    #[inline]
    #[must_use]
    pub fn divergences(&self) -> usize {
        self.divergences.len()
    }

    /// Entries with their atoms, in offset order
    pub fn iter(&self) -> impl Iterator<Item = (Atom<E::Kind>, &Entry<E>)> + '_ {
        self.entries.iter().enumerate().map(move |(i, entry)| {
            (Atom::new(entry.element.culture(), self.start + offset(i)), entry)
        })
    }

    /// Register an entity, or return the atom it already has
    ///
    /// `create` runs only when `id` is new here.
    pub fn insert(
        &mut self,
        id: E::Id,
        culture: <E::Kind as Kind>::Culture,
        create: impl FnOnce() -> E,
    ) -> Atom<E::Kind> {
        if let Some(&atom) = self.atoms.get(&id) {
            return atom;
        }
        let atom = Atom::new(culture, self.end());
        self.entries.push(Entry {
            element: create(),
            heads: E::Heads::default(),
        });
        self.atoms.insert(id, atom);
        atom
    }

    /// Read-only view of the entries below `end`
    #[must_use]
    pub fn prefix(&self, end: u32) -> BufferSlice<'_, E> {
        BufferSlice {
            buffer: self,
            end: end.clamp(self.start, self.end()),
        }
    }

    /// Head a field has on this branch, local or divergent
    #[must_use]
    pub fn head(
        &self,
        atom: Atom<E::Kind>,
        field: <E::Heads as Heads>::Field,
    ) -> Option<biome_history::Head> {
        if self.is_inherited(atom) {
            self.divergences.get(&atom)?.head(field)
        } else {
            self.get(atom)?.heads.head(field)
        }
    }

    /// Write a field, pushing a keyframe only if the visible value changes
    ///
    /// Contemporary entities compare against their own newest keyframe.
    /// Inherited entities compare against this branch's divergence chain if
    /// there is one, otherwise against the value `ancestors` shows.
    ///
    /// # Errors
    /// If `atom` is contemporary to this branch but not registered yet.
    pub fn update<V: PartialEq>(
        &mut self,
        history: &mut History<V>,
        atom: Atom<E::Kind>,
        field: <E::Heads as Heads>::Field,
        value: V,
        revision: RevisionIndex,
        ancestors: &Fasces<'_>,
    ) -> Result<Update, TreeError> {
        if !self.is_inherited(atom) {
            let branch = self.branch;
            let start = self.start;
            let entry = self
                .entries
                .get_mut((atom.offset() - start) as usize)
                .ok_or_else(|| TreeError::InvisibleAtom {
                    kind: <E::Kind as Kind>::NAME,
                    offset: atom.offset(),
                    branch,
                })?;
            let head = entry.heads.head_mut(field);
            if (*head).is_some_and(|head| *history.newest(head) == value) {
                return Ok(Update::Unchanged);
            }
            history.push(value, revision, head);
            return Ok(Update::Advanced);
        }

        if let Some(heads) = self.divergences.get_mut(&atom) {
            if let Some(current) = heads.head(field) {
                if *history.newest(current) == value {
                    return Ok(Update::Unchanged);
                }
                // A chain begun in this revision is its only keyframe
                if current.since() == revision
                    && history.value_in(ancestors.segments::<E>(atom, field)) == Some(&value)
                {
                    *heads.head_mut(field) = history.erode_chain(current, revision.predecessor());
                    if heads.is_empty() {
                        self.divergences.remove(&atom);
                    }
                    tracing::debug!(
                        branch = %self.branch,
                        atom = %atom,
                        field = ?field,
                        %revision,
                        "divergence rejoined ancestor"
                    );
                    return Ok(Update::Unchanged);
                }
                history.push(value, revision, heads.head_mut(field));
                return Ok(Update::Advanced);
            }
        }

        let inherited = history.value_in(ancestors.segments::<E>(atom, field));
        if inherited == Some(&value) {
            return Ok(Update::Unchanged);
        }
        let heads = self.divergences.entry(atom).or_default();
        history.push(value, revision, heads.head_mut(field));
        tracing::debug!(
            branch = %self.branch,
            atom = %atom,
            field = ?field,
            %revision,
            "field diverged from ancestor"
        );
        Ok(Update::Diverged)
    }

    pub(crate) fn gather(&self, into: &mut HeadsByForest) {
        let local = self.entries.iter().map(|entry| &entry.heads);
        for heads in local.chain(self.divergences.values()) {
            for (forest, head) in heads.present() {
                into.entry(forest).or_default().push(head);
            }
        }
    }

    /// Shrink to `end` and roll every remaining head back through `erosion`
    pub(crate) fn revert(&mut self, end: u32, erosion: &Erosion) {
        assert!(
            end >= self.start,
            "cannot revert {} buffer of {} below its fork ring",
            <E::Kind as Kind>::NAME,
            self.branch
        );
        let keep = (end - self.start) as usize;
        if keep < self.entries.len() {
            for entry in self.entries.drain(keep..) {
                self.atoms.remove(entry.element.id());
            }
        }
        for entry in &mut self.entries {
            entry.heads.revert(erosion);
        }
        self.divergences.retain(|_, heads| {
            heads.revert(erosion);
            !heads.is_empty()
        });
    }
}

impl<E: BranchElement> Index<Atom<E::Kind>> for IntrinsicBuffer<E> {
    type Output = Entry<E>;

    fn index(&self, atom: Atom<E::Kind>) -> &Entry<E> {
        match self.get(atom) {
            Some(entry) => entry,
            None => panic!("{atom} is not stored on {}", self.branch),
        }
    }
}

impl<E: BranchElement> Index<Position<E::Kind>> for IntrinsicBuffer<E> {
    type Output = Entry<E>;

    fn index(&self, position: Position<E::Kind>) -> &Entry<E> {
        assert_eq!(
            position.branch, self.branch,
            "{position} is not contemporary to this buffer"
        );
        &self[position.contemporary]
    }
}

/// Read-only prefix of an intrinsic buffer
#[derive(Debug)]
pub struct BufferSlice<'a, E: BranchElement> {
    buffer: &'a IntrinsicBuffer<E>,
    end: u32,
}

impl<E: BranchElement> Clone for BufferSlice<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: BranchElement> Copy for BufferSlice<'_, E> {}

impl<'a, E: BranchElement> BufferSlice<'a, E> {
    /// The underlying buffer
    #[inline]
    #[must_use]
    pub fn buffer(&self) -> &'a IntrinsicBuffer<E> {
        self.buffer
    }

    /// Exclusive end offset
    #[inline]
    #[must_use]
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Whether `atom` is inside the slice
    #[inline]
    #[must_use]
    pub fn contains(&self, atom: Atom<E::Kind>) -> bool {
        (self.buffer.start..self.end).contains(&atom.offset())
    }

    /// Atom registered under `id`, if inside the slice
    #[must_use]
    pub fn find(&self, id: &E::Id) -> Option<Atom<E::Kind>> {
        self.buffer.atom(id).filter(|&atom| self.contains(atom))
    }

    /// Entry at `atom`, if inside the slice
    #[must_use]
    pub fn get(&self, atom: Atom<E::Kind>) -> Option<&'a Entry<E>> {
        if self.contains(atom) {
            self.buffer.get(atom)
        } else {
            None
        }
    }

    /// Entries inside the slice
    pub fn iter(&self) -> impl Iterator<Item = (Atom<E::Kind>, &'a Entry<E>)> + 'a {
        let end = self.end;
        self.buffer.iter().take_while(move |(atom, _)| atom.offset() < end)
    }

    /// Number of entries inside the slice
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        (self.end - self.buffer.start) as usize
    }

    /// Whether the slice is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end == self.buffer.start
    }
}

fn offset(position: usize) -> u32 {
    u32::try_from(position).unwrap_or_else(|_| panic!("intrinsic buffer exceeds u32 entries"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Module;
    use crate::fields::ModuleField;
    use crate::ids::ModuleId;
    use biome_versions::PackageIndex;

    fn buffer(start: u32) -> IntrinsicBuffer<Module> {
        IntrinsicBuffer::new(BranchIndex::new(1), start)
    }

    fn insert(buffer: &mut IntrinsicBuffer<Module>, name: &str) -> Atom<biome_versions::kind::Module> {
        let id = ModuleId::from(name);
        let package = PackageIndex::new(0);
        buffer.insert(id.clone(), package, || Module::new(id, package))
    }

    #[test]
    fn insert_is_idempotent_and_contiguous() {
        let mut buffer = buffer(3);
        let a = insert(&mut buffer, "A");
        let b = insert(&mut buffer, "B");
        assert_eq!(insert(&mut buffer, "A"), a);

        assert_eq!(a.offset(), 3);
        assert_eq!(b.offset(), 4);
        assert_eq!(buffer.end(), 5);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer[a].element, Module::new("A".into(), PackageIndex::new(0)));
    }

    #[test]
    fn prefix_hides_later_entries() {
        let mut buffer = buffer(0);
        let a = insert(&mut buffer, "A");
        let b = insert(&mut buffer, "B");

        let slice = buffer.prefix(1);
        assert!(slice.contains(a));
        assert!(!slice.contains(b));
        assert_eq!(slice.find(&"B".into()), None);
        assert_eq!(slice.iter().count(), 1);
        assert_eq!(slice.len(), 1);
    }

    #[test]
    #[should_panic(expected = "not contemporary")]
    fn position_from_other_branch_panics() {
        let mut buffer = buffer(0);
        let a = insert(&mut buffer, "A");
        let _ = &buffer[a.positioned(BranchIndex::new(7))];
    }

    #[test]
    fn contemporary_update_suppresses_repeats() {
        let mut buffer = buffer(0);
        let a = insert(&mut buffer, "A");
        let mut history = History::new();
        let ancestors = Fasces::default();

        let r0 = RevisionIndex::new(0);
        let first = buffer.update(&mut history, a, ModuleField::Documentation, 1u8, r0, &ancestors);
        let again = buffer.update(&mut history, a, ModuleField::Documentation, 1u8, r0, &ancestors);
        assert_eq!(first, Ok(Update::Advanced));
        assert_eq!(again, Ok(Update::Unchanged));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn unregistered_contemporary_atom_is_invisible() {
        let mut buffer = buffer(0);
        let mut history = History::<u8>::new();
        let ghost = Atom::new(PackageIndex::new(0), 4);
        let result = buffer.update(
            &mut history,
            ghost,
            ModuleField::Metadata,
            0,
            RevisionIndex::new(0),
            &Fasces::default(),
        );
        assert!(matches!(result, Err(TreeError::InvisibleAtom { offset: 4, .. })));
    }

    #[test]
    fn revert_drops_reverse_index() {
        let mut buffer = buffer(0);
        insert(&mut buffer, "A");
        insert(&mut buffer, "B");
        buffer.revert(1, &Erosion::default());
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.atom(&"B".into()), None);
        assert_eq!(insert(&mut buffer, "C").offset(), 1);
    }
}
