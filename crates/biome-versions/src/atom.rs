//! Atoms and positions
//!
//! An [`Atom`] is an opaque offset into one branch lineage's intrinsic buffer
//! for one entity kind. Offsets are numbered contiguously across forks: a
//! child branch starts numbering where its parent's buffer ended at the fork
//! point. Within one trunk every offset therefore names exactly one entity,
//! but sibling branches may reuse the same offsets, which is why a
//! [`Position`] pairs the atom with the branch whose buffer holds it.

use crate::version::{BranchIndex, PackageIndex};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Entity kind addressed by atoms
///
/// Implemented by the uninhabited markers in [`kind`]. The culture is what an
/// entity of this kind was created under: the owning package for modules, the
/// owning module for symbols and articles.
pub trait Kind: 'static + Copy + Debug {
    /// What an atom of this kind records as its culture
    type Culture: Copy + Eq + Ord + Hash + Debug + Serialize + for<'de> Deserialize<'de>;

    /// Kind name for diagnostics
    const NAME: &'static str;
}

/// Entity kind markers
pub mod kind {
    use super::{Atom, Kind};
    use crate::version::PackageIndex;

    /// Module kind
    #[derive(Debug, Clone, Copy)]
    pub enum Module {}

    /// Symbol kind
    #[derive(Debug, Clone, Copy)]
    pub enum Symbol {}

    /// Article kind
    #[derive(Debug, Clone, Copy)]
    pub enum Article {}

    impl Kind for Module {
        type Culture = PackageIndex;
        const NAME: &'static str = "module";
    }

    impl Kind for Symbol {
        type Culture = Atom<Module>;
        const NAME: &'static str = "symbol";
    }

    impl Kind for Article {
        type Culture = Atom<Module>;
        const NAME: &'static str = "article";
    }
}

/// Offset of one entity in a branch lineage's buffer, plus its culture
#[derive(Serialize, Deserialize)]
#[serde(bound(
    serialize = "K::Culture: Serialize",
    deserialize = "K::Culture: Deserialize<'de>"
))]
pub struct Atom<K: Kind> {
    culture: K::Culture,
    offset: u32,
}

impl<K: Kind> Atom<K> {
    /// Create an atom
    #[inline]
    #[must_use]
    pub const fn new(culture: K::Culture, offset: u32) -> Self {
        Self { culture, offset }
    }

    /// Culture the entity was created under
    #[inline]
    #[must_use]
    pub fn culture(&self) -> K::Culture {
        self.culture
    }

    /// Storage offset
    #[inline]
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Pair with the branch whose buffer holds this atom
    #[inline]
    #[must_use]
    pub fn positioned(self, branch: BranchIndex) -> Position<K> {
        Position::new(self, branch)
    }
}

impl Atom<kind::Module> {
    /// Package a module atom belongs to
    #[inline]
    #[must_use]
    pub fn package(&self) -> PackageIndex {
        self.culture
    }
}

impl<K: Kind> Clone for Atom<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: Kind> Copy for Atom<K> {}

impl<K: Kind> PartialEq for Atom<K> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset && self.culture == other.culture
    }
}

impl<K: Kind> Eq for Atom<K> {}

impl<K: Kind> Hash for Atom<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.offset.hash(state);
        self.culture.hash(state);
    }
}

impl<K: Kind> PartialOrd for Atom<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Kind> Ord for Atom<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset
            .cmp(&other.offset)
            .then_with(|| self.culture.cmp(&other.culture))
    }
}

impl<K: Kind> Debug for Atom<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Atom")
            .field("kind", &K::NAME)
            .field("culture", &self.culture)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<K: Kind> Display for Atom<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", K::NAME, self.offset)
    }
}

/// An atom together with the branch it is contemporary to
#[derive(Serialize, Deserialize)]
#[serde(bound(
    serialize = "K::Culture: Serialize",
    deserialize = "K::Culture: Deserialize<'de>"
))]
pub struct Position<K: Kind> {
    /// The atom, contemporary to `branch`
    pub contemporary: Atom<K>,
    /// Branch whose buffer holds the atom
    pub branch: BranchIndex,
}

impl<K: Kind> Position<K> {
    /// Create a position
    #[inline]
    #[must_use]
    pub const fn new(contemporary: Atom<K>, branch: BranchIndex) -> Self {
        Self {
            contemporary,
            branch,
        }
    }

    /// Culture of the positioned atom
    #[inline]
    #[must_use]
    pub fn culture(&self) -> K::Culture {
        self.contemporary.culture()
    }

    /// Storage offset of the positioned atom
    #[inline]
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.contemporary.offset()
    }
}

impl<K: Kind> Clone for Position<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: Kind> Copy for Position<K> {}

impl<K: Kind> PartialEq for Position<K> {
    fn eq(&self, other: &Self) -> bool {
        self.contemporary == other.contemporary && self.branch == other.branch
    }
}

impl<K: Kind> Eq for Position<K> {}

impl<K: Kind> Hash for Position<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.contemporary.hash(state);
        self.branch.hash(state);
    }
}

impl<K: Kind> PartialOrd for Position<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Kind> Ord for Position<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.branch
            .cmp(&other.branch)
            .then_with(|| self.contemporary.cmp(&other.contemporary))
    }
}

impl<K: Kind> Debug for Position<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("contemporary", &self.contemporary)
            .field("branch", &self.branch)
            .finish()
    }
}

impl<K: Kind> Display for Position<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.contemporary, self.branch)
    }
}
