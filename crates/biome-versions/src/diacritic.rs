//! Diacritics, compounds and composites
//!
//! The same base symbol can acquire different members depending on which
//! module's conformances are linked. A [`Diacritic`] names the host symbol and
//! the module that perpetrated a feature; a [`Composite`] pairs a base symbol
//! with a diacritic.

use crate::atom::{kind, Atom, Position};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Host symbol plus the module whose extension produced a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Diacritic {
    /// Symbol the feature is attached to
    pub host: Position<kind::Symbol>,
    /// Module that perpetrated the feature
    pub culture: Atom<kind::Module>,
}

impl Diacritic {
    /// Create a diacritic
    #[inline]
    #[must_use]
    pub const fn new(host: Position<kind::Symbol>, culture: Atom<kind::Module>) -> Self {
        Self { host, culture }
    }

    /// The diacritic of a symbol seen through its own culture
    #[inline]
    #[must_use]
    pub fn natural(host: Position<kind::Symbol>) -> Self {
        Self {
            host,
            culture: host.culture(),
        }
    }

    /// Whether the perpetrator is the host's own culture
    #[inline]
    #[must_use]
    pub fn is_natural(&self) -> bool {
        self.culture == self.host.culture()
    }
}

/// A base symbol seen through a diacritic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Composite {
    /// The member or feature symbol
    pub base: Position<kind::Symbol>,
    /// Host and perpetrator
    pub diacritic: Diacritic,
}

impl Composite {
    /// Create a composite
    #[inline]
    #[must_use]
    pub const fn new(base: Position<kind::Symbol>, diacritic: Diacritic) -> Self {
        Self { base, diacritic }
    }

    /// A symbol as itself
    #[inline]
    #[must_use]
    pub fn natural(base: Position<kind::Symbol>) -> Self {
        Self {
            base,
            diacritic: Diacritic::natural(base),
        }
    }

    /// Whether this composite is just its base symbol
    #[inline]
    #[must_use]
    pub fn is_natural(&self) -> bool {
        self.base == self.diacritic.host && self.diacritic.is_natural()
    }

    /// Host symbol
    #[inline]
    #[must_use]
    pub fn host(&self) -> Position<kind::Symbol> {
        self.diacritic.host
    }

    /// Module that perpetrated this composite
    #[inline]
    #[must_use]
    pub fn culture(&self) -> Atom<kind::Module> {
        self.diacritic.culture
    }

    /// The compound form, if this composite is not natural
    #[inline]
    #[must_use]
    pub fn compound(&self) -> Option<Compound> {
        Compound::new(self.base, self.diacritic)
    }
}

impl From<Compound> for Composite {
    fn from(compound: Compound) -> Self {
        Self {
            base: compound.base,
            diacritic: compound.diacritic,
        }
    }
}

impl Display for Composite {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_natural() {
            write!(f, "{}", self.base)
        } else {
            write!(
                f,
                "{} in {} via {}",
                self.base, self.diacritic.host, self.diacritic.culture
            )
        }
    }
}

/// A composite that is guaranteed not to be natural
///
/// Something like "member X of type Y as seen through module Z's conformance".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Compound {
    base: Position<kind::Symbol>,
    diacritic: Diacritic,
}

impl Compound {
    /// Create a compound, or `None` if the pair is natural
    #[must_use]
    pub fn new(base: Position<kind::Symbol>, diacritic: Diacritic) -> Option<Self> {
        if base == diacritic.host && diacritic.is_natural() {
            None
        } else {
            Some(Self { base, diacritic })
        }
    }

    /// Base symbol
    #[inline]
    #[must_use]
    pub fn base(&self) -> Position<kind::Symbol> {
        self.base
    }

    /// Diacritic
    #[inline]
    #[must_use]
    pub fn diacritic(&self) -> Diacritic {
        self.diacritic
    }

    /// Host symbol
    #[inline]
    #[must_use]
    pub fn host(&self) -> Position<kind::Symbol> {
        self.diacritic.host
    }

    /// Perpetrating module
    #[inline]
    #[must_use]
    pub fn culture(&self) -> Atom<kind::Module> {
        self.diacritic.culture
    }
}
