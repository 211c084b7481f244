//! Buffer end offsets

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// End offsets of a branch's three intrinsic buffers at one point in time
///
/// Offsets are lineage-wide: a forked branch's buffers start at its fork
/// ring, so ring values never shrink along a trunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ring {
    /// End of the module buffer
    pub modules: u32,
    /// End of the symbol buffer
    pub symbols: u32,
    /// End of the article buffer
    pub articles: u32,
}

impl Ring {
    /// Create a ring
    #[inline]
    #[must_use]
    pub const fn new(modules: u32, symbols: u32, articles: u32) -> Self {
        Self {
            modules,
            symbols,
            articles,
        }
    }

    /// Whether every offset is at least the corresponding offset of `other`
    #[inline]
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.modules >= other.modules
            && self.symbols >= other.symbols
            && self.articles >= other.articles
    }
}

impl Display for Ring {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(modules: {}, symbols: {}, articles: {})",
            self.modules, self.symbols, self.articles
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_is_componentwise() {
        let small = Ring::new(1, 4, 0);
        assert!(Ring::new(1, 5, 0).contains(&small));
        assert!(!Ring::new(2, 3, 9).contains(&small));
        assert!(small.contains(&small));
    }
}
