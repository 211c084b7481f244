//! Rollback sets produced by erosion

use crate::keyframe::Head;
use std::collections::HashMap;

/// Mapping from heads affected by an erosion to their rolled-back heads
///
/// A head absent from the set was not affected and stays valid as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rollbacks {
    heads: HashMap<Head, Option<Head>>,
}

impl Rollbacks {
    /// Create an empty rollback set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, head: Head, rolled: Option<Head>) {
        self.heads.insert(head, rolled);
    }

    /// Whether `head` was affected
    #[inline]
    #[must_use]
    pub fn contains(&self, head: Head) -> bool {
        self.heads.contains_key(&head)
    }

    /// What `head` became, or `None` if its whole chain was freed
    #[must_use]
    pub fn rollback(&self, head: Head) -> Option<Head> {
        self.heads.get(&head).copied().unwrap_or(Some(head))
    }

    /// Roll back an optional head in place
    pub fn apply(&self, head: &mut Option<Head>) {
        if let Some(current) = *head {
            *head = self.rollback(current);
        }
    }

    /// Merge another rollback set into this one
    pub fn extend(&mut self, other: Self) {
        self.heads.extend(other.heads);
    }

    /// Number of affected heads
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.heads.len()
    }

    /// Whether no head was affected
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }
}
