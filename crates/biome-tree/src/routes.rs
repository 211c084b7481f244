//! Routing table
//!
//! Maps a route (a namespace module and a path stem) to the composites that
//! answer it on one branch. Each binding remembers the revision it was added
//! in, so reverts drop exactly the bindings newer than the boundary.

use biome_versions::{kind, Atom, Composite, RevisionIndex};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// A URL-like key under one namespace module
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Route {
    /// Module the path is resolved under
    pub namespace: Atom<kind::Module>,
    /// Lowercased path stem
    pub stem: String,
}

impl Route {
    /// Create a route; the stem is lowercased
    #[must_use]
    pub fn new(namespace: Atom<kind::Module>, stem: &str) -> Self {
        Self {
            namespace,
            stem: stem.to_lowercase(),
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.stem)
    }
}

/// One composite bound to a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// The composite
    pub composite: Composite,
    /// Revision the binding was added in
    pub since: RevisionIndex,
}

/// Route bindings added on one branch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    routes: BTreeMap<Route, SmallVec<[Binding; 1]>>,
}

impl RouteTable {
    /// Bind `composite` under `route`; returns false if it already was
    pub fn insert(&mut self, route: Route, composite: Composite, since: RevisionIndex) -> bool {
        let bindings = self.routes.entry(route).or_default();
        if bindings.iter().any(|binding| binding.composite == composite) {
            return false;
        }
        bindings.push(Binding { composite, since });
        true
    }

    /// Composites bound under `route` as of `bound`
    pub fn select(&self, route: &Route, bound: RevisionIndex) -> impl Iterator<Item = Composite> + '_ {
        self.routes
            .get(route)
            .into_iter()
            .flatten()
            .filter(move |binding| binding.since <= bound)
            .map(|binding| binding.composite)
    }

    /// Whether `composite` is bound under `route` as of `bound`
    #[must_use]
    pub fn contains(&self, route: &Route, composite: Composite, bound: RevisionIndex) -> bool {
        self.select(route, bound).any(|bound_composite| bound_composite == composite)
    }

    /// Number of routes with at least one binding
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no route is bound
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Drop bindings newer than `to`, or all of them for `None`
    pub(crate) fn revert(&mut self, to: Option<RevisionIndex>) {
        self.routes.retain(|_, bindings| {
            bindings.retain(|binding| to.is_some_and(|to| binding.since <= to));
            !bindings.is_empty()
        });
    }
}
