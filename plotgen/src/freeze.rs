// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::{Deref, DerefMut};

use crate::graph::Graph;

/// Defers graph refreshes while alive.
///
/// Obtained from [`Graph::freeze`]. Guards nest through [`Graph::freeze`] on
/// the guard itself; when the outermost one is dropped, a refresh requested
/// in the meantime runs once.
#[derive(Debug)]
pub struct FreezeGuard<'a> {
    graph: &'a mut Graph,
}

impl Graph {
    /// Batches mutations: refreshes are deferred until the guard is dropped.
    ///
    /// ```rust
    /// use plotgen::{Graph, Stale};
    ///
    /// let mut graph = Graph::default();
    /// {
    ///     let mut g = graph.freeze();
    ///     g.mark_old(Stale::all(), 0);
    ///     g.mark_old(Stale::all(), 1);
    ///     assert!(g.is_frozen());
    /// }
    /// assert!(!graph.is_frozen());
    /// ```
    pub fn freeze(&mut self) -> FreezeGuard<'_> {
        self.enter_freeze();
        FreezeGuard { graph: self }
    }
}

impl Deref for FreezeGuard<'_> {
    type Target = Graph;

    fn deref(&self) -> &Graph {
        &*self.graph
    }
}

impl DerefMut for FreezeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Graph {
        &mut *self.graph
    }
}

impl Drop for FreezeGuard<'_> {
    fn drop(&mut self) {
        self.graph.thaw();
    }
}
