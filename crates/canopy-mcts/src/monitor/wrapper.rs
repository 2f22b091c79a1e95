// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Adapter for problem-agnostic search monitors
//!
//! `SearchMonitorAdapter` bridges this crate's `TreeSearchMonitor` with a
//! generic `SearchMonitor` from `canopy_search`. It forwards lifecycle events
//! and commands to the inner monitor while ignoring tree-specific callbacks.
//!
//! Behavior
//! - Delegates: enter, iteration (as `on_step`), solution, exit, and `search_command`.
//! - No-ops: select, expand, prune and simulation.
//! - `name()` is `SearchMonitorAdapter(inner.name())`.

use crate::{
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    statistics::MctsStatistics,
    tree::NodeIndex,
};
use canopy_search::{
    monitor::search_monitor::{SearchCommand, SearchMonitor},
    solution::Solution,
};

/// A tree search monitor that wraps a general search monitor.
pub struct SearchMonitorAdapter<M, T, D> {
    inner: M,
    name: String,
    _phantom: std::marker::PhantomData<fn() -> (T, D)>,
}

impl<M, T, D> SearchMonitorAdapter<M, T, D>
where
    M: SearchMonitor<T, D>,
{
    /// Creates a new `SearchMonitorAdapter` that wraps the given search monitor.
    #[inline]
    pub fn new(inner: M) -> Self {
        let name = format!("SearchMonitorAdapter({})", inner.name());
        Self {
            inner,
            name,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Returns the wrapped monitor.
    #[inline]
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Consumes the adapter and returns the wrapped monitor.
    #[inline]
    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<M, T, D> std::fmt::Debug for SearchMonitorAdapter<M, T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchMonitorAdapter")
            .field("name", &self.name)
            .finish()
    }
}

impl<M, T, D> TreeSearchMonitor<T, D> for SearchMonitorAdapter<M, T, D>
where
    M: SearchMonitor<T, D>,
{
    #[inline(always)]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    fn on_enter_search(&mut self, _statistics: &MctsStatistics<T>) {
        self.inner.on_enter_search();
    }

    #[inline(always)]
    fn on_exit_search(&mut self, _statistics: &MctsStatistics<T>) {
        self.inner.on_exit_search();
    }

    #[inline(always)]
    fn search_command(&mut self, _statistics: &MctsStatistics<T>) -> SearchCommand {
        self.inner.search_command()
    }

    #[inline(always)]
    fn on_iteration(&mut self, _statistics: &MctsStatistics<T>) {
        self.inner.on_step();
    }

    #[inline(always)]
    fn on_select(&mut self, _node: NodeIndex, _depth: usize, _statistics: &MctsStatistics<T>) {}

    #[inline(always)]
    fn on_expand(&mut self, _node: NodeIndex, _children: usize, _statistics: &MctsStatistics<T>) {}

    #[inline(always)]
    fn on_prune(&mut self, _node: NodeIndex, _reason: PruneReason, _statistics: &MctsStatistics<T>) {
    }

    #[inline(always)]
    fn on_simulation(
        &mut self,
        _node: NodeIndex,
        _solution: &Solution<T, D>,
        _statistics: &MctsStatistics<T>,
    ) {
    }

    #[inline(always)]
    fn on_solution_found(&mut self, solution: &Solution<T, D>, _statistics: &MctsStatistics<T>) {
        self.inner.on_solution_found(solution);
    }
}
