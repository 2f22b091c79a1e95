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

//! Fan-out composition of tree search monitors.
//!
//! Every event is forwarded to the children in insertion order.
//! `search_command` stops at the first child that does not answer `Continue`.

use crate::{
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    statistics::MctsStatistics,
    tree::NodeIndex,
};
use canopy_search::{monitor::search_monitor::SearchCommand, solution::Solution};

/// A composite monitor that aggregates multiple monitors and forwards events to all of them.
pub struct CompositeTreeSearchMonitor<'a, T, D> {
    monitors: Vec<Box<dyn TreeSearchMonitor<T, D> + 'a>>,
}

impl<'a, T, D> std::fmt::Debug for CompositeTreeSearchMonitor<'a, T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeTreeSearchMonitor")
            .field("monitors", &self.monitors)
            .finish()
    }
}

impl<'a, T, D> Default for CompositeTreeSearchMonitor<'a, T, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, D> CompositeTreeSearchMonitor<'a, T, D> {
    /// Creates a new empty `CompositeTreeSearchMonitor`.
    #[inline]
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    /// Creates a new `CompositeTreeSearchMonitor` with the specified capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            monitors: Vec::with_capacity(capacity),
        }
    }

    /// Adds a new monitor to the composite monitor.
    #[inline]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: TreeSearchMonitor<T, D> + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    /// Adds a new boxed monitor to the composite monitor.
    #[inline]
    pub fn add_monitor_boxed(&mut self, monitor: Box<dyn TreeSearchMonitor<T, D> + 'a>) {
        self.monitors.push(monitor);
    }

    /// Returns the number of monitors in the composite monitor.
    #[inline]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    /// Returns `true` if the composite monitor contains no monitors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl<'a, T, D> TreeSearchMonitor<T, D> for CompositeTreeSearchMonitor<'a, T, D> {
    fn name(&self) -> &str {
        "CompositeTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, statistics: &MctsStatistics<T>) {
        for monitor in &mut self.monitors {
            monitor.on_enter_search(statistics);
        }
    }

    fn on_exit_search(&mut self, statistics: &MctsStatistics<T>) {
        for monitor in &mut self.monitors {
            monitor.on_exit_search(statistics);
        }
    }

    fn search_command(&mut self, statistics: &MctsStatistics<T>) -> SearchCommand {
        for monitor in &mut self.monitors {
            let cmd = monitor.search_command(statistics);
            if !matches!(cmd, SearchCommand::Continue) {
                return cmd;
            }
        }
        SearchCommand::Continue
    }

    fn on_iteration(&mut self, statistics: &MctsStatistics<T>) {
        for monitor in &mut self.monitors {
            monitor.on_iteration(statistics);
        }
    }

    fn on_select(&mut self, node: NodeIndex, depth: usize, statistics: &MctsStatistics<T>) {
        for monitor in &mut self.monitors {
            monitor.on_select(node, depth, statistics);
        }
    }

    fn on_expand(&mut self, node: NodeIndex, children: usize, statistics: &MctsStatistics<T>) {
        for monitor in &mut self.monitors {
            monitor.on_expand(node, children, statistics);
        }
    }

    fn on_prune(&mut self, node: NodeIndex, reason: PruneReason, statistics: &MctsStatistics<T>) {
        for monitor in &mut self.monitors {
            monitor.on_prune(node, reason, statistics);
        }
    }

    fn on_simulation(
        &mut self,
        node: NodeIndex,
        solution: &Solution<T, D>,
        statistics: &MctsStatistics<T>,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_simulation(node, solution, statistics);
        }
    }

    fn on_solution_found(&mut self, solution: &Solution<T, D>, statistics: &MctsStatistics<T>) {
        for monitor in &mut self.monitors {
            monitor.on_solution_found(solution, statistics);
        }
    }
}
