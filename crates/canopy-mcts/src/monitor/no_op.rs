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

use crate::{
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    statistics::MctsStatistics,
    tree::NodeIndex,
};
use canopy_search::{monitor::search_monitor::SearchCommand, solution::Solution};

/// A no-operation monitor that implements the `TreeSearchMonitor` trait
/// but does nothing on any of the events, always returning `Continue` for the
/// search command.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct NoOperationMonitor;

impl NoOperationMonitor {
    /// Creates a new `NoOperationMonitor`.
    #[inline(always)]
    pub fn new() -> Self {
        Self
    }
}

impl<T, D> TreeSearchMonitor<T, D> for NoOperationMonitor {
    #[inline(always)]
    fn name(&self) -> &str {
        "NoOperationMonitor"
    }

    #[inline(always)]
    fn on_enter_search(&mut self, _statistics: &MctsStatistics<T>) {}

    #[inline(always)]
    fn on_exit_search(&mut self, _statistics: &MctsStatistics<T>) {}

    #[inline(always)]
    fn search_command(&mut self, _statistics: &MctsStatistics<T>) -> SearchCommand {
        SearchCommand::Continue
    }

    #[inline(always)]
    fn on_iteration(&mut self, _statistics: &MctsStatistics<T>) {}

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
    fn on_solution_found(&mut self, _solution: &Solution<T, D>, _statistics: &MctsStatistics<T>) {}
}
