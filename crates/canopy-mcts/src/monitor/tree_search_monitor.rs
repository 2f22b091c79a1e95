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

//! Tree search monitoring interface
//!
//! Declares the `TreeSearchMonitor` trait and `PruneReason` for observing and
//! controlling a Monte Carlo tree search. Callbacks follow the engine's
//! iteration, and a monitor can stop the run through `SearchCommand`
//! (default: Continue).
//!
//! Lifecycle
//! - enter → root simulation → { command → select → expand → (prune | simulation)* → iteration }* → exit
//! - `on_solution_found` fires whenever a simulation replaces the incumbent,
//!   the root simulation included.
//! - `MctsStatistics` is provided to every callback.
//!
//! Methods take `&mut self`; monitors are single-threaded. Callbacks run in
//! the hot loop and should stay cheap.

use crate::statistics::MctsStatistics;
use crate::tree::NodeIndex;
use canopy_search::{monitor::search_monitor::SearchCommand, solution::Solution};

/// Reasons for closing a node through its bound.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PruneReason {
    /// A freshly created child was dominated before it was simulated.
    BoundDominated,
    /// An open node was dominated after the incumbent improved.
    Swept,
}

impl std::fmt::Display for PruneReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PruneReason::BoundDominated => write!(f, "BoundDominated"),
            PruneReason::Swept => write!(f, "Swept"),
        }
    }
}

/// Trait for monitoring and controlling the search process of the solver.
pub trait TreeSearchMonitor<T, D> {
    /// Returns the name of the monitor.
    fn name(&self) -> &str;
    /// Called when the search starts, before the root is simulated.
    fn on_enter_search(&mut self, statistics: &MctsStatistics<T>);
    /// Called when the search ends.
    fn on_exit_search(&mut self, statistics: &MctsStatistics<T>);
    /// Called before every iteration to determine whether the search continues.
    fn search_command(&mut self, _statistics: &MctsStatistics<T>) -> SearchCommand {
        SearchCommand::Continue
    }
    /// Called after every completed iteration.
    fn on_iteration(&mut self, statistics: &MctsStatistics<T>);
    /// Called when selection stopped at the frontier node `node`.
    fn on_select(&mut self, node: NodeIndex, depth: usize, statistics: &MctsStatistics<T>);
    /// Called when `node` received `children` new children.
    fn on_expand(&mut self, node: NodeIndex, children: usize, statistics: &MctsStatistics<T>);
    /// Called when `node` is closed because of its bound.
    fn on_prune(&mut self, node: NodeIndex, reason: PruneReason, statistics: &MctsStatistics<T>);
    /// Called after `node` was simulated and the result backpropagated.
    fn on_simulation(
        &mut self,
        node: NodeIndex,
        solution: &Solution<T, D>,
        statistics: &MctsStatistics<T>,
    );
    /// Called when a new incumbent is installed.
    fn on_solution_found(&mut self, solution: &Solution<T, D>, statistics: &MctsStatistics<T>);
}

impl<T, D, M> TreeSearchMonitor<T, D> for &mut M
where
    M: TreeSearchMonitor<T, D> + ?Sized,
{
    #[inline(always)]
    fn name(&self) -> &str {
        (**self).name()
    }

    #[inline(always)]
    fn on_enter_search(&mut self, statistics: &MctsStatistics<T>) {
        (**self).on_enter_search(statistics);
    }

    #[inline(always)]
    fn on_exit_search(&mut self, statistics: &MctsStatistics<T>) {
        (**self).on_exit_search(statistics);
    }

    #[inline(always)]
    fn search_command(&mut self, statistics: &MctsStatistics<T>) -> SearchCommand {
        (**self).search_command(statistics)
    }

    #[inline(always)]
    fn on_iteration(&mut self, statistics: &MctsStatistics<T>) {
        (**self).on_iteration(statistics);
    }

    #[inline(always)]
    fn on_select(&mut self, node: NodeIndex, depth: usize, statistics: &MctsStatistics<T>) {
        (**self).on_select(node, depth, statistics);
    }

    #[inline(always)]
    fn on_expand(&mut self, node: NodeIndex, children: usize, statistics: &MctsStatistics<T>) {
        (**self).on_expand(node, children, statistics);
    }

    #[inline(always)]
    fn on_prune(&mut self, node: NodeIndex, reason: PruneReason, statistics: &MctsStatistics<T>) {
        (**self).on_prune(node, reason, statistics);
    }

    #[inline(always)]
    fn on_simulation(
        &mut self,
        node: NodeIndex,
        solution: &Solution<T, D>,
        statistics: &MctsStatistics<T>,
    ) {
        (**self).on_simulation(node, solution, statistics);
    }

    #[inline(always)]
    fn on_solution_found(&mut self, solution: &Solution<T, D>, statistics: &MctsStatistics<T>) {
        (**self).on_solution_found(solution, statistics);
    }
}

impl<T, D> std::fmt::Debug for dyn TreeSearchMonitor<T, D> + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}

impl<T, D> std::fmt::Display for dyn TreeSearchMonitor<T, D> + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}
