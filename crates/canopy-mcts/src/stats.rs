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

//! Per-node simulation statistics.
//!
//! Statistics only ever change through backpropagation: every simulation
//! propagated through a node increments its `sim_count`, replaces its
//! `sim_sol` and may improve its `sim_best`. Solutions are shared with the
//! ancestors and the incumbent through `Rc`, never copied.

use canopy_core::num::ObjectiveValue;
use canopy_search::solution::Solution;
use std::rc::Rc;

/// Simulation statistics of one tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStats<T, D> {
    sim_count: u64,
    sim_sol: Option<Rc<Solution<T, D>>>,
    sim_best: Option<Rc<Solution<T, D>>>,
}

impl<T, D> Default for NodeStats<T, D> {
    fn default() -> Self {
        Self {
            sim_count: 0,
            sim_sol: None,
            sim_best: None,
        }
    }
}

impl<T, D> NodeStats<T, D>
where
    T: ObjectiveValue,
{
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of simulations at or below this node.
    #[inline]
    pub fn sim_count(&self) -> u64 {
        self.sim_count
    }

    /// The most recent solution propagated through this node.
    #[inline]
    pub fn sim_sol(&self) -> Option<&Solution<T, D>> {
        self.sim_sol.as_deref()
    }

    /// The best solution simulated anywhere in this node's subtree.
    #[inline]
    pub fn sim_best(&self) -> Option<&Solution<T, D>> {
        self.sim_best.as_deref()
    }

    #[inline]
    pub fn is_visited(&self) -> bool {
        self.sim_count > 0
    }

    /// Folds one propagated solution into the statistics.
    #[inline]
    pub(crate) fn record(&mut self, solution: &Rc<Solution<T, D>>) {
        self.sim_count = self.sim_count.saturating_add(1);
        self.sim_sol = Some(Rc::clone(solution));
        let improves = match &self.sim_best {
            None => true,
            Some(best) => solution.is_better_than(best),
        };
        if improves {
            self.sim_best = Some(Rc::clone(solution));
        }
    }
}

impl<T, D> std::fmt::Display for NodeStats<T, D>
where
    T: ObjectiveValue,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.sim_best {
            Some(best) => write!(f, "NodeStats(sim_count: {}, sim_best: {})", self.sim_count, best),
            None => write!(f, "NodeStats(sim_count: {}, sim_best: none)", self.sim_count),
        }
    }
}
