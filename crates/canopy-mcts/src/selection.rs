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

//! # Selection
//!
//! Selection walks from the root to a frontier node, picking one open child
//! per level. `select_child` implements the rules shared by every policy:
//!
//! - Closed children are never selected.
//! - A child without simulations has an unbounded score, so every unvisited
//!   child is taken before any visited sibling is revisited.
//! - Visited children are ranked by `SelectionPolicy::score`; ties go to the
//!   child created first.
//!
//! `UctSelection` adapts UCT to optimization, where there is no win ratio.
//! The exploitation term normalizes the child's best simulated value against
//! the best and worst values observed so far in the same feasibility class,
//! then maps the result into a band that depends on how often simulations
//! have been infeasible. With `i` infeasible out of `n` observed solutions,
//! feasible values map into `[i / n, 1]` and infeasible ones into
//! `[0, i / (n + 1)]`, so any feasible subtree outranks any infeasible one
//! before exploration is added. A class whose best and worst values coincide
//! contributes the lower end of its band. The exploration term is
//! `C * sqrt(ln(Np) / Nc)`.

use crate::config::DEFAULT_EXPLORATION;
use crate::node::TreeNode;
use crate::stats::NodeStats;
use crate::tree::{NodeIndex, SearchTree};
use canopy_core::num::ObjectiveValue;
use canopy_search::tracker::SolutionTracker;
use log::trace;

/// Scores visited children during selection. Higher scores are preferred.
pub trait SelectionPolicy<T>
where
    T: ObjectiveValue,
{
    fn name(&self) -> &str;

    /// Scores a child with at least one simulation below a parent with
    /// `parent_visits` simulations.
    fn score<D>(
        &self,
        parent_visits: u64,
        child: &NodeStats<T, D>,
        tracker: &SolutionTracker<T>,
    ) -> T;
}

/// Upper confidence bounds applied to trees, with range-normalized exploitation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UctSelection {
    exploration: f64,
}

impl Default for UctSelection {
    fn default() -> Self {
        Self::new(DEFAULT_EXPLORATION)
    }
}

impl UctSelection {
    /// Creates the policy with exploration constant `exploration`.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `exploration` is negative or not finite.
    #[inline]
    pub fn new(exploration: f64) -> Self {
        debug_assert!(
            exploration.is_finite() && exploration >= 0.0,
            "called `UctSelection::new` with invalid exploration constant {}",
            exploration
        );
        Self { exploration }
    }

    #[inline]
    pub fn exploration(&self) -> f64 {
        self.exploration
    }

    /// The interval that exploitation terms of the given feasibility class
    /// map into.
    pub fn band<T>(tracker: &SolutionTracker<T>, is_feasible: bool) -> (f64, f64)
    where
        T: ObjectiveValue,
    {
        let infeasible = tracker.infeasible_count() as f64;
        let total = tracker.count() as f64;
        if is_feasible {
            let low = if total > 0.0 { infeasible / total } else { 0.0 };
            (low, 1.0)
        } else {
            (0.0, infeasible / (total + 1.0))
        }
    }

    /// The normalized exploitation term of a child.
    pub fn exploitation<T, D>(&self, child: &NodeStats<T, D>, tracker: &SolutionTracker<T>) -> T
    where
        T: ObjectiveValue,
    {
        let Some(best) = child.sim_best() else {
            return T::zero();
        };
        let (low, high) = Self::band(tracker, best.is_feasible());
        let raw = match tracker.range_for(best.is_feasible()) {
            Some(range) if range.width() > T::zero() && range.width().is_finite() => {
                let raw = (range.worst - best.value()) / range.width();
                if raw.is_finite() {
                    raw.max(T::zero()).min(T::one())
                } else {
                    T::zero()
                }
            }
            _ => T::zero(),
        };
        T::constant(low) + raw * T::constant(high - low)
    }

    /// The exploration term `C * sqrt(ln(parent_visits) / child_visits)`.
    #[inline]
    pub fn exploration_term<T>(&self, parent_visits: u64, child_visits: u64) -> T
    where
        T: ObjectiveValue,
    {
        debug_assert!(
            child_visits > 0,
            "called `UctSelection::exploration_term` with an unvisited child"
        );
        let parent = parent_visits.max(1) as f64;
        let child = child_visits.max(1) as f64;
        T::constant(self.exploration * (parent.ln() / child).sqrt())
    }
}

impl<T> SelectionPolicy<T> for UctSelection
where
    T: ObjectiveValue,
{
    fn name(&self) -> &str {
        "UctSelection"
    }

    #[inline]
    fn score<D>(
        &self,
        parent_visits: u64,
        child: &NodeStats<T, D>,
        tracker: &SolutionTracker<T>,
    ) -> T {
        self.exploitation(child, tracker) + self.exploration_term(parent_visits, child.sim_count())
    }
}

impl std::fmt::Display for UctSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UctSelection(exploration: {})", self.exploration)
    }
}

/// Picks the open child of `parent` to descend into.
///
/// Returns `None` if `parent` has no open child.
pub fn select_child<N, P>(
    tree: &SearchTree<N>,
    parent: NodeIndex,
    policy: &P,
    tracker: &SolutionTracker<N::Value>,
) -> Option<NodeIndex>
where
    N: TreeNode,
    P: SelectionPolicy<N::Value>,
{
    let parent_visits = tree.stats(parent).sim_count();
    let mut best: Option<(NodeIndex, N::Value)> = None;
    for &child in tree.children(parent) {
        if !tree.is_open(child) {
            continue;
        }
        let stats = tree.stats(child);
        if !stats.is_visited() {
            trace!("Selecting unvisited child {} of {}", child, parent);
            return Some(child);
        }
        let score = policy.score(parent_visits, stats, tracker);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((child, score)),
        }
    }
    if let Some((child, score)) = best {
        trace!("Selecting child {} of {} with score {}", child, parent, score);
    }
    best.map(|(child, _)| child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeStatus;
    use canopy_search::solution::Solution;
    use rand::Rng;
    use std::rc::Rc;

    /// Three-way branching to a fixed depth with no meaningful state.
    #[derive(Debug, Clone)]
    struct Fan {
        depth: usize,
    }

    impl TreeNode for Fan {
        type Instance = ();
        type Branch = u8;
        type Value = f64;
        type Data = ();

        fn root(_: ()) -> Self {
            Fan { depth: 0 }
        }

        fn copy(&self) -> Self {
            self.clone()
        }

        fn branches(&self) -> Vec<u8> {
            if self.depth < 3 { vec![0, 1, 2] } else { Vec::new() }
        }

        fn apply(&mut self, _branch: &u8) {
            self.depth += 1;
        }

        fn simulate<R>(&self, _rng: &mut R) -> Solution<f64>
        where
            R: Rng + ?Sized,
        {
            Solution::feasible(0.0)
        }
    }

    fn fan_tree() -> (SearchTree<Fan>, Vec<NodeIndex>) {
        let mut tree = SearchTree::new(Fan::root(()), f64::NEG_INFINITY);
        let root = tree.root();
        let (node, branches) = tree.begin_expansion(root).unwrap();
        let children = branches
            .into_iter()
            .map(|branch| {
                let mut child = node.copy();
                child.apply(&branch);
                tree.add_child(root, branch, child, f64::NEG_INFINITY)
            })
            .collect();
        (tree, children)
    }

    fn visit(
        tree: &mut SearchTree<Fan>,
        tracker: &mut SolutionTracker<f64>,
        index: NodeIndex,
        solution: Solution<f64>,
    ) {
        tracker.observe(&solution);
        tree.backpropagate(index, &Rc::new(solution));
    }

    #[test]
    fn test_unvisited_children_are_selected_first_in_order() {
        let (mut tree, children) = fan_tree();
        let mut tracker = SolutionTracker::new();
        let policy = UctSelection::default();
        let root = tree.root();

        visit(&mut tree, &mut tracker, children[0], Solution::feasible(1.0));
        assert_eq!(select_child(&tree, root, &policy, &tracker), Some(children[1]));

        visit(&mut tree, &mut tracker, children[1], Solution::feasible(2.0));
        assert_eq!(select_child(&tree, root, &policy, &tracker), Some(children[2]));
    }

    #[test]
    fn test_every_unvisited_child_precedes_revisits() {
        let (mut tree, children) = fan_tree();
        let mut tracker = SolutionTracker::new();
        let policy = UctSelection::default();
        let root = tree.root();

        let mut selected = Vec::new();
        for step in 0..children.len() {
            let child = select_child(&tree, root, &policy, &tracker).unwrap();
            selected.push(child);
            visit(&mut tree, &mut tracker, child, Solution::feasible(step as f64));
        }
        assert_eq!(selected, children);
    }

    #[test]
    fn test_ties_go_to_the_first_child() {
        let (mut tree, children) = fan_tree();
        let mut tracker = SolutionTracker::new();
        let root = tree.root();
        for &child in &children {
            visit(&mut tree, &mut tracker, child, Solution::feasible(3.0));
        }
        let policy = UctSelection::default();
        assert_eq!(select_child(&tree, root, &policy, &tracker), Some(children[0]));
    }

    #[test]
    fn test_better_value_wins_without_exploration() {
        let (mut tree, children) = fan_tree();
        let mut tracker = SolutionTracker::new();
        let root = tree.root();
        visit(&mut tree, &mut tracker, children[0], Solution::feasible(5.0));
        visit(&mut tree, &mut tracker, children[1], Solution::feasible(1.0));
        visit(&mut tree, &mut tracker, children[2], Solution::infeasible(0.0));

        let policy = UctSelection::new(0.0);
        assert_eq!(select_child(&tree, root, &policy, &tracker), Some(children[1]));
    }

    #[test]
    fn test_closed_children_are_skipped() {
        let (mut tree, children) = fan_tree();
        let tracker = SolutionTracker::new();
        let root = tree.root();
        tree.close(children[0], NodeStatus::Pruned);
        let policy = UctSelection::default();
        assert_eq!(select_child(&tree, root, &policy, &tracker), Some(children[1]));

        tree.close(children[1], NodeStatus::Exhausted);
        tree.close(children[2], NodeStatus::Exhausted);
        assert_eq!(select_child(&tree, root, &policy, &tracker), None);
    }

    #[test]
    fn test_exploitation_bands() {
        let policy = UctSelection::default();
        let mut tracker = SolutionTracker::new();
        for value in [2.0, 6.0] {
            tracker.observe(&Solution::<f64>::feasible(value));
        }
        for violation in [1.0, 5.0] {
            tracker.observe(&Solution::<f64>::infeasible(violation));
        }

        let stats_for = |solution: Solution<f64>| {
            let mut stats = NodeStats::new();
            stats.record(&Rc::new(solution));
            stats
        };

        assert_eq!(policy.exploitation(&stats_for(Solution::feasible(2.0)), &tracker), 1.0);
        assert_eq!(policy.exploitation(&stats_for(Solution::feasible(6.0)), &tracker), 0.5);
        assert_eq!(policy.exploitation(&stats_for(Solution::feasible(4.0)), &tracker), 0.75);
        assert_eq!(policy.exploitation(&stats_for(Solution::infeasible(1.0)), &tracker), 0.4);
        assert_eq!(policy.exploitation(&stats_for(Solution::infeasible(5.0)), &tracker), 0.0);
    }

    #[test]
    fn test_bands_follow_infeasible_share() {
        let policy = UctSelection::new(0.0);
        let mut tracker = SolutionTracker::<f64>::new();
        assert_eq!(UctSelection::band(&tracker, true), (0.0, 1.0));
        assert_eq!(UctSelection::band(&tracker, false), (0.0, 0.0));

        tracker.observe(&Solution::<f64>::feasible(2.0));
        for violation in [1.0, 3.0, 5.0] {
            tracker.observe(&Solution::<f64>::infeasible(violation));
        }
        assert_eq!(UctSelection::band(&tracker, true), (0.75, 1.0));
        assert_eq!(UctSelection::band(&tracker, false), (0.0, 0.6));

        let stats_for = |solution: Solution<f64>| {
            let mut stats = NodeStats::new();
            stats.record(&Rc::new(solution));
            stats
        };
        let feasible = policy.exploitation(&stats_for(Solution::feasible(2.0)), &tracker);
        let best_infeasible = policy.exploitation(&stats_for(Solution::infeasible(1.0)), &tracker);
        assert_eq!(feasible, 0.75);
        assert_eq!(best_infeasible, 0.6);
        assert_eq!(policy.exploitation(&stats_for(Solution::infeasible(3.0)), &tracker), 0.3);
        assert!(feasible > best_infeasible);
    }

    #[test]
    fn test_degenerate_range_uses_lower_end_of_band() {
        let policy = UctSelection::default();
        let mut tracker = SolutionTracker::new();
        tracker.observe(&Solution::<f64>::feasible(3.0));
        let mut stats = NodeStats::new();
        stats.record(&Rc::new(Solution::<f64>::feasible(3.0)));
        assert_eq!(policy.exploitation(&stats, &tracker), 0.0);

        tracker.observe(&Solution::<f64>::infeasible(1.0));
        assert_eq!(policy.exploitation(&stats, &tracker), 0.5);
    }

    #[test]
    fn test_exploration_term() {
        let policy = UctSelection::new(2.0);
        let term: f64 = policy.exploration_term(100, 4);
        assert!((term - 2.0 * (100f64.ln() / 4.0).sqrt()).abs() < 1e-12);
        let single: f64 = policy.exploration_term(1, 1);
        assert_eq!(single, 0.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(UctSelection::new(0.5).to_string(), "UctSelection(exploration: 0.5)");
    }
}
