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

use canopy_core::num::ObjectiveValue;
use std::time::Duration;

/// Statistics collected during a Monte Carlo tree search run.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsStatistics<T> {
    /// Completed select-expand-simulate iterations.
    pub iterations: u64,
    /// Calls to `TreeNode::simulate`, the root simulation included.
    pub simulations: u64,
    /// Simulations that returned a feasible solution.
    pub feasible_simulations: u64,
    /// Nodes created, the root included.
    pub nodes_created: u64,
    /// Nodes whose children were generated.
    pub nodes_expanded: u64,
    /// Leaves reached and simulated.
    pub leaves: u64,
    /// Children discarded before simulation because their bound was dominated.
    pub prunings_bound: u64,
    /// Open nodes closed by a pruning sweep after the incumbent improved.
    pub prunings_sweep: u64,
    /// Number of pruning sweeps that closed at least one node.
    pub sweeps: u64,
    /// The deepest level reached in the tree.
    pub max_depth: u64,
    /// Times the incumbent was replaced.
    pub incumbent_updates: u64,
    /// Total time spent in the solver.
    pub time_total: Duration,
    /// The bound of the root node, `-inf` if pruning is disabled.
    pub root_bound: T,
    /// The seed the run's RNG was created from.
    pub rng_seed: u64,
}

impl<T> Default for MctsStatistics<T>
where
    T: ObjectiveValue,
{
    fn default() -> Self {
        Self {
            iterations: 0,
            simulations: 0,
            feasible_simulations: 0,
            nodes_created: 0,
            nodes_expanded: 0,
            leaves: 0,
            prunings_bound: 0,
            prunings_sweep: 0,
            sweeps: 0,
            max_depth: 0,
            incumbent_updates: 0,
            time_total: Duration::ZERO,
            root_bound: T::neg_infinity(),
            rng_seed: 0,
        }
    }
}

impl<T> MctsStatistics<T> {
    #[inline]
    pub fn on_iteration(&mut self) {
        self.iterations = self.iterations.saturating_add(1);
    }

    #[inline]
    pub fn on_simulation(&mut self, is_feasible: bool) {
        self.simulations = self.simulations.saturating_add(1);
        if is_feasible {
            self.feasible_simulations = self.feasible_simulations.saturating_add(1);
        }
    }

    #[inline]
    pub fn on_node_created(&mut self, depth: u64) {
        self.nodes_created = self.nodes_created.saturating_add(1);
        self.max_depth = self.max_depth.max(depth);
    }

    #[inline]
    pub fn on_node_expanded(&mut self) {
        self.nodes_expanded = self.nodes_expanded.saturating_add(1);
    }

    #[inline]
    pub fn on_leaf(&mut self) {
        self.leaves = self.leaves.saturating_add(1);
    }

    /// Records a child discarded because its bound is dominated by the incumbent.
    #[inline]
    pub fn on_pruning_bound(&mut self) {
        self.prunings_bound = self.prunings_bound.saturating_add(1);
    }

    /// Records a sweep that closed `closed` open nodes.
    #[inline]
    pub fn on_pruning_sweep(&mut self, closed: u64) {
        if closed > 0 {
            self.sweeps = self.sweeps.saturating_add(1);
            self.prunings_sweep = self.prunings_sweep.saturating_add(closed);
        }
    }

    #[inline]
    pub fn on_incumbent_update(&mut self) {
        self.incumbent_updates = self.incumbent_updates.saturating_add(1);
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }

    #[inline]
    pub fn set_root_bound(&mut self, bound: T) {
        self.root_bound = bound;
    }

    #[inline]
    pub fn set_rng_seed(&mut self, seed: u64) {
        self.rng_seed = seed;
    }

    /// Total number of nodes closed by pruning.
    #[inline]
    pub fn prunings(&self) -> u64 {
        self.prunings_bound.saturating_add(self.prunings_sweep)
    }

    /// Simulations per second over the whole run, `None` before any time elapsed.
    #[inline]
    pub fn simulation_rate(&self) -> Option<f64> {
        let secs = self.time_total.as_secs_f64();
        (secs > 0.0).then(|| self.simulations as f64 / secs)
    }
}

impl<T> std::fmt::Display for MctsStatistics<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Canopy MCTS Statistics:")?;
        writeln!(f, "  Iterations:           {}", self.iterations)?;
        writeln!(
            f,
            "  Simulations:          {} ({} feasible)",
            self.simulations, self.feasible_simulations
        )?;
        writeln!(f, "  Nodes created:        {}", self.nodes_created)?;
        writeln!(f, "  Nodes expanded:       {}", self.nodes_expanded)?;
        writeln!(f, "  Leaves simulated:     {}", self.leaves)?;
        writeln!(f, "  Max depth reached:    {}", self.max_depth)?;
        writeln!(f, "  Prunings (bound):     {}", self.prunings_bound)?;
        writeln!(
            f,
            "  Prunings (sweep):     {} in {} sweeps",
            self.prunings_sweep, self.sweeps
        )?;
        writeln!(f, "  Incumbent updates:    {}", self.incumbent_updates)?;
        writeln!(f, "  Root bound:           {}", self.root_bound)?;
        writeln!(f, "  RNG seed:             {}", self.rng_seed)?;
        writeln!(f, "  Total time:           {:.2?}", self.time_total)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zeroed_with_unbounded_root() {
        let stats = MctsStatistics::<f64>::default();
        assert_eq!(stats.iterations, 0);
        assert_eq!(stats.simulations, 0);
        assert_eq!(stats.root_bound, f64::NEG_INFINITY);
        assert_eq!(stats.time_total, Duration::ZERO);
        assert_eq!(stats.simulation_rate(), None);
    }

    #[test]
    fn test_counters() {
        let mut stats = MctsStatistics::<f64>::default();
        stats.on_iteration();
        stats.on_simulation(true);
        stats.on_simulation(false);
        stats.on_node_created(3);
        stats.on_node_created(1);
        stats.on_node_expanded();
        stats.on_leaf();
        stats.on_pruning_bound();
        stats.on_pruning_sweep(0);
        stats.on_pruning_sweep(4);
        stats.on_incumbent_update();

        assert_eq!(stats.iterations, 1);
        assert_eq!(stats.simulations, 2);
        assert_eq!(stats.feasible_simulations, 1);
        assert_eq!(stats.nodes_created, 2);
        assert_eq!(stats.max_depth, 3);
        assert_eq!(stats.nodes_expanded, 1);
        assert_eq!(stats.leaves, 1);
        assert_eq!(stats.sweeps, 1);
        assert_eq!(stats.prunings(), 5);
        assert_eq!(stats.incumbent_updates, 1);
    }

    #[test]
    fn test_counters_saturate() {
        let mut stats = MctsStatistics::<f64> {
            simulations: u64::MAX,
            ..Default::default()
        };
        stats.on_simulation(false);
        assert_eq!(stats.simulations, u64::MAX);
    }

    #[test]
    fn test_simulation_rate() {
        let mut stats = MctsStatistics::<f64>::default();
        stats.simulations = 50;
        stats.set_total_time(Duration::from_millis(500));
        assert_eq!(stats.simulation_rate(), Some(100.0));
    }

    #[test]
    fn test_display_mentions_every_counter() {
        let mut stats = MctsStatistics::<f64>::default();
        stats.set_rng_seed(42);
        stats.set_root_bound(-7.5);
        let text = stats.to_string();
        assert!(text.starts_with("Canopy MCTS Statistics:"));
        assert!(text.contains("RNG seed:             42"));
        assert!(text.contains("Root bound:           -7.5"));
    }
}
