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

//! # Monte Carlo Tree Search Solver
//!
//! A search engine for combinatorial minimization over any `TreeNode`. Each
//! iteration selects a frontier node, expands all of its children, simulates
//! every child that survives its bound check and backpropagates the results
//! to the root. Node bounds turn the search into a branch-and-bound hybrid:
//! once the tree is exhausted the incumbent is a proven optimum.
//!
//! ## Highlights
//!
//! - Session:
//!   - `MctsSearchSession` owns all per-run state: the arena tree, the
//!     solution tracker, the incumbent and its history, the RNG and the
//!     statistics.
//!   - The root is simulated before the first iteration, so every run returns
//!     a solution, even with an iteration limit of zero.
//! - Pruning:
//!   - A child whose bound is not strictly better than a feasible incumbent is
//!     closed before it is simulated.
//!   - When the feasible incumbent improves, a sweep closes every open node
//!     whose cached bound is dominated. A dominated root ends the search.
//!   - Closing propagates exhaustion upwards; the search is complete once the
//!     root is closed.
//! - Termination:
//!   - Checked once per iteration: tree exhausted first, then the monitors.
//!   - `MctsConfig` limits are enforced through `IterationLimitMonitor` and
//!     `TimeLimitMonitor` wrapped in a `CompositeTreeSearchMonitor`.
//! - Reproducibility:
//!   - All randomness flows from a `ChaCha8Rng`. An unseeded run draws its
//!     seed from the thread RNG and logs it.
//!
//! ## Usage
//!
//! ```rust
//! use canopy_mcts::{config::MctsConfig, node::TreeNode, solver::MctsSolver};
//! use canopy_search::solution::Solution;
//! use rand::Rng;
//!
//! /// Choose three digits; the objective is their sum.
//! #[derive(Clone)]
//! struct Digits(Vec<u8>);
//!
//! impl TreeNode for Digits {
//!     type Instance = ();
//!     type Branch = u8;
//!     type Value = f64;
//!     type Data = Vec<u8>;
//!
//!     fn root(_: ()) -> Self { Digits(Vec::new()) }
//!     fn copy(&self) -> Self { self.clone() }
//!     fn branches(&self) -> Vec<u8> {
//!         if self.0.len() < 3 { (0..10).collect() } else { Vec::new() }
//!     }
//!     fn apply(&mut self, digit: &u8) { self.0.push(*digit); }
//!     fn simulate<R: Rng + ?Sized>(&self, rng: &mut R) -> Solution<f64, Vec<u8>> {
//!         let mut digits = self.0.clone();
//!         while digits.len() < 3 {
//!             digits.push(rng.random_range(0..10));
//!         }
//!         let sum: f64 = digits.iter().map(|&d| f64::from(d)).sum();
//!         Solution::feasible(sum).with_data(digits)
//!     }
//!     fn bound(&self) -> f64 { self.0.iter().map(|&d| f64::from(d)).sum() }
//! }
//!
//! let config = MctsConfig::builder().with_rng_seed(1).build().unwrap();
//! let outcome = MctsSolver::new(config).solve(Digits::root(())).unwrap();
//! assert!(outcome.is_opt());
//! assert_eq!(outcome.best().value(), 0.0);
//! ```

use crate::{
    config::MctsConfig,
    error::{MctsError, MctsResult},
    monitor::{
        composite::CompositeTreeSearchMonitor,
        no_op::NoOperationMonitor,
        tree_search_monitor::{PruneReason, TreeSearchMonitor},
        wrapper::SearchMonitorAdapter,
    },
    node::TreeNode,
    result::{IncumbentRecord, MctsOutcome},
    selection::{SelectionPolicy, UctSelection, select_child},
    statistics::MctsStatistics,
    tree::{NodeIndex, NodeStatus, SearchTree},
};
use canopy_core::num::ObjectiveValue;
use canopy_search::{
    monitor::{
        iteration_limit::IterationLimitMonitor, search_monitor::SearchCommand,
        time_limit::TimeLimitMonitor,
    },
    result::TerminationReason,
    solution::Solution,
    tracker::SolutionTracker,
};
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Runs a search from `root` with the default selection policy.
///
/// `None` limits are unbounded. Without a seed the run draws one from the
/// thread RNG; it is logged and recorded in the statistics.
///
/// # Errors
///
/// Returns `MctsError::ContractViolation` if a node reports a `NaN`
/// objective value or bound.
pub fn run<N>(
    root: N,
    iter_limit: Option<u64>,
    time_limit: Option<Duration>,
    rng_seed: Option<u64>,
) -> MctsResult<MctsOutcome<N::Value, N::Data>>
where
    N: TreeNode,
{
    let mut builder = MctsConfig::builder();
    if let Some(limit) = iter_limit {
        builder = builder.with_iter_limit(limit);
    }
    if let Some(limit) = time_limit {
        builder = builder.with_time_limit(limit);
    }
    if let Some(seed) = rng_seed {
        builder = builder.with_rng_seed(seed);
    }
    MctsSolver::new(builder.build()?).solve(root)
}

/// A Monte Carlo tree search solver for minimization problems.
///
/// The solver is stateless between runs; every call to `solve` builds a new
/// search tree.
#[derive(Debug, Clone, Default)]
pub struct MctsSolver<P = UctSelection> {
    config: MctsConfig,
    policy: P,
}

impl MctsSolver<UctSelection> {
    /// Creates a solver using `UctSelection` with the configured exploration constant.
    #[inline]
    pub fn new(config: MctsConfig) -> Self {
        let policy = UctSelection::new(config.exploration());
        Self { config, policy }
    }
}

impl<P> MctsSolver<P> {
    /// Creates a solver with a custom selection policy.
    #[inline]
    pub fn with_policy(config: MctsConfig, policy: P) -> Self {
        Self { config, policy }
    }

    #[inline]
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    #[inline]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Searches the tree below `root`.
    #[inline]
    pub fn solve<N>(&self, root: N) -> MctsResult<MctsOutcome<N::Value, N::Data>>
    where
        N: TreeNode,
        P: SelectionPolicy<N::Value>,
    {
        self.solve_with_monitor(root, NoOperationMonitor::new())
    }

    /// Searches the tree below `root`, reporting to `monitor`.
    #[inline]
    pub fn solve_with_monitor<N, M>(
        &self,
        root: N,
        monitor: M,
    ) -> MctsResult<MctsOutcome<N::Value, N::Data>>
    where
        N: TreeNode,
        P: SelectionPolicy<N::Value>,
        M: TreeSearchMonitor<N::Value, N::Data>,
    {
        self.explore(root, monitor).map(|(outcome, _)| outcome)
    }

    /// Searches the tree below `root` and also returns the final search tree.
    pub fn explore<N, M>(
        &self,
        root: N,
        monitor: M,
    ) -> MctsResult<(MctsOutcome<N::Value, N::Data>, SearchTree<N>)>
    where
        N: TreeNode,
        P: SelectionPolicy<N::Value>,
        M: TreeSearchMonitor<N::Value, N::Data>,
    {
        let mut composite = CompositeTreeSearchMonitor::with_capacity(3);
        if let Some(limit) = self.config.iter_limit() {
            composite.add_monitor(SearchMonitorAdapter::new(IterationLimitMonitor::new(limit)));
        }
        if let Some(limit) = self.config.time_limit() {
            composite.add_monitor(SearchMonitorAdapter::new(TimeLimitMonitor::new(limit)));
        }
        composite.add_monitor(monitor);

        let seed = match self.config.rng_seed() {
            Some(seed) => seed,
            None => {
                let seed = rand::rng().random::<u64>();
                info!("No RNG seed configured, seeding with {}", seed);
                seed
            }
        };

        let session =
            MctsSearchSession::new(&self.config, &self.policy, &mut composite, root, seed)?;
        session.run()
    }
}

#[inline]
fn checked_bound<N>(node: &N) -> MctsResult<N::Value>
where
    N: TreeNode,
{
    let bound = node.bound();
    if bound.is_valid_objective() {
        Ok(bound)
    } else {
        Err(MctsError::ContractViolation(
            "`TreeNode::bound` returned NaN".to_string(),
        ))
    }
}

/// A search session for the Monte Carlo tree search solver.
/// This struct encapsulates the state and logic of a single search run.
struct MctsSearchSession<'a, N, P, M>
where
    N: TreeNode,
{
    config: &'a MctsConfig,
    policy: &'a P,
    monitor: &'a mut M,
    tree: SearchTree<N>,
    tracker: SolutionTracker<N::Value>,
    incumbent: Option<Rc<Solution<N::Value, N::Data>>>,
    history: Vec<IncumbentRecord<N::Value>>,
    sweep_pending: bool,
    rng: ChaCha8Rng,
    stats: MctsStatistics<N::Value>,
    start_time: Instant,
}

impl<'a, N, P, M> std::fmt::Debug for MctsSearchSession<'a, N, P, M>
where
    N: TreeNode,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MctsSearchSession")
            .field("config", &self.config)
            .field("tree", &self.tree)
            .field("incumbent", &self.incumbent.as_ref().map(|s| s.value()))
            .field("stats", &self.stats)
            .finish()
    }
}

impl<'a, N, P, M> MctsSearchSession<'a, N, P, M>
where
    N: TreeNode,
    P: SelectionPolicy<N::Value>,
    M: TreeSearchMonitor<N::Value, N::Data>,
{
    /// Create a new search session.
    ///
    /// The root bound is computed here, the root simulation in `initialize`.
    fn new(
        config: &'a MctsConfig,
        policy: &'a P,
        monitor: &'a mut M,
        root: N,
        seed: u64,
    ) -> MctsResult<Self> {
        let bound = if config.pruning() {
            checked_bound(&root)?
        } else {
            <N::Value as ObjectiveValue>::constant(f64::NEG_INFINITY)
        };

        let mut stats = MctsStatistics::default();
        stats.set_rng_seed(seed);
        stats.set_root_bound(bound);
        stats.on_node_created(0);

        Ok(Self {
            config,
            policy,
            monitor,
            tree: SearchTree::new(root, bound),
            tracker: SolutionTracker::new(),
            incumbent: None,
            history: Vec::new(),
            sweep_pending: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
            stats,
            start_time: Instant::now(),
        })
    }

    /// Run the search session.
    fn run(mut self) -> MctsResult<(MctsOutcome<N::Value, N::Data>, SearchTree<N>)> {
        self.start_time = Instant::now();
        self.monitor.on_enter_search(&self.stats);
        info!(
            "Starting search: {}, seed {}, root bound {}",
            self.config, self.stats.rng_seed, self.stats.root_bound
        );

        self.initialize()?;
        let termination_reason = self.search_loop()?;

        self.stats.set_total_time(self.start_time.elapsed());
        self.monitor.on_exit_search(&self.stats);
        info!(
            "Finished at iteration {} ({:.2?}): {}, {}",
            self.stats.iterations, self.stats.time_total, termination_reason, self.tracker
        );
        self.finalize_result(termination_reason)
    }

    /// Simulates the root and closes it right away if it is a leaf or dominated.
    fn initialize(&mut self) -> MctsResult<()> {
        let root = self.tree.root();
        self.simulate(root)?;
        if self.tree.is_leaf(root) {
            self.stats.on_leaf();
            self.tree.close(root, NodeStatus::Exhausted);
        }
        self.sweep();
        Ok(())
    }

    /// Iterates until the tree is exhausted or a monitor stops the search.
    fn search_loop(&mut self) -> MctsResult<TerminationReason> {
        loop {
            if !self.tree.is_open(self.tree.root()) {
                return Ok(self.exhausted_reason());
            }
            if let SearchCommand::Terminate(msg) = self.monitor.search_command(&self.stats) {
                info!("Search aborted: {}", msg);
                return Ok(TerminationReason::Aborted(msg));
            }
            self.iterate()?;
            self.stats.on_iteration();
            self.monitor.on_iteration(&self.stats);
        }
    }

    #[inline]
    fn exhausted_reason(&self) -> TerminationReason {
        match &self.incumbent {
            Some(best) if best.is_feasible() => {
                info!("Search complete, solution is optimal");
                TerminationReason::OptimalityProven
            }
            _ => {
                info!("Search complete, no feasible solution exists");
                TerminationReason::InfeasibilityProven
            }
        }
    }

    /// One select, expand, simulate and backpropagate cycle.
    fn iterate(&mut self) -> MctsResult<()> {
        let Some(frontier) = self.select() else {
            return Ok(());
        };
        self.monitor
            .on_select(frontier, self.tree.depth(frontier), &self.stats);
        self.expand(frontier)?;
        self.sweep();
        Ok(())
    }

    /// Descends from the root through expanded nodes to a frontier node.
    fn select(&self) -> Option<NodeIndex> {
        let mut current = self.tree.root();
        while self.tree.is_expanded(current) {
            current = select_child(&self.tree, current, self.policy, &self.tracker)?;
        }
        Some(current)
    }

    /// Creates all children of `frontier`, then prunes or simulates each in branch order.
    fn expand(&mut self, frontier: NodeIndex) -> MctsResult<()> {
        let Some((state, branches)) = self.tree.begin_expansion(frontier) else {
            return Ok(());
        };
        self.stats.on_node_expanded();

        let mut children = Vec::with_capacity(branches.len());
        for branch in branches {
            let mut child = state.copy();
            child.apply(&branch);
            let bound = if self.config.pruning() {
                checked_bound(&child)?
            } else {
                <N::Value as ObjectiveValue>::constant(f64::NEG_INFINITY)
            };
            let index = self.tree.add_child(frontier, branch, child, bound);
            self.stats.on_node_created(self.tree.depth(index) as u64);
            children.push(index);
        }
        drop(state);

        debug!("Expanded {} into {} children", frontier, children.len());
        self.monitor
            .on_expand(frontier, children.len(), &self.stats);

        for child in children {
            if let Some(cutoff) = self.cutoff()
                && self.tree.bound(child) >= cutoff
            {
                self.tree.close(child, NodeStatus::Pruned);
                self.stats.on_pruning_bound();
                self.monitor
                    .on_prune(child, PruneReason::BoundDominated, &self.stats);
                continue;
            }
            self.simulate(child)?;
            if self.tree.is_leaf(child) {
                self.stats.on_leaf();
                self.tree.close(child, NodeStatus::Exhausted);
            }
        }

        self.tree.settle(frontier);
        Ok(())
    }

    /// Simulates `index` and backpropagates the result.
    fn simulate(&mut self, index: NodeIndex) -> MctsResult<()> {
        let Some(node) = self.tree.node(index) else {
            return Ok(());
        };
        let solution = node.simulate(&mut self.rng);
        if !solution.has_valid_value() {
            return Err(MctsError::ContractViolation(format!(
                "`TreeNode::simulate` returned a NaN value at {}",
                index
            )));
        }

        self.stats.on_simulation(solution.is_feasible());
        let solution = Rc::new(solution);
        self.tree.backpropagate(index, &solution);
        self.tracker.observe(solution.as_ref());
        self.monitor.on_simulation(index, &solution, &self.stats);
        self.update_incumbent(solution);
        Ok(())
    }

    /// Installs `solution` as the incumbent if it is strictly better.
    fn update_incumbent(&mut self, solution: Rc<Solution<N::Value, N::Data>>) {
        let improves = match &self.incumbent {
            None => true,
            Some(best) => solution.is_better_than(best),
        };
        if !improves {
            return;
        }

        self.stats.on_incumbent_update();
        self.history.push(IncumbentRecord {
            value: solution.value(),
            is_feasible: solution.is_feasible(),
            iteration: self.stats.iterations,
            elapsed: self.start_time.elapsed(),
        });
        info!(
            "[i={} t={:.2?}] New incumbent: {}",
            self.stats.iterations,
            self.start_time.elapsed(),
            solution
        );
        self.monitor.on_solution_found(&solution, &self.stats);
        if solution.is_feasible() && self.config.pruning() {
            self.sweep_pending = true;
        }
        self.incumbent = Some(solution);
    }

    /// The value a bound must beat to stay open, if pruning applies.
    #[inline]
    fn cutoff(&self) -> Option<N::Value> {
        if !self.config.pruning() {
            return None;
        }
        self.incumbent
            .as_ref()
            .filter(|best| best.is_feasible())
            .map(|best| best.value())
    }

    /// Closes every open node dominated by an improved feasible incumbent.
    fn sweep(&mut self) {
        if !std::mem::take(&mut self.sweep_pending) {
            return;
        }
        let Some(cutoff) = self.cutoff() else {
            return;
        };

        let size_before = self.tree.open_count();
        let dominated = self.tree.dominated(cutoff);
        let mut closed = 0;
        for index in dominated {
            if self.tree.is_open(index) {
                self.tree.close(index, NodeStatus::Pruned);
                self.monitor.on_prune(index, PruneReason::Swept, &self.stats);
                closed += 1;
            }
        }
        self.stats.on_pruning_sweep(closed);
        if closed > 0 {
            info!(
                "Pruning at cutoff {} closed {} nodes ({} => {} open)",
                cutoff,
                closed,
                size_before,
                self.tree.open_count()
            );
        }
    }

    /// Finalize the solver outcome based on the incumbent and the termination reason.
    ///
    /// # Note
    ///
    /// This consumes self.
    fn finalize_result(
        self,
        reason: TerminationReason,
    ) -> MctsResult<(MctsOutcome<N::Value, N::Data>, SearchTree<N>)> {
        let Self {
            tree,
            incumbent,
            history,
            stats,
            ..
        } = self;
        let best = incumbent.map(Rc::unwrap_or_clone).ok_or_else(|| {
            MctsError::ContractViolation("search finished without a solution".to_string())
        })?;

        let outcome = match reason {
            TerminationReason::OptimalityProven => MctsOutcome::optimal(best, history, stats),
            TerminationReason::InfeasibilityProven => {
                MctsOutcome::infeasible(best, history, stats)
            }
            TerminationReason::Aborted(msg) => MctsOutcome::aborted(best, msg, history, stats),
        };
        Ok((outcome, tree))
    }
}
