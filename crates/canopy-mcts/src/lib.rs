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

//! Canopy-MCTS: Monte Carlo tree search for combinatorial minimization
//!
//! Generic engine that searches any problem exposed through the `TreeNode`
//! trait. Random rollouts estimate the quality of a subtree, UCT balances
//! exploration against exploitation, and optional admissible bounds let the
//! engine prune like branch-and-bound and prove optimality.
//!
//! Core flow
//! - Implement `node::TreeNode` for your problem state (root, copy, branches,
//!   apply, simulate and optionally bound).
//! - Build a `config::MctsConfig` (limits, seed, exploration, pruning).
//! - Run `solver::MctsSolver::solve`, or the `solver::run` shortcut.
//! - Read the `result::MctsOutcome`: best solution, optimality flag,
//!   termination reason, incumbent history and statistics.
//!
//! Assumptions and guarantees
//! - Objectives are minimized; infeasible solutions carry a violation degree
//!   and always rank behind feasible ones.
//! - Bounds must never exceed the best objective reachable below a node.
//! - With a fixed seed, a run is fully deterministic.
//!
//! Module map
//! - `solver`: the engine and session orchestration.
//! - `tree`: arena search tree, node status and closure propagation.
//! - `selection`: selection policies and the UCT score.
//! - `node`: the problem contract.
//! - `monitor`: tree-search monitors (log, composite, adapters).
//! - `config`, `error`, `result`, `statistics`, `stats`: configuration,
//!   failures, outcomes, run counters and per-node statistics.

pub mod config;
pub mod error;
pub mod monitor;
pub mod node;
pub mod result;
pub mod selection;
pub mod solver;
pub mod statistics;
pub mod stats;
pub mod tree;
