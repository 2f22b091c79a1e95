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

//! # Tree Node Contract
//!
//! `TreeNode` is the only thing a problem has to provide. A node is a partial
//! solution; branching on it yields the nodes one level further down. The
//! engine never looks inside a node, it only calls the six operations below.
//!
//! ## Operations
//!
//! - `root`: builds the initial node from a problem instance.
//! - `copy`: an independent copy; `apply` on the copy must never be visible
//!   through the original. Immutable problem data (item catalogs, distance
//!   matrices) may be shared, e.g. behind an `Rc`.
//! - `branches`: the ordered, deterministic list of branch choices. An empty
//!   list marks a leaf.
//! - `apply`: descends one level in place.
//! - `simulate`: a randomized or heuristic dive to a complete solution. It
//!   must not mutate the node and draws randomness only from the given RNG,
//!   which keeps seeded runs reproducible.
//! - `bound`: a lower bound on every solution in the subtree. The engine
//!   calls it at most once per node and caches the answer. The default of
//!   `-inf` never prunes anything.
//!
//! Parent links, children, statistics and the branch path are not part of
//! the node. They live in the engine's `NodeEnvelope`, so an implementation
//! cannot collide with them.
//!
//! Objectives are minimized. Maximization problems negate their objective
//! and bound.

use canopy_core::num::ObjectiveValue;
use canopy_search::solution::Solution;
use rand::Rng;

/// A problem-specific search tree node.
pub trait TreeNode: Sized {
    /// Whatever `root` needs to build the initial node.
    type Instance;
    /// A single branch choice.
    type Branch: Clone + std::fmt::Debug;
    /// The objective value type.
    type Value: ObjectiveValue;
    /// Payload attached to simulated solutions.
    type Data: Clone;

    /// Builds the root node of the search tree.
    fn root(instance: Self::Instance) -> Self;

    /// Returns a copy whose mutable state is fully independent of `self`.
    fn copy(&self) -> Self;

    /// The branch choices available at this node, empty for a leaf.
    fn branches(&self) -> Vec<Self::Branch>;

    /// Applies `branch` to this node in place.
    fn apply(&mut self, branch: &Self::Branch);

    /// Completes this node to a full solution.
    fn simulate<R>(&self, rng: &mut R) -> Solution<Self::Value, Self::Data>
    where
        R: Rng + ?Sized;

    /// A lower bound on the objective of every solution below this node.
    #[inline]
    fn bound(&self) -> Self::Value {
        <Self::Value as ObjectiveValue>::constant(f64::NEG_INFINITY)
    }
}
