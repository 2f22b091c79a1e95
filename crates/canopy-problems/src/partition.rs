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

//! # Number Partitioning
//!
//! Splits a multiset of non-negative integers into two subsets whose sums are
//! as close as possible. The objective is `log2(|discrepancy| + 1)`, so a
//! perfect partition scores `0`.
//!
//! ## Highlights
//!
//! - Branching follows the complete differencing tree: the two largest
//!   numbers are either put into opposite subsets (`Split`, replaced by their
//!   difference) or into the same subset (`Join`, replaced by their sum).
//! - Simulation is the Karmarkar-Karp differencing heuristic and never uses
//!   the RNG.
//! - A node stops branching when differencing is already optimal for it:
//!   four or fewer numbers left, or the largest number is at least the sum of
//!   the others minus one.
//! - There is no lower bound; the engine proves optimality by exhaustion.
//!
//! Solutions carry the differencing edges. `make_partition` turns them into
//! a subset assignment.

use crate::error::InstanceError;
use canopy_mcts::node::TreeNode;
use canopy_search::solution::Solution;
use log::debug;
use rand::Rng;
use std::{
    collections::BinaryHeap,
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    str::FromStr,
};

/// Exploration constant that works well with the log-scaled objective.
pub const PARTITION_EXPLORATION: f64 = 0.05;

/// A number partitioning instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionInstance {
    numbers: Vec<u64>,
}

impl PartitionInstance {
    /// # Errors
    ///
    /// Returns `InstanceError::Empty` if `numbers` is empty and
    /// `InstanceError::Overflow` if their sum does not fit into a `u64`.
    pub fn new(numbers: Vec<u64>) -> Result<Self, InstanceError> {
        if numbers.is_empty() {
            return Err(InstanceError::Empty);
        }
        let sum = numbers
            .iter()
            .try_fold(0u64, |sum, &number| sum.checked_add(number))
            .ok_or(InstanceError::Overflow)?;
        debug!(
            "Loaded partition instance with {} numbers, sum {}",
            numbers.len(),
            sum
        );
        Ok(Self { numbers })
    }

    /// Reads one number per line. Blank lines and text after `#` are ignored.
    pub fn from_bufread<R: BufRead>(rdr: R) -> Result<Self, InstanceError> {
        let mut numbers = Vec::new();
        for (line_index, line) in rdr.lines().enumerate() {
            let line = line?;
            let content = line.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }
            let number = content.parse::<u64>().map_err(|_| InstanceError::Parse {
                line: line_index + 1,
                token: content.to_string(),
            })?;
            numbers.push(number);
        }
        Self::new(numbers)
    }

    #[inline]
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, InstanceError> {
        Self::from_bufread(BufReader::new(rdr))
    }

    #[inline]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, InstanceError> {
        Self::from_bufread(BufReader::new(File::open(path)?))
    }

    #[inline]
    pub fn numbers(&self) -> &[u64] {
        &self.numbers
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    /// Always `false`; instances hold at least one number.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    #[inline]
    pub fn sum(&self) -> u64 {
        self.numbers.iter().sum()
    }
}

impl FromStr for PartitionInstance {
    type Err = InstanceError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bufread(s.as_bytes())
    }
}

impl std::fmt::Display for PartitionInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PartitionInstance(numbers: {}, sum: {})",
            self.numbers.len(),
            self.sum()
        )
    }
}

/// How the two numbers joined by an edge are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Same subset.
    Join,
    /// Opposite subsets.
    Split,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeKind::Join => write!(f, "join"),
            EdgeKind::Split => write!(f, "split"),
        }
    }
}

/// A differencing decision between the numbers at positions `a` and `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub kind: EdgeKind,
}

impl Edge {
    #[inline]
    pub fn new(a: usize, b: usize, kind: EdgeKind) -> Self {
        Self { a, b, kind }
    }
}

/// The partition objective for a given discrepancy.
#[inline]
pub fn objective(discrepancy: u64) -> f64 {
    (discrepancy as f64 + 1.0).log2()
}

/// Runs Karmarkar-Karp differencing over `(number, position)` labels.
fn differencing<I>(labels: I) -> (Vec<Edge>, u64)
where
    I: IntoIterator<Item = (u64, usize)>,
{
    let mut heap: BinaryHeap<(u64, usize)> = labels.into_iter().collect();
    let mut edges = Vec::with_capacity(heap.len().saturating_sub(1));
    loop {
        let Some((n, i)) = heap.pop() else {
            return (edges, 0);
        };
        let Some((m, j)) = heap.pop() else {
            return (edges, n);
        };
        edges.push(Edge::new(i, j, EdgeKind::Split));
        heap.push((n - m, i));
    }
}

/// Karmarkar-Karp differencing: repeatedly replaces the two largest numbers
/// by their difference. Returns the `Split` edges and the final discrepancy.
#[inline]
pub fn karmarkar_karp(numbers: &[u64]) -> (Vec<Edge>, u64) {
    differencing(numbers.iter().copied().zip(0..))
}

/// Assigns every position to a subset, `false` for the subset holding
/// position `0`.
///
/// Returns `None` unless `edges` connect all `len` positions.
pub fn make_partition(edges: &[Edge], len: usize) -> Option<Vec<bool>> {
    let mut adjacency: Vec<Vec<(usize, EdgeKind)>> = vec![Vec::new(); len];
    for edge in edges {
        if edge.a >= len || edge.b >= len {
            return None;
        }
        adjacency[edge.a].push((edge.b, edge.kind));
        adjacency[edge.b].push((edge.a, edge.kind));
    }

    let mut side: Vec<Option<bool>> = vec![None; len];
    let mut stack = Vec::with_capacity(len);
    if len > 0 {
        side[0] = Some(false);
        stack.push(0);
    }
    while let Some(current) = stack.pop() {
        let Some(current_side) = side[current] else {
            continue;
        };
        for &(next, kind) in &adjacency[current] {
            if side[next].is_none() {
                side[next] = Some(match kind {
                    EdgeKind::Join => current_side,
                    EdgeKind::Split => !current_side,
                });
                stack.push(next);
            }
        }
    }
    side.into_iter().collect()
}

/// The absolute difference between the sums of the two subsets.
pub fn discrepancy(numbers: &[u64], sides: &[bool]) -> u64 {
    debug_assert_eq!(
        numbers.len(),
        sides.len(),
        "called `discrepancy` with {} numbers but {} sides",
        numbers.len(),
        sides.len()
    );
    let (left, right) = numbers
        .iter()
        .zip(sides)
        .fold((0u64, 0u64), |(left, right), (&n, &side)| {
            if side { (left, right + n) } else { (left + n, right) }
        });
    left.abs_diff(right)
}

/// A partial differencing tree.
///
/// `labels` holds the numbers still to be placed, ascending, each tagged with
/// the position it stands for.
#[derive(Debug, Clone)]
pub struct PartitionNode {
    labels: Vec<(u64, usize)>,
    edges: Vec<Edge>,
    sum_remaining: u64,
}

impl PartitionNode {
    /// Edges decided so far.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Numbers still to be placed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.labels.len()
    }

    /// Sum of the numbers still to be placed.
    #[inline]
    pub fn sum_remaining(&self) -> u64 {
        self.sum_remaining
    }

    /// `true` if the largest number is at least the sum of the others minus one.
    #[inline]
    fn largest_dominates(&self) -> bool {
        match self.labels.last() {
            Some(&(largest, _)) => largest.saturating_add(1) >= self.sum_remaining - largest,
            None => true,
        }
    }
}

impl TreeNode for PartitionNode {
    type Instance = PartitionInstance;
    type Branch = EdgeKind;
    type Value = f64;
    type Data = Vec<Edge>;

    fn root(instance: PartitionInstance) -> Self {
        let sum_remaining = instance.sum();
        let mut labels: Vec<(u64, usize)> = instance.numbers.into_iter().zip(0..).collect();
        labels.sort_unstable();
        Self {
            edges: Vec::with_capacity(labels.len().saturating_sub(1)),
            labels,
            sum_remaining,
        }
    }

    #[inline]
    fn copy(&self) -> Self {
        self.clone()
    }

    fn branches(&self) -> Vec<EdgeKind> {
        if self.labels.len() <= 4 || self.largest_dominates() {
            Vec::new()
        } else {
            vec![EdgeKind::Split, EdgeKind::Join]
        }
    }

    fn apply(&mut self, kind: &EdgeKind) {
        debug_assert!(
            self.labels.len() >= 2,
            "called `PartitionNode::apply` with {} numbers left",
            self.labels.len()
        );
        let (Some((n, i)), Some((m, j))) = (self.labels.pop(), self.labels.pop()) else {
            return;
        };
        self.edges.push(Edge::new(i, j, *kind));
        let label = match kind {
            EdgeKind::Split => {
                self.sum_remaining -= 2 * m;
                (n - m, i)
            }
            EdgeKind::Join => (n + m, i),
        };
        let position = self.labels.partition_point(|&other| other <= label);
        self.labels.insert(position, label);
    }

    fn simulate<R>(&self, _rng: &mut R) -> Solution<f64, Vec<Edge>>
    where
        R: Rng + ?Sized,
    {
        let mut edges = self.edges.clone();
        let discrepancy = match self.labels.split_last() {
            Some((&(largest, i), rest)) if self.largest_dominates() => {
                edges.extend(rest.iter().map(|&(_, j)| Edge::new(i, j, EdgeKind::Split)));
                largest.abs_diff(self.sum_remaining - largest)
            }
            _ => {
                let (tail, discrepancy) = differencing(self.labels.iter().copied());
                edges.extend(tail);
                discrepancy
            }
        };
        Solution::feasible(objective(discrepancy)).with_data(edges)
    }
}

impl std::fmt::Display for PartitionNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PartitionNode(remaining: {}, sum: {}, edges: {})",
            self.labels.len(),
            self.sum_remaining,
            self.edges.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brute_force::partition_optimum;
    use canopy_mcts::{config::MctsConfig, result::MctsOutcome, solver::MctsSolver};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn instance(numbers: &[u64]) -> PartitionInstance {
        PartitionInstance::new(numbers.to_vec()).unwrap()
    }

    fn solve(numbers: &[u64], seed: u64) -> MctsOutcome<f64, Vec<Edge>> {
        let config = MctsConfig::builder()
            .with_rng_seed(seed)
            .with_exploration(PARTITION_EXPLORATION)
            .build()
            .unwrap();
        MctsSolver::new(config)
            .solve(PartitionNode::root(instance(numbers)))
            .unwrap()
    }

    #[test]
    fn test_parse_skips_blank_lines_and_comments() {
        let parsed: PartitionInstance = "8\n7\n# comment\n\n  6 \n5 # five\n4\n".parse().unwrap();
        assert_eq!(parsed.numbers(), &[8, 7, 6, 5, 4]);
        assert_eq!(parsed.len(), 5);
        assert_eq!(parsed.sum(), 30);
        assert_eq!(parsed.to_string(), "PartitionInstance(numbers: 5, sum: 30)");
    }

    #[test]
    fn test_parse_errors() {
        let err = "1\n2\nthree\n".parse::<PartitionInstance>().unwrap_err();
        assert!(matches!(
            err,
            InstanceError::Parse { line: 3, ref token } if token == "three"
        ));
        let err = "-4\n".parse::<PartitionInstance>().unwrap_err();
        assert!(matches!(err, InstanceError::Parse { line: 1, .. }));
        let err = "# nothing\n\n".parse::<PartitionInstance>().unwrap_err();
        assert!(matches!(err, InstanceError::Empty));
        assert!(PartitionInstance::from_path("/nonexistent/numbers.dat").is_err());
    }

    #[test]
    fn test_rejects_sum_beyond_u64() {
        assert!(matches!(
            PartitionInstance::new(vec![u64::MAX, 1]),
            Err(InstanceError::Overflow)
        ));
        let err = format!("{}\n{}\n", u64::MAX - 1, 2)
            .parse::<PartitionInstance>()
            .unwrap_err();
        assert!(matches!(err, InstanceError::Overflow));
    }

    #[test]
    fn test_largest_number_at_the_limit() {
        let node = PartitionNode::root(instance(&[u64::MAX - 4, 1, 1, 1, 1]));
        assert_eq!(node.sum_remaining(), u64::MAX);
        assert!(node.branches().is_empty());

        let node = PartitionNode::root(instance(&[u64::MAX, 0, 0, 0, 0, 0]));
        assert!(node.branches().is_empty());
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let solution = node.simulate(&mut rng);
        assert_eq!(solution.value(), objective(u64::MAX));
    }

    #[test]
    fn test_objective() {
        assert_eq!(objective(0), 0.0);
        assert_eq!(objective(1), 1.0);
        assert_eq!(objective(3), 2.0);
        assert_eq!(objective(7), 3.0);
    }

    #[test]
    fn test_karmarkar_karp() {
        let numbers = [8, 7, 6, 5, 4];
        let (edges, diff) = karmarkar_karp(&numbers);
        assert_eq!(diff, 2);
        assert_eq!(edges.len(), 4);
        assert!(edges.iter().all(|e| e.kind == EdgeKind::Split));

        let sides = make_partition(&edges, numbers.len()).unwrap();
        assert_eq!(discrepancy(&numbers, &sides), 2);

        assert_eq!(karmarkar_karp(&[]), (Vec::new(), 0));
        assert_eq!(karmarkar_karp(&[9]), (Vec::new(), 9));
    }

    #[test]
    fn test_make_partition() {
        let edges = [
            Edge::new(0, 1, EdgeKind::Join),
            Edge::new(1, 2, EdgeKind::Split),
        ];
        assert_eq!(make_partition(&edges, 3), Some(vec![false, false, true]));
        assert_eq!(make_partition(&edges, 4), None);
        assert_eq!(make_partition(&edges, 2), None);
        assert_eq!(make_partition(&[], 1), Some(vec![false]));
        assert_eq!(discrepancy(&[3, 4, 7], &[false, false, true]), 0);
    }

    #[test]
    fn test_root_branches() {
        let root = PartitionNode::root(instance(&[8, 7, 6, 5, 4]));
        assert_eq!(root.branches(), vec![EdgeKind::Split, EdgeKind::Join]);
        assert_eq!(root.remaining(), 5);
        assert_eq!(root.sum_remaining(), 30);

        let small = PartitionNode::root(instance(&[8, 7, 6, 5]));
        assert!(small.branches().is_empty());

        let dominated = PartitionNode::root(instance(&[100, 1, 2, 3, 4, 5]));
        assert!(dominated.branches().is_empty());
    }

    #[test]
    fn test_apply_split_and_join() {
        let root = PartitionNode::root(instance(&[8, 7, 6, 5, 4]));

        let mut split = root.copy();
        split.apply(&EdgeKind::Split);
        assert_eq!(split.labels, vec![(1, 0), (4, 4), (5, 3), (6, 2)]);
        assert_eq!(split.sum_remaining(), 16);
        assert_eq!(split.edges(), &[Edge::new(0, 1, EdgeKind::Split)]);

        let mut join = root.copy();
        join.apply(&EdgeKind::Join);
        assert_eq!(join.labels, vec![(4, 4), (5, 3), (6, 2), (15, 0)]);
        assert_eq!(join.sum_remaining(), 30);

        assert_eq!(root.remaining(), 5);
        assert!(root.edges().is_empty());
    }

    #[test]
    fn test_simulate_places_dominating_number_alone() {
        let numbers = [100, 1, 2, 3, 4, 5];
        let root = PartitionNode::root(instance(&numbers));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let solution = root.simulate(&mut rng);
        assert_eq!(solution.value(), objective(85));

        let sides = make_partition(solution.data().unwrap(), numbers.len()).unwrap();
        assert_eq!(sides, vec![false, true, true, true, true, true]);
        assert_eq!(root.remaining(), 6);
    }

    #[test]
    fn test_simulate_matches_partition() {
        let numbers = [13, 21, 5, 8, 34, 2, 3, 1, 1, 55];
        let mut node = PartitionNode::root(instance(&numbers));
        node.apply(&EdgeKind::Join);
        node.apply(&EdgeKind::Split);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let solution = node.simulate(&mut rng);

        let edges = solution.data().unwrap();
        assert_eq!(edges.len(), numbers.len() - 1);
        let sides = make_partition(edges, numbers.len()).unwrap();
        assert_eq!(solution.value(), objective(discrepancy(&numbers, &sides)));
    }

    #[test]
    fn test_finds_perfect_partition() {
        let outcome = solve(&[8, 7, 6, 5, 4], 1);
        assert!(outcome.is_opt());
        assert_eq!(outcome.best().value(), 0.0);
        let sides = make_partition(outcome.best().data().unwrap(), 5).unwrap();
        assert_eq!(discrepancy(&[8, 7, 6, 5, 4], &sides), 0);
    }

    #[test]
    fn test_odd_sum_cannot_do_better_than_one() {
        let numbers = [31, 23, 17, 11, 9, 7, 5, 2];
        let outcome = solve(&numbers, 4);
        assert!(outcome.is_opt());
        assert_eq!(outcome.best().value(), objective(partition_optimum(&numbers)));
        assert_eq!(outcome.best().value(), 1.0);
    }

    #[test]
    fn test_display() {
        let root = PartitionNode::root(instance(&[3, 1, 2]));
        assert_eq!(root.to_string(), "PartitionNode(remaining: 3, sum: 6, edges: 0)");
        assert_eq!(EdgeKind::Split.to_string(), "split");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::brute_force::partition_optimum;
    use canopy_mcts::{config::MctsConfig, solver::MctsSolver};
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_exhaustive_search_finds_optimum(
            numbers in prop::collection::vec(0u64..200, 1..11),
            seed in any::<u64>()
        ) {
            let config = MctsConfig::builder()
                .with_rng_seed(seed)
                .with_exploration(PARTITION_EXPLORATION)
                .build()
                .unwrap();
            let outcome = MctsSolver::new(config)
                .solve(PartitionNode::root(PartitionInstance::new(numbers.clone()).unwrap()))
                .unwrap();

            prop_assert!(outcome.is_opt());
            let optimum = partition_optimum(&numbers);
            prop_assert_eq!(outcome.best().value(), objective(optimum));

            let sides = make_partition(outcome.best().data().unwrap(), numbers.len());
            prop_assert!(sides.is_some());
            prop_assert_eq!(discrepancy(&numbers, &sides.unwrap()), optimum);
        }

        #[test]
        fn prop_karmarkar_karp_is_consistent(
            numbers in prop::collection::vec(0u64..1000, 1..30)
        ) {
            let (edges, diff) = karmarkar_karp(&numbers);
            prop_assert_eq!(edges.len(), numbers.len() - 1);
            let sides = make_partition(&edges, numbers.len()).unwrap();
            prop_assert_eq!(discrepancy(&numbers, &sides), diff);
            prop_assert!(diff >= partition_optimum_lower(&numbers));
        }
    }

    /// Parity of the total: no partition can beat it.
    fn partition_optimum_lower(numbers: &[u64]) -> u64 {
        numbers.iter().sum::<u64>() % 2
    }
}
