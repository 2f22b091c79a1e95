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

//! # 0/1 Knapsack
//!
//! Maximizes the total value of the packed items without exceeding the
//! knapsack capacity. The engine minimizes, so the objective is the negated
//! packed value and the bound is the negated fractional relaxation.
//!
//! ## Highlights
//!
//! - Branching:
//!   - Items are kept in ascending value/weight ratio order. Every branch
//!     decides the best remaining item: pack it (`true`) or skip it (`false`).
//!   - Items that no longer fit are dropped after every pack, so both
//!     branches are always admissible.
//!   - Once everything that is left fits, it is packed at once and the node
//!     becomes a leaf.
//! - Simulation: a uniform random dive over pack/skip decisions.
//! - Bound: the greedy fractional relaxation over the remaining items.

use crate::error::InstanceError;
use canopy_mcts::node::TreeNode;
use canopy_search::solution::Solution;
use log::debug;
use rand::Rng;

/// An item that can be packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Item {
    index: usize,
    value: u64,
    weight: u64,
}

impl Item {
    #[inline]
    pub fn new(index: usize, value: u64, weight: u64) -> Self {
        debug_assert!(
            weight > 0,
            "called `Item::new` with zero weight for item {}",
            index
        );
        Self {
            index,
            value,
            weight,
        }
    }

    /// The position of the item in its instance.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.value
    }

    #[inline]
    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Value per unit of weight.
    #[inline]
    pub fn ratio(&self) -> f64 {
        self.value as f64 / self.weight as f64
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Item({}: value={}, weight={})",
            self.index, self.value, self.weight
        )
    }
}

/// A 0/1 knapsack instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnapsackInstance {
    items: Vec<Item>,
    capacity: u64,
}

impl KnapsackInstance {
    /// Builds an instance from parallel value and weight lists.
    ///
    /// # Errors
    ///
    /// Returns `InstanceError::InvalidItem` if the lists differ in length or
    /// an item has zero weight.
    pub fn new(values: &[u64], weights: &[u64], capacity: u64) -> Result<Self, InstanceError> {
        if values.len() != weights.len() {
            return Err(InstanceError::InvalidItem {
                index: values.len().min(weights.len()),
                reason: "values and weights differ in length",
            });
        }
        Self::from_pairs(values.iter().copied().zip(weights.iter().copied()), capacity)
    }

    /// Builds an instance from `(value, weight)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `InstanceError::InvalidItem` if an item has zero weight and
    /// `InstanceError::Overflow` if the total value or weight does not fit
    /// into a `u64`.
    pub fn from_pairs<I>(pairs: I, capacity: u64) -> Result<Self, InstanceError>
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        let items = pairs
            .into_iter()
            .enumerate()
            .map(|(index, (value, weight))| {
                if weight == 0 {
                    Err(InstanceError::InvalidItem {
                        index,
                        reason: "weight must be positive",
                    })
                } else {
                    Ok(Item::new(index, value, weight))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total_value = items
            .iter()
            .try_fold(0u64, |sum, item| sum.checked_add(item.value));
        let total_weight = items
            .iter()
            .try_fold(0u64, |sum, item| sum.checked_add(item.weight));
        let (Some(total_value), Some(total_weight)) = (total_value, total_weight) else {
            return Err(InstanceError::Overflow);
        };
        debug!(
            "Loaded knapsack instance with {} items, capacity {}, total weight {}, total value {}",
            items.len(),
            capacity,
            total_weight,
            total_value
        );
        Ok(Self { items, capacity })
    }

    #[inline]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The total value of the items at `packed`, or `None` if the selection
    /// repeats an item, names an unknown one or exceeds the capacity.
    pub fn evaluate(&self, packed: &[usize]) -> Option<u64> {
        let mut seen = vec![false; self.items.len()];
        let mut weight = 0u64;
        let mut value = 0u64;
        for &index in packed {
            let item = self.items.get(index)?;
            if std::mem::replace(&mut seen[index], true) {
                return None;
            }
            weight = weight.checked_add(item.weight)?;
            value = value.checked_add(item.value)?;
        }
        (weight <= self.capacity).then_some(value)
    }
}

impl std::fmt::Display for KnapsackInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "KnapsackInstance(items: {}, capacity: {})",
            self.items.len(),
            self.capacity
        )
    }
}

/// A partial packing.
///
/// Invariant: every item in `items_left` fits into `capacity_left`.
#[derive(Debug, Clone)]
pub struct KnapsackNode {
    /// Undecided items, ascending by ratio; the next decision is on the last one.
    items_left: Vec<Item>,
    packed: Vec<usize>,
    weight_left: u64,
    capacity_left: u64,
    total_value: u64,
}

impl KnapsackNode {
    /// The value packed so far.
    #[inline]
    pub fn total_value(&self) -> u64 {
        self.total_value
    }

    #[inline]
    pub fn capacity_left(&self) -> u64 {
        self.capacity_left
    }

    /// Indices of the packed items in packing order.
    #[inline]
    pub fn packed(&self) -> &[usize] {
        &self.packed
    }

    /// Number of items still undecided.
    #[inline]
    pub fn num_items_left(&self) -> usize {
        self.items_left.len()
    }

    /// Packs all remaining items if they fit together.
    fn pack_rest_if_fits(&mut self) {
        if self.weight_left > self.capacity_left {
            return;
        }
        for item in self.items_left.drain(..) {
            self.total_value += item.value;
            self.capacity_left -= item.weight;
            self.packed.push(item.index);
        }
        self.weight_left = 0;
    }
}

impl TreeNode for KnapsackNode {
    type Instance = KnapsackInstance;
    type Branch = bool;
    type Value = f64;
    type Data = Vec<usize>;

    fn root(instance: KnapsackInstance) -> Self {
        let capacity = instance.capacity;
        let mut items_left: Vec<Item> = instance
            .items
            .into_iter()
            .filter(|item| item.weight <= capacity)
            .collect();
        items_left.sort_by(|a, b| a.ratio().total_cmp(&b.ratio()));

        let mut node = Self {
            weight_left: items_left.iter().map(|item| item.weight).sum(),
            items_left,
            packed: Vec::new(),
            capacity_left: capacity,
            total_value: 0,
        };
        node.pack_rest_if_fits();
        node
    }

    #[inline]
    fn copy(&self) -> Self {
        self.clone()
    }

    #[inline]
    fn branches(&self) -> Vec<bool> {
        if self.items_left.is_empty() {
            Vec::new()
        } else {
            vec![true, false]
        }
    }

    fn apply(&mut self, pack: &bool) {
        debug_assert!(
            !self.items_left.is_empty(),
            "called `KnapsackNode::apply` with no items left"
        );
        let Some(item) = self.items_left.pop() else {
            return;
        };
        self.weight_left -= item.weight;

        if *pack {
            self.total_value += item.value;
            self.capacity_left -= item.weight;
            self.packed.push(item.index);

            let capacity = self.capacity_left;
            self.items_left.retain(|item| item.weight <= capacity);
            self.weight_left = self.items_left.iter().map(|item| item.weight).sum();
        }
        self.pack_rest_if_fits();
    }

    fn simulate<R>(&self, rng: &mut R) -> Solution<f64, Vec<usize>>
    where
        R: Rng + ?Sized,
    {
        let mut node = self.copy();
        while !node.items_left.is_empty() {
            let pack = rng.random::<bool>();
            node.apply(&pack);
        }
        Solution::feasible(-(node.total_value as f64)).with_data(node.packed)
    }

    fn bound(&self) -> f64 {
        let mut bound = self.total_value as f64;
        let mut capacity = self.capacity_left;
        for item in self.items_left.iter().rev() {
            if item.weight <= capacity {
                bound += item.value as f64;
                capacity -= item.weight;
            } else {
                bound += item.value as f64 * capacity as f64 / item.weight as f64;
                break;
            }
        }
        -bound
    }
}

impl std::fmt::Display for KnapsackNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "KnapsackNode(value: {}, capacity left: {}, items left: {})",
            self.total_value,
            self.capacity_left,
            self.items_left.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brute_force::knapsack_optimum;
    use canopy_mcts::{config::MctsConfig, solver::MctsSolver};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn instance_1() -> KnapsackInstance {
        KnapsackInstance::new(
            &[92, 57, 49, 68, 60, 43, 67, 84, 87, 72],
            &[23, 31, 29, 44, 53, 38, 63, 85, 89, 82],
            165,
        )
        .unwrap()
    }

    fn instance_2() -> KnapsackInstance {
        KnapsackInstance::new(&[24, 13, 23, 15, 16], &[12, 7, 11, 8, 9], 26).unwrap()
    }

    fn solve(instance: KnapsackInstance, seed: u64) -> canopy_mcts::result::MctsOutcome<f64, Vec<usize>> {
        let config = MctsConfig::builder().with_rng_seed(seed).build().unwrap();
        MctsSolver::new(config)
            .solve(KnapsackNode::root(instance))
            .unwrap()
    }

    fn sorted(mut items: Vec<usize>) -> Vec<usize> {
        items.sort_unstable();
        items
    }

    #[test]
    fn test_instance_validation() {
        assert!(matches!(
            KnapsackInstance::new(&[1, 2], &[1], 3),
            Err(InstanceError::InvalidItem { index: 1, .. })
        ));
        assert!(matches!(
            KnapsackInstance::new(&[1, 2], &[1, 0], 3),
            Err(InstanceError::InvalidItem { index: 1, .. })
        ));
        let instance = KnapsackInstance::new(&[], &[], 3).unwrap();
        assert!(instance.is_empty());
        assert_eq!(instance.to_string(), "KnapsackInstance(items: 0, capacity: 3)");
    }

    #[test]
    fn test_rejects_totals_beyond_u64() {
        assert!(matches!(
            KnapsackInstance::new(&[u64::MAX, 1], &[1, 1], 3),
            Err(InstanceError::Overflow)
        ));
        assert!(matches!(
            KnapsackInstance::from_pairs([(1, u64::MAX - 1), (1, 2)], u64::MAX),
            Err(InstanceError::Overflow)
        ));
        assert!(KnapsackInstance::from_pairs([(u64::MAX, 1)], 1).is_ok());
    }

    #[test]
    fn test_solves_instance_with_totals_at_the_limit() {
        let instance = KnapsackInstance::new(
            &[u64::MAX - 10, 5, 5],
            &[u64::MAX - 2, 1, 1],
            u64::MAX - 1,
        )
        .unwrap();
        let root = KnapsackNode::root(instance.clone());
        assert_eq!(root.num_items_left(), 3);

        let outcome = MctsSolver::new(MctsConfig::builder().with_rng_seed(5).build().unwrap())
            .solve(root)
            .unwrap();
        assert!(outcome.is_opt());
        let packed = outcome.best().data().unwrap();
        let value = instance.evaluate(packed).unwrap();
        assert!(value >= u64::MAX - 10);
    }

    #[test]
    fn test_evaluate() {
        let instance = instance_2();
        assert_eq!(instance.evaluate(&[1, 2, 3]), Some(51));
        assert_eq!(instance.evaluate(&[]), Some(0));
        assert_eq!(instance.evaluate(&[0, 2, 3]), None);
        assert_eq!(instance.evaluate(&[1, 1]), None);
        assert_eq!(instance.evaluate(&[7]), None);
    }

    #[test]
    fn test_root_orders_by_ratio_and_drops_heavy_items() {
        let instance = KnapsackInstance::new(&[10, 6, 100, 4], &[5, 2, 50, 4], 10).unwrap();
        let root = KnapsackNode::root(instance);
        let order: Vec<usize> = root.items_left.iter().map(Item::index).collect();
        assert_eq!(order, vec![3, 0, 1]);
        assert_eq!(root.weight_left, 11);
        assert_eq!(root.branches(), vec![true, false]);
    }

    #[test]
    fn test_root_packs_everything_when_it_fits() {
        let instance = KnapsackInstance::new(&[3, 4], &[2, 3], 10).unwrap();
        let root = KnapsackNode::root(instance);
        assert!(root.branches().is_empty());
        assert_eq!(root.total_value(), 7);
        assert_eq!(root.capacity_left(), 5);
        assert_eq!(sorted(root.packed().to_vec()), vec![0, 1]);
        assert_eq!(root.bound(), -7.0);
    }

    #[test]
    fn test_apply_decides_best_ratio_item() {
        let mut node = KnapsackNode::root(instance_2());
        // Item 2 has the best ratio.
        node.apply(&true);
        assert_eq!(node.packed(), &[2]);
        assert_eq!(node.total_value(), 23);
        assert_eq!(node.capacity_left(), 15);
        assert_eq!(node.num_items_left(), 4);

        let mut skipped = KnapsackNode::root(instance_2());
        skipped.apply(&false);
        assert!(skipped.packed().is_empty());
        assert_eq!(skipped.capacity_left(), 26);
        assert_eq!(skipped.num_items_left(), 4);
    }

    #[test]
    fn test_pack_filters_items_and_fills_the_rest() {
        let instance = KnapsackInstance::new(&[10, 9, 1], &[5, 5, 4], 9).unwrap();
        let mut node = KnapsackNode::root(instance);
        node.apply(&true);
        // Item 1 no longer fits, item 2 does and is packed right away.
        assert!(node.branches().is_empty());
        assert_eq!(sorted(node.packed().to_vec()), vec![0, 2]);
        assert_eq!(node.total_value(), 11);
        assert_eq!(node.capacity_left(), 0);
    }

    #[test]
    fn test_bound_is_fractional_relaxation() {
        let root = KnapsackNode::root(instance_2());
        assert!((root.bound() - (-52.625)).abs() < 1e-12);
        assert!(root.bound() <= -51.0);
    }

    #[test]
    fn test_copy_is_independent() {
        let root = KnapsackNode::root(instance_1());
        let mut copy = root.copy();
        copy.apply(&true);
        copy.apply(&false);
        assert_eq!(root.num_items_left(), 10);
        assert!(root.packed().is_empty());
        assert_eq!(root.total_value(), 0);
    }

    #[test]
    fn test_simulations_respect_capacity() {
        let instance = instance_1();
        let root = KnapsackNode::root(instance.clone());
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..50 {
            let solution = root.simulate(&mut rng);
            assert!(solution.is_feasible());
            let packed = solution.data().unwrap();
            let value = instance.evaluate(packed).unwrap();
            assert_eq!(solution.value(), -(value as f64));
            assert!(solution.value() >= root.bound());
        }
        assert_eq!(root.num_items_left(), 10);
    }

    #[test]
    fn test_solves_small_instance() {
        let instance = KnapsackInstance::new(&[3, 4, 5], &[2, 3, 4], 5).unwrap();
        let outcome = solve(instance, 1);
        assert!(outcome.is_opt());
        assert_eq!(outcome.best().value(), -7.0);
    }

    #[test]
    fn test_solves_instance_2() {
        let outcome = solve(instance_2(), 2);
        assert!(outcome.is_opt());
        assert_eq!(outcome.best().value(), -51.0);
        assert_eq!(
            sorted(outcome.best().data().cloned().unwrap()),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_solves_instance_1() {
        let outcome = solve(instance_1(), 3);
        assert!(outcome.is_opt());
        assert_eq!(outcome.best().value(), -309.0);
        assert_eq!(
            sorted(outcome.best().data().cloned().unwrap()),
            vec![0, 1, 2, 3, 5]
        );
        let (value, _) = knapsack_optimum(&instance_1());
        assert_eq!(value, 309);
    }

    #[test]
    fn test_display() {
        let root = KnapsackNode::root(instance_2());
        assert_eq!(
            root.to_string(),
            "KnapsackNode(value: 0, capacity left: 26, items left: 5)"
        );
        assert_eq!(
            Item::new(2, 5, 4).to_string(),
            "Item(2: value=5, weight=4)"
        );
    }
}
