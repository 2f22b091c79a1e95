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

//! Exhaustive reference solvers for small instances.
//!
//! Both enumerate every subset, so they are only usable for a few dozen
//! items at most. Tests use them to check the optimality proofs of the
//! tree search.

use crate::knapsack::KnapsackInstance;

/// Largest subset count either solver will enumerate.
const MAX_ITEMS: usize = 24;

/// The best packed value and the packed item indices (ascending).
///
/// Ties keep the subset enumerated first.
pub fn knapsack_optimum(instance: &KnapsackInstance) -> (u64, Vec<usize>) {
    let items = instance.items();
    debug_assert!(
        items.len() <= MAX_ITEMS,
        "called `knapsack_optimum` with {} items; at most {} are supported",
        items.len(),
        MAX_ITEMS
    );

    let mut best_value = 0;
    let mut best_mask = 0u32;
    for mask in 0u32..(1 << items.len()) {
        let (weight, value) = items
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .fold((0u64, 0u64), |(w, v), (_, item)| {
                (w + item.weight(), v + item.value())
            });
        if weight <= instance.capacity() && value > best_value {
            best_value = value;
            best_mask = mask;
        }
    }

    let packed = (0..items.len())
        .filter(|i| best_mask & (1 << i) != 0)
        .collect();
    (best_value, packed)
}

/// The smallest achievable difference between the sums of two subsets.
pub fn partition_optimum(numbers: &[u64]) -> u64 {
    debug_assert!(
        numbers.len() <= MAX_ITEMS,
        "called `partition_optimum` with {} numbers; at most {} are supported",
        numbers.len(),
        MAX_ITEMS
    );
    let Some((_, rest)) = numbers.split_first() else {
        return 0;
    };
    let total: u64 = numbers.iter().sum();

    // The first number stays on the left side.
    let mut best = u64::MAX;
    for mask in 0u32..(1 << rest.len()) {
        let right: u64 = rest
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, &n)| n)
            .sum();
        best = best.min((total - right).abs_diff(right));
    }
    best
}
