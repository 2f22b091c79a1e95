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

//! Solutions produced by simulations.
//!
//! A `Solution<T, D>` is an immutable record of an objective value, a
//! feasibility flag and optional, caller-owned payload data. The search never
//! inspects the payload.
//!
//! Ordering follows the minimization convention and ranks feasibility first:
//! every feasible solution is better than every infeasible one. Among
//! feasible solutions the lower objective wins; among infeasible solutions
//! `value` is the degree of infeasibility and the lower violation wins.

use canopy_core::num::ObjectiveValue;
use std::cmp::Ordering;

/// A complete (feasible or infeasible) solution found by a simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<T, D = ()> {
    value: T,
    is_feasible: bool,
    data: Option<D>,
}

impl<T, D> Solution<T, D>
where
    T: ObjectiveValue,
{
    /// Creates a new solution from its raw parts.
    ///
    /// `NaN` values are not rejected here; they compare as equal to every
    /// other value, and search engines report them as contract violations.
    #[inline]
    pub fn new(value: T, is_feasible: bool, data: Option<D>) -> Self {
        Self {
            value,
            is_feasible,
            data,
        }
    }

    /// Returns `true` if the value can take part in comparisons.
    #[inline]
    pub fn has_valid_value(&self) -> bool {
        self.value.is_valid_objective()
    }

    /// Creates a feasible solution with the given objective value.
    #[inline]
    pub fn feasible(value: T) -> Self {
        Self::new(value, true, None)
    }

    /// Creates an infeasible solution. `violation` measures how far the
    /// solution is from feasibility; smaller is better.
    #[inline]
    pub fn infeasible(violation: T) -> Self {
        Self::new(violation, false, None)
    }

    /// Attaches payload data to the solution.
    #[inline]
    pub fn with_data(mut self, data: D) -> Self {
        self.data = Some(data);
        self
    }

    /// The objective value, or the degree of infeasibility if the solution is infeasible.
    #[inline]
    pub fn value(&self) -> T {
        self.value
    }

    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.is_feasible
    }

    #[inline]
    pub fn is_infeasible(&self) -> bool {
        !self.is_feasible
    }

    /// The payload attached by the problem, if any.
    #[inline]
    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    /// Consumes the solution and returns its payload.
    #[inline]
    pub fn into_data(self) -> Option<D> {
        self.data
    }

    /// Compares two solutions by quality. `Ordering::Less` means `self` is better.
    ///
    /// Feasibility is compared first, the value second. Payloads are ignored.
    #[inline]
    pub fn cmp_quality<E>(&self, other: &Solution<T, E>) -> Ordering {
        match (self.is_feasible, other.is_feasible) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => self
                .value
                .partial_cmp(&other.value)
                .unwrap_or(Ordering::Equal),
        }
    }

    /// Returns `true` if `self` is strictly better than `other`.
    #[inline]
    pub fn is_better_than<E>(&self, other: &Solution<T, E>) -> bool {
        self.cmp_quality(other) == Ordering::Less
    }
}

impl<T, D> std::fmt::Display for Solution<T, D>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_feasible {
            write!(f, "Solution(value={})", self.value)
        } else {
            write!(f, "Solution(infeasible={})", self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Sol = Solution<f64>;

    #[test]
    fn test_feasible_beats_infeasible_regardless_of_value() {
        let feasible = Sol::feasible(1_000.0);
        let infeasible = Sol::infeasible(-1_000.0);
        assert!(feasible.is_better_than(&infeasible));
        assert!(!infeasible.is_better_than(&feasible));
        assert_eq!(infeasible.cmp_quality(&feasible), Ordering::Greater);
    }

    #[test]
    fn test_lower_value_wins_among_feasible() {
        let a = Sol::feasible(-7.0);
        let b = Sol::feasible(-5.0);
        assert!(a.is_better_than(&b));
        assert_eq!(a.cmp_quality(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn test_lower_violation_wins_among_infeasible() {
        let a = Sol::infeasible(1.0);
        let b = Sol::infeasible(3.0);
        assert!(a.is_better_than(&b));
        assert!(!b.is_better_than(&a));
    }

    #[test]
    fn test_equal_solutions_are_not_better() {
        let a = Sol::feasible(2.0);
        let b = Sol::feasible(2.0);
        assert!(!a.is_better_than(&b));
        assert!(!b.is_better_than(&a));
    }

    #[test]
    fn test_comparison_ignores_payload_type() {
        let a: Solution<f64, Vec<usize>> = Solution::feasible(1.0).with_data(vec![1, 2]);
        let b: Solution<f64, &str> = Solution::feasible(2.0).with_data("other");
        assert!(a.is_better_than(&b));
    }

    #[test]
    fn test_data_accessors() {
        let sol: Solution<f64, Vec<u8>> = Solution::feasible(0.0).with_data(vec![9]);
        assert_eq!(sol.data(), Some(&vec![9]));
        assert_eq!(sol.into_data(), Some(vec![9]));

        let bare = Sol::infeasible(2.0);
        assert!(bare.data().is_none());
        assert!(bare.is_infeasible());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Sol::feasible(-7.0)), "Solution(value=-7)");
        assert_eq!(format!("{}", Sol::infeasible(2.5)), "Solution(infeasible=2.5)");
    }

    #[test]
    fn test_nan_value_is_reported_invalid() {
        assert!(!Sol::feasible(f64::NAN).has_valid_value());
        assert!(Sol::infeasible(f64::INFINITY).has_valid_value());
    }
}
