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

//! Tracking of best and worst solution values.
//!
//! `SolutionTracker<T>` observes every solution produced during a search and
//! keeps the best and worst value seen separately for feasible and infeasible
//! solutions, together with their counts. Selection policies use these ranges
//! to normalize objective values into exploitation scores, and solvers use
//! the return value of `observe` to detect a new overall best.
//!
//! The tracker stores values only. Holding on to the solutions themselves is
//! the solver's business.

use crate::solution::Solution;
use canopy_core::num::ObjectiveValue;
use log::debug;

/// The best and worst value observed within one feasibility class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange<T> {
    pub best: T,
    pub worst: T,
}

impl<T> ValueRange<T>
where
    T: ObjectiveValue,
{
    #[inline]
    fn singleton(value: T) -> Self {
        Self {
            best: value,
            worst: value,
        }
    }

    /// The width of the range, `worst - best`.
    #[inline]
    pub fn width(&self) -> T {
        self.worst - self.best
    }
}

/// Tracks value ranges and counts of feasible and infeasible solutions.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionTracker<T> {
    feasible: Option<ValueRange<T>>,
    infeasible: Option<ValueRange<T>>,
    feasible_count: u64,
    infeasible_count: u64,
}

impl<T> Default for SolutionTracker<T>
where
    T: ObjectiveValue,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SolutionTracker<T>
where
    T: ObjectiveValue,
{
    /// Creates a tracker that has not seen any solution.
    #[inline]
    pub fn new() -> Self {
        Self {
            feasible: None,
            infeasible: None,
            feasible_count: 0,
            infeasible_count: 0,
        }
    }

    /// Records `solution` and returns `true` if it is a new best overall,
    /// i.e. strictly better than every solution observed before it.
    pub fn observe<D>(&mut self, solution: &Solution<T, D>) -> bool {
        let value = solution.value();
        if solution.is_feasible() {
            self.feasible_count += 1;
            Self::absorb(&mut self.feasible, value, "feasible")
        } else {
            self.infeasible_count += 1;
            let improved = Self::absorb(&mut self.infeasible, value, "infeasible");
            improved && self.feasible.is_none()
        }
    }

    /// Widens `range` with `value`, returning `true` if `value` became the new best.
    #[inline]
    fn absorb(range: &mut Option<ValueRange<T>>, value: T, class: &str) -> bool {
        match range {
            None => {
                debug!("First {} solution: {}", class, value);
                *range = Some(ValueRange::singleton(value));
                true
            }
            Some(r) => {
                let mut improved = false;
                if value < r.best {
                    debug!("New best {} solution: {} -> {}", class, r.best, value);
                    r.best = value;
                    improved = true;
                }
                if value > r.worst {
                    debug!("New worst {} solution: {} -> {}", class, r.worst, value);
                    r.worst = value;
                }
                improved
            }
        }
    }

    /// The value range of feasible solutions, if any was observed.
    #[inline]
    pub fn feasible_range(&self) -> Option<ValueRange<T>> {
        self.feasible
    }

    /// The violation range of infeasible solutions, if any was observed.
    #[inline]
    pub fn infeasible_range(&self) -> Option<ValueRange<T>> {
        self.infeasible
    }

    /// The range matching the given feasibility class.
    #[inline]
    pub fn range_for(&self, is_feasible: bool) -> Option<ValueRange<T>> {
        if is_feasible {
            self.feasible
        } else {
            self.infeasible
        }
    }

    #[inline]
    pub fn feasible_count(&self) -> u64 {
        self.feasible_count
    }

    #[inline]
    pub fn infeasible_count(&self) -> u64 {
        self.infeasible_count
    }

    /// Total number of solutions observed.
    #[inline]
    pub fn count(&self) -> u64 {
        self.feasible_count + self.infeasible_count
    }

    /// Fraction of observed solutions that were feasible, `None` before the first one.
    #[inline]
    pub fn feasible_ratio(&self) -> Option<f64> {
        let total = self.count();
        if total == 0 {
            None
        } else {
            Some(self.feasible_count as f64 / total as f64)
        }
    }
}

impl<T> std::fmt::Display for SolutionTracker<T>
where
    T: ObjectiveValue,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total = self.count();
        if total == 0 {
            return write!(f, "no solutions");
        }
        let mut parts = Vec::with_capacity(2);
        if let Some(r) = self.feasible {
            parts.push(format!(
                "feas[b={}, w={}, c={}/{}]",
                r.best, r.worst, self.feasible_count, total
            ));
        }
        if let Some(r) = self.infeasible {
            parts.push(format!(
                "infeas[b={}, w={}, c={}/{}]",
                r.best, r.worst, self.infeasible_count, total
            ));
        }
        write!(f, "{}", parts.join("  "))
    }
}
