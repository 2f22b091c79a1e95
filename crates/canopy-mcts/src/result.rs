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

use crate::statistics::MctsStatistics;
use canopy_core::num::ObjectiveValue;
use canopy_search::{result::TerminationReason, solution::Solution};
use std::time::Duration;

/// One improvement of the incumbent during a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncumbentRecord<T> {
    pub value: T,
    pub is_feasible: bool,
    /// Completed iterations when the solution was found, `0` for the root simulation.
    pub iteration: u64,
    pub elapsed: Duration,
}

impl<T> std::fmt::Display for IncumbentRecord<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_feasible { "value" } else { "infeasible" };
        write!(
            f,
            "[i={} t={:.3}s] {}={}",
            self.iteration,
            self.elapsed.as_secs_f64(),
            kind,
            self.value
        )
    }
}

/// Result of the solver after termination.
#[derive(Debug, Clone)]
pub struct MctsOutcome<T, D> {
    best: Solution<T, D>,
    termination_reason: TerminationReason,
    history: Vec<IncumbentRecord<T>>,
    statistics: MctsStatistics<T>,
}

impl<T, D> MctsOutcome<T, D>
where
    T: ObjectiveValue,
{
    /// The search space was exhausted and `best` is a proven optimum.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `best` is infeasible.
    #[inline]
    pub fn optimal(
        best: Solution<T, D>,
        history: Vec<IncumbentRecord<T>>,
        statistics: MctsStatistics<T>,
    ) -> Self {
        debug_assert!(
            best.is_feasible(),
            "called `MctsOutcome::optimal` with an infeasible best solution"
        );
        Self {
            best,
            termination_reason: TerminationReason::OptimalityProven,
            history,
            statistics,
        }
    }

    /// The search space was exhausted without a feasible solution.
    /// `best` is the least violated infeasible solution.
    #[inline]
    pub fn infeasible(
        best: Solution<T, D>,
        history: Vec<IncumbentRecord<T>>,
        statistics: MctsStatistics<T>,
    ) -> Self {
        Self {
            best,
            termination_reason: TerminationReason::InfeasibilityProven,
            history,
            statistics,
        }
    }

    #[inline]
    pub fn aborted<R>(
        best: Solution<T, D>,
        reason: R,
        history: Vec<IncumbentRecord<T>>,
        statistics: MctsStatistics<T>,
    ) -> Self
    where
        R: Into<String>,
    {
        Self {
            best,
            termination_reason: TerminationReason::Aborted(reason.into()),
            history,
            statistics,
        }
    }

    /// The best solution found.
    #[inline]
    pub fn best(&self) -> &Solution<T, D> {
        &self.best
    }

    /// Consumes the outcome and returns the best solution.
    #[inline]
    pub fn into_best(self) -> Solution<T, D> {
        self.best
    }

    /// `true` exactly when exhausting the tree proved the feasible best solution optimal.
    #[inline]
    pub fn is_opt(&self) -> bool {
        matches!(self.termination_reason, TerminationReason::OptimalityProven)
    }

    /// Returns the termination reason.
    #[inline]
    pub fn termination_reason(&self) -> &TerminationReason {
        &self.termination_reason
    }

    /// Every improvement of the incumbent, in the order found.
    #[inline]
    pub fn history(&self) -> &[IncumbentRecord<T>] {
        &self.history
    }

    /// Returns the solver statistics.
    #[inline]
    pub fn statistics(&self) -> &MctsStatistics<T> {
        &self.statistics
    }
}

impl<T, D> std::fmt::Display for MctsOutcome<T, D>
where
    T: ObjectiveValue,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Best:        {}", self.best)?;
        writeln!(f, "Optimal:     {}", self.is_opt())?;
        writeln!(f, "Termination: {}", self.termination_reason)?;
        writeln!(f, "Incumbents:")?;
        for record in &self.history {
            writeln!(f, "  {}", record)?;
        }
        write!(f, "{}", self.statistics)
    }
}
