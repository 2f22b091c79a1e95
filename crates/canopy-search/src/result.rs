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

//! Why a search stopped.

/// The reason a solver terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// The search space was exhausted and the best solution is feasible,
    /// which proves it optimal.
    OptimalityProven,
    /// The search space was exhausted without finding a feasible solution.
    InfeasibilityProven,
    /// The solver aborted due to a search limit (time, iterations, interrupt).
    /// The string describes which limit fired.
    Aborted(String),
}

impl TerminationReason {
    /// Returns `true` if the search space was exhausted, i.e. the result is a proof.
    #[inline]
    pub fn is_proof(&self) -> bool {
        matches!(
            self,
            TerminationReason::OptimalityProven | TerminationReason::InfeasibilityProven
        )
    }

    /// Returns `true` if a limit stopped the search before it was exhausted.
    #[inline]
    pub fn is_aborted(&self) -> bool {
        matches!(self, TerminationReason::Aborted(_))
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::OptimalityProven => write!(f, "Optimality Proven"),
            TerminationReason::InfeasibilityProven => write!(f, "Infeasibility Proven"),
            TerminationReason::Aborted(reason) => write!(f, "Aborted: {}", reason),
        }
    }
}
