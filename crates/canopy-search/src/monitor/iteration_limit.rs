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

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};
use crate::solution::Solution;

/// A monitor that terminates the search once a number of steps has completed.
///
/// A limit of zero stops the search before its first step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationLimitMonitor {
    iteration_limit: u64,
    steps: u64,
}

impl IterationLimitMonitor {
    #[inline]
    pub fn new(iteration_limit: u64) -> Self {
        Self {
            iteration_limit,
            steps: 0,
        }
    }

    /// The number of steps completed since the search started.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    #[inline]
    fn reached_limit(&self) -> bool {
        self.steps >= self.iteration_limit
    }
}

impl<T, D> SearchMonitor<T, D> for IterationLimitMonitor {
    fn name(&self) -> &str {
        "IterationLimitMonitor"
    }

    fn on_enter_search(&mut self) {
        self.steps = 0;
    }

    fn on_exit_search(&mut self) {}

    fn on_solution_found(&mut self, _solution: &Solution<T, D>) {}

    #[inline(always)]
    fn on_step(&mut self) {
        self.steps = self.steps.saturating_add(1);
    }

    fn search_command(&self) -> SearchCommand {
        if self.reached_limit() {
            SearchCommand::Terminate(format!(
                "iteration limit of {} reached",
                self.iteration_limit
            ))
        } else {
            SearchCommand::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::IterationLimitMonitor;
    use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};

    type Monitor = dyn SearchMonitor<f64, ()>;

    #[test]
    fn test_continue_before_limit_and_terminate_at_limit() {
        let mut monitor = IterationLimitMonitor::new(3);
        let m: &mut Monitor = &mut monitor;
        m.on_enter_search();

        for _ in 0..3 {
            assert_eq!(m.search_command(), SearchCommand::Continue);
            m.on_step();
        }
        match m.search_command() {
            SearchCommand::Terminate(msg) => assert_eq!(msg, "iteration limit of 3 reached"),
            other => panic!("expected Terminate, got {:?}", other),
        }
        assert_eq!(monitor.steps(), 3);
    }

    #[test]
    fn test_zero_limit_terminates_before_first_step() {
        let monitor = IterationLimitMonitor::new(0);
        assert!(matches!(
            (&monitor as &Monitor).search_command(),
            SearchCommand::Terminate(_)
        ));
    }

    #[test]
    fn test_enter_search_resets_counter() {
        let mut monitor = IterationLimitMonitor::new(1);
        let m: &mut Monitor = &mut monitor;
        m.on_step();
        assert!(matches!(m.search_command(), SearchCommand::Terminate(_)));
        m.on_enter_search();
        assert_eq!(m.search_command(), SearchCommand::Continue);
    }
}
