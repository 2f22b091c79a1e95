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

//! # Time Limit Monitor
//!
//! Enforces a wall-clock budget on the search. By default the clock is read
//! before every step; a step of Monte Carlo tree search (select, expand,
//! simulate, backpropagate) is expensive enough that this costs nothing
//! noticeable. For very cheap steps a bitmask filter reduces clock reads:
//! with mask `m` the clock is read only when `(steps & m) == 0`.
//!
//! The budget is compared against the elapsed time, nothing ever sleeps, and
//! a step that is already running is never interrupted.

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};
use crate::solution::Solution;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLimitMonitor {
    clock_check_mask: u64,
    steps: u64,
    time_limit: Duration,
    start_time: Instant,
}

impl TimeLimitMonitor {
    /// Default mask: read the clock before every step.
    const DEFAULT_STEP_CLOCK_CHECK_MASK: u64 = 0;

    #[inline]
    pub fn new(time_limit: Duration) -> Self {
        Self::with_clock_check_mask(time_limit, Self::DEFAULT_STEP_CLOCK_CHECK_MASK)
    }

    #[inline]
    pub fn with_clock_check_mask(time_limit: Duration, clock_check_mask: u64) -> Self {
        Self {
            clock_check_mask,
            steps: 0,
            time_limit,
            start_time: Instant::now(),
        }
    }

    /// The configured budget.
    #[inline]
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }
}

impl<T, D> SearchMonitor<T, D> for TimeLimitMonitor {
    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }

    fn on_enter_search(&mut self) {
        self.start_time = Instant::now();
        self.steps = 0;
    }

    fn on_exit_search(&mut self) {}

    fn on_solution_found(&mut self, _solution: &Solution<T, D>) {}

    #[inline(always)]
    fn on_step(&mut self) {
        self.steps = self.steps.wrapping_add(1);
    }

    #[inline(always)]
    fn search_command(&self) -> SearchCommand {
        if (self.steps & self.clock_check_mask) == 0 && self.start_time.elapsed() >= self.time_limit
        {
            return SearchCommand::Terminate(format!(
                "time limit of {:.3}s reached",
                self.time_limit.as_secs_f64()
            ));
        }
        SearchCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Monitor = dyn SearchMonitor<f64, ()>;

    fn command(mon: &TimeLimitMonitor) -> SearchCommand {
        (mon as &Monitor).search_command()
    }

    #[test]
    fn test_default_mask_checks_every_step() {
        assert_eq!(TimeLimitMonitor::DEFAULT_STEP_CLOCK_CHECK_MASK, 0);
        let mut mon = TimeLimitMonitor::new(Duration::from_millis(1));
        mon.start_time = Instant::now() - Duration::from_millis(50);
        mon.steps = 12345;
        assert!(matches!(command(&mon), SearchCommand::Terminate(_)));
    }

    #[test]
    fn test_terminates_after_time_limit() {
        let mut mon = TimeLimitMonitor::new(Duration::from_millis(10));
        mon.start_time = Instant::now() - Duration::from_millis(50);
        match command(&mon) {
            SearchCommand::Terminate(msg) => {
                assert!(msg.contains("time limit"), "unexpected message: {msg}");
            }
            other => panic!("expected Terminate, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_limit_terminates_immediately() {
        let mon = TimeLimitMonitor::new(Duration::ZERO);
        assert!(matches!(command(&mon), SearchCommand::Terminate(_)));
    }

    #[test]
    fn test_continues_before_time_limit() {
        let mon = TimeLimitMonitor::new(Duration::from_secs(3600));
        assert_eq!(command(&mon), SearchCommand::Continue);
    }

    #[test]
    fn test_mask_skips_clock_reads_between_checkpoints() {
        let mut mon = TimeLimitMonitor::with_clock_check_mask(Duration::from_millis(1), 0x3);
        mon.start_time = Instant::now() - Duration::from_millis(50);

        for s in [1u64, 2, 3, 5, 6, 7] {
            mon.steps = s;
            assert_eq!(command(&mon), SearchCommand::Continue, "steps={s}");
        }
        for s in [0u64, 4, 8] {
            mon.steps = s;
            assert!(
                matches!(command(&mon), SearchCommand::Terminate(_)),
                "steps={s}"
            );
        }
    }

    #[test]
    fn test_on_enter_search_resets_clock_and_steps() {
        let mut mon = TimeLimitMonitor::new(Duration::from_millis(500));
        mon.start_time = Instant::now() - Duration::from_secs(10);
        mon.steps = 99;
        <TimeLimitMonitor as SearchMonitor<f64, ()>>::on_enter_search(&mut mon);
        assert_eq!(mon.steps, 0);
        assert_eq!(command(&mon), SearchCommand::Continue);
    }

    #[test]
    fn test_on_step_wraps() {
        let mut mon = TimeLimitMonitor::new(Duration::from_secs(1));
        mon.steps = u64::MAX;
        <TimeLimitMonitor as SearchMonitor<f64, ()>>::on_step(&mut mon);
        assert_eq!(mon.steps, 0);
    }
}
