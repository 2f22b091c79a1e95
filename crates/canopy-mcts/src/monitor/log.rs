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

use crate::monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor};
use crate::statistics::MctsStatistics;
use crate::tree::NodeIndex;
use canopy_core::num::ObjectiveValue;
use canopy_search::solution::Solution;
use log::info;
use std::time::{Duration, Instant};

/// Writes a progress table through `log::info!`.
///
/// A row is written on every new incumbent and, at most once per
/// `log_interval`, after iterations whose count matches `iteration_mask`.
#[derive(Debug, Clone)]
pub struct LogMonitor<T> {
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    iteration_mask: u64,
    best: Option<(T, bool)>,
}

impl<T> LogMonitor<T>
where
    T: ObjectiveValue,
{
    pub fn new(log_interval: Duration, iteration_mask: u64) -> Self {
        Self {
            start_time: Instant::now(),
            last_log_time: Instant::now(),
            log_interval,
            iteration_mask,
            best: None,
        }
    }

    #[inline(always)]
    fn should_log(&self, stats: &MctsStatistics<T>) -> bool {
        (stats.iterations & self.iteration_mask) == 0
            && self.last_log_time.elapsed() >= self.log_interval
    }

    #[inline(always)]
    fn log_header(&self) {
        info!(
            "{:<9} | {:<12} | {:<12} | {:<7} | {:<18} | {:<10}",
            "Elapsed", "Iterations", "Nodes", "Depth", "Best Solution", "Pruned"
        );
        info!("{}", "-".repeat(83));
    }

    #[inline(always)]
    fn log_line(&mut self, stats: &MctsStatistics<T>) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.start_time).as_secs_f32();

        let best_str = match &self.best {
            Some((value, true)) => format!("{}", value),
            Some((violation, false)) => format!("infeas({})", violation),
            None => "Inf".to_string(),
        };
        let elapsed_field = format!("{:.1}s", elapsed);

        info!(
            "{:<9} | {:<12} | {:<12} | {:<7} | {:<18} | {:<10}",
            elapsed_field,
            stats.iterations,
            stats.nodes_created,
            stats.max_depth,
            best_str,
            stats.prunings()
        );

        self.last_log_time = now;
    }
}

impl<T> Default for LogMonitor<T>
where
    T: ObjectiveValue,
{
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 1023)
    }
}

impl<T> std::fmt::Display for LogMonitor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LogMonitor(log_interval: {}s, iteration_mask: {})",
            self.log_interval.as_secs(),
            self.iteration_mask
        )
    }
}

impl<T, D> TreeSearchMonitor<T, D> for LogMonitor<T>
where
    T: ObjectiveValue,
{
    fn name(&self) -> &str {
        "LogMonitor"
    }

    fn on_enter_search(&mut self, _stats: &MctsStatistics<T>) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.best = None;
        self.log_header();
    }

    fn on_exit_search(&mut self, stats: &MctsStatistics<T>) {
        self.log_line(stats);
        info!("{}", "-".repeat(83));
        info!("Search finished.");
    }

    fn on_iteration(&mut self, stats: &MctsStatistics<T>) {
        if self.should_log(stats) {
            self.log_line(stats);
        }
    }

    fn on_select(&mut self, _node: NodeIndex, _depth: usize, _stats: &MctsStatistics<T>) {}

    fn on_expand(&mut self, _node: NodeIndex, _children: usize, _stats: &MctsStatistics<T>) {}

    fn on_prune(&mut self, _node: NodeIndex, _reason: PruneReason, _stats: &MctsStatistics<T>) {}

    fn on_simulation(
        &mut self,
        _node: NodeIndex,
        _solution: &Solution<T, D>,
        _stats: &MctsStatistics<T>,
    ) {
    }

    fn on_solution_found(&mut self, solution: &Solution<T, D>, stats: &MctsStatistics<T>) {
        self.best = Some((solution.value(), solution.is_feasible()));
        self.log_line(stats);
    }
}
