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

//! Solver configuration.
//!
//! `MctsConfig` is immutable once built. Limits left unset are unbounded; an
//! unset seed is drawn from the thread RNG when the search starts and is
//! logged and recorded in the statistics so the run can be replayed.

use crate::error::{MctsError, MctsResult};
use std::time::Duration;

/// The canonical UCT exploration constant `√2`.
pub const DEFAULT_EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// Validated parameters of a single search run.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    iter_limit: Option<u64>,
    time_limit: Option<Duration>,
    rng_seed: Option<u64>,
    exploration: f64,
    pruning: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iter_limit: None,
            time_limit: None,
            rng_seed: None,
            exploration: DEFAULT_EXPLORATION,
            pruning: true,
        }
    }
}

impl MctsConfig {
    /// Starts a builder with default settings.
    #[inline]
    pub fn builder() -> MctsConfigBuilder {
        MctsConfigBuilder::new()
    }

    /// Maximum number of iterations after the root simulation, `None` if unbounded.
    #[inline]
    pub fn iter_limit(&self) -> Option<u64> {
        self.iter_limit
    }

    /// Wall-clock budget, `None` if unbounded.
    #[inline]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    #[inline]
    pub fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }

    /// The exploration constant `C` of the UCT score.
    #[inline]
    pub fn exploration(&self) -> f64 {
        self.exploration
    }

    /// Whether node bounds are used to discard subtrees.
    #[inline]
    pub fn pruning(&self) -> bool {
        self.pruning
    }
}

impl std::fmt::Display for MctsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let iter_limit = self
            .iter_limit
            .map_or_else(|| "inf".to_string(), |n| n.to_string());
        let time_limit = self
            .time_limit
            .map_or_else(|| "inf".to_string(), |t| format!("{:.3}s", t.as_secs_f64()));
        let rng_seed = self
            .rng_seed
            .map_or_else(|| "random".to_string(), |s| s.to_string());
        write!(
            f,
            "MctsConfig(iter_limit: {}, time_limit: {}, rng_seed: {}, exploration: {}, pruning: {})",
            iter_limit, time_limit, rng_seed, self.exploration, self.pruning
        )
    }
}

/// Builder for `MctsConfig`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MctsConfigBuilder {
    config: MctsConfig,
}

impl MctsConfigBuilder {
    #[inline]
    pub fn new() -> Self {
        Self {
            config: MctsConfig::default(),
        }
    }

    #[inline]
    pub fn with_iter_limit(mut self, limit: u64) -> Self {
        self.config.iter_limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.config.time_limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.config.rng_seed = Some(seed);
        self
    }

    #[inline]
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.config.exploration = exploration;
        self
    }

    #[inline]
    pub fn with_pruning(mut self, pruning: bool) -> Self {
        self.config.pruning = pruning;
        self
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns `MctsError::InvalidConfig` if the exploration constant is
    /// negative, infinite or `NaN`.
    pub fn build(self) -> MctsResult<MctsConfig> {
        let exploration = self.config.exploration;
        if !exploration.is_finite() || exploration < 0.0 {
            return Err(MctsError::InvalidConfig(format!(
                "exploration constant must be finite and non-negative, got {}",
                exploration
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unbounded_with_pruning() {
        let config = MctsConfig::builder().build().unwrap();
        assert_eq!(config.iter_limit(), None);
        assert_eq!(config.time_limit(), None);
        assert_eq!(config.rng_seed(), None);
        assert_eq!(config.exploration(), DEFAULT_EXPLORATION);
        assert!(config.pruning());
    }

    #[test]
    fn test_builder_sets_every_field() {
        let config = MctsConfigBuilder::new()
            .with_iter_limit(100)
            .with_time_limit(Duration::from_millis(250))
            .with_rng_seed(7)
            .with_exploration(0.05)
            .with_pruning(false)
            .build()
            .unwrap();
        assert_eq!(config.iter_limit(), Some(100));
        assert_eq!(config.time_limit(), Some(Duration::from_millis(250)));
        assert_eq!(config.rng_seed(), Some(7));
        assert_eq!(config.exploration(), 0.05);
        assert!(!config.pruning());
    }

    #[test]
    fn test_invalid_exploration_is_rejected() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let err = MctsConfig::builder().with_exploration(bad).build();
            assert!(matches!(err, Err(MctsError::InvalidConfig(_))), "accepted {}", bad);
        }
    }

    #[test]
    fn test_zero_exploration_is_allowed() {
        assert!(MctsConfig::builder().with_exploration(0.0).build().is_ok());
    }

    #[test]
    fn test_display() {
        let config = MctsConfig::builder().with_iter_limit(3).build().unwrap();
        assert_eq!(
            config.to_string(),
            format!(
                "MctsConfig(iter_limit: 3, time_limit: inf, rng_seed: random, exploration: {}, pruning: true)",
                DEFAULT_EXPLORATION
            )
        );
    }
}
