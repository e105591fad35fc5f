//! Configuration for one flow execution.

use serde::{Deserialize, Serialize};
use state_diff::DiffPolicy;

/// Knobs for the action loop.
///
/// Each page interaction carries its own deadline rather than one global
/// iteration timeout; that keeps the skip-vs-abort distinction intact
/// (a slow visibility check skips one action, it does not kill the flow).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowLoopConfig {
    /// Maximum iterations before the flow ends as `max_steps_reached`.
    pub max_steps: u32,

    /// Cap on candidates per scan.
    pub max_actions: usize,

    /// Fixed settle pause after an action, before re-reading state.
    pub settle_ms: u64,

    /// Deadline for the initial navigation to the start URL.
    pub navigation_timeout_ms: u64,

    /// Deadline for the pre-click visibility confirmation.
    pub visibility_timeout_ms: u64,

    /// Deadline for the click itself.
    pub click_timeout_ms: u64,

    /// Deadline for fill (type) actions.
    pub fill_timeout_ms: u64,

    /// Deadline for full-page screenshots.
    pub screenshot_timeout_ms: u64,

    /// Change-score cutoffs for the per-transition diff.
    pub diff: DiffPolicy,
}

impl Default for FlowLoopConfig {
    fn default() -> Self {
        Self {
            max_steps: 15,
            max_actions: 20,
            settle_ms: 1_000,
            navigation_timeout_ms: 30_000,
            visibility_timeout_ms: 5_000,
            click_timeout_ms: 10_000,
            fill_timeout_ms: 10_000,
            screenshot_timeout_ms: 15_000,
            diff: DiffPolicy::default(),
        }
    }
}

impl FlowLoopConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small, fast preset for tests.
    pub fn minimal() -> Self {
        Self {
            max_steps: 3,
            max_actions: 10,
            settle_ms: 0,
            navigation_timeout_ms: 2_000,
            visibility_timeout_ms: 200,
            click_timeout_ms: 500,
            fill_timeout_ms: 500,
            screenshot_timeout_ms: 1_000,
            diff: DiffPolicy::default(),
        }
    }

    /// Builder: set max iterations.
    pub fn max_steps(mut self, steps: u32) -> Self {
        self.max_steps = steps;
        self
    }

    /// Builder: set the per-scan candidate cap.
    pub fn max_actions(mut self, count: usize) -> Self {
        self.max_actions = count;
        self
    }

    /// Builder: set the settle pause.
    pub fn settle_ms(mut self, ms: u64) -> Self {
        self.settle_ms = ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = FlowLoopConfig::default();
        assert_eq!(config.max_steps, 15);
        assert_eq!(config.max_actions, 20);
        assert_eq!(config.settle_ms, 1_000);
    }

    #[test]
    fn builder_chains() {
        let config = FlowLoopConfig::new().max_steps(3).max_actions(5).settle_ms(0);
        assert_eq!(config.max_steps, 3);
        assert_eq!(config.max_actions, 5);
        assert_eq!(config.settle_ms, 0);
    }
}
