//! Runtime configuration.

use std::time::Duration;

use ori_stack::DEFAULT_RECURSION_LIMIT;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum call depth per task.
    pub recursion_limit: usize,
    /// Longest a blocked task sleeps before re-checking its cancel flag.
    pub poll_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            poll_interval: Duration::from_millis(1),
        }
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_micros(50));
        self
    }
}
