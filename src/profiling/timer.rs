//! Exclusive-time accumulator for one named region

use std::time::Duration;
use super::report::TimerSnapshot;

/// Accumulated measurement for one region name.
///
/// A `Timer` never decides on its own when to run. The owning `Profiler`
/// drives it, and guarantees that `begin_activation` and `end_activation`
/// strictly alternate.
#[derive(Debug, Clone)]
pub struct Timer {
    name: String,
    accumulated: Duration,
    activations: u64,
    running_since: Option<Duration>,
}

impl Timer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accumulated: Duration::ZERO,
            activations: 0,
            running_since: None,
        }
    }

    /// Start accumulating from `now`. A resume after a nested pause passes
    /// `top_level = false` so it does not count as a new activation.
    ///
    /// # Panics
    ///
    /// Panics if the timer is already running.
    pub fn begin_activation(&mut self, now: Duration, top_level: bool) {
        assert!(
            self.running_since.is_none(),
            "timer '{}' activated while already running",
            self.name
        );
        self.running_since = Some(now);
        if top_level {
            self.activations += 1;
        }
    }

    /// Stop accumulating at `now` and return the segment just measured.
    ///
    /// # Panics
    ///
    /// Panics if the timer is not running.
    pub fn end_activation(&mut self, now: Duration) -> Duration {
        let since = self
            .running_since
            .take()
            .unwrap_or_else(|| panic!("timer '{}' stopped while not running", self.name));
        let elapsed = now.saturating_sub(since);
        self.accumulated += elapsed;
        elapsed
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::new(self.activations, self.accumulated)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> u64 {
        self.activations
    }

    /// Full-precision accumulated self time. Excludes a still-running segment.
    pub fn duration(&self) -> Duration {
        self.accumulated
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }
}
