//! Timer summaries produced by `Profiler::timers`

use std::time::Duration;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use crate::error::ProfilerResult;

/// Seconds rounded to millisecond precision.
pub fn round_millis(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 1000.0).round() / 1000.0
}

/// Reported statistics for one timer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    /// Number of completed or open top-level activations
    pub count: u64,
    /// Exclusive seconds, rounded to three decimals
    pub duration: f64,
}

impl TimerSnapshot {
    pub fn new(count: u64, accumulated: Duration) -> Self {
        Self {
            count,
            duration: round_millis(accumulated),
        }
    }
}

/// Snapshot of every timer, in first-start order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimerReport {
    entries: Vec<(String, TimerSnapshot)>,
}

impl TimerReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append without checking for an existing entry. Callers guarantee
    /// unique names.
    pub(crate) fn push(&mut self, name: &str, snapshot: TimerSnapshot) {
        self.entries.push((name.to_string(), snapshot));
    }

    /// Set the entry for `name`, keeping its position if it already exists.
    pub fn insert(&mut self, name: &str, snapshot: TimerSnapshot) {
        match self.entries.iter_mut().find(|(entry, _)| entry == name) {
            Some((_, existing)) => *existing = snapshot,
            None => self.entries.push((name.to_string(), snapshot)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TimerSnapshot> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, snapshot)| snapshot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TimerSnapshot)> {
        self.entries.iter().map(|(name, snapshot)| (name.as_str(), snapshot))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all reported self times. Each timer is already rounded, so
    /// this is the total of what is displayed, not of what was measured.
    pub fn total_duration(&self) -> f64 {
        let total: f64 = self.entries.iter().map(|(_, snapshot)| snapshot.duration).sum();
        (total * 1000.0).round() / 1000.0
    }

    /// Pretty JSON object keyed by timer name, in report order.
    pub fn to_json(&self) -> ProfilerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for TimerReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, snapshot) in &self.entries {
            map.serialize_entry(name, snapshot)?;
        }
        map.end()
    }
}

impl<'a> IntoIterator for &'a TimerReport {
    type Item = &'a (String, TimerSnapshot);
    type IntoIter = std::slice::Iter<'a, (String, TimerSnapshot)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
