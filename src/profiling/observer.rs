//! Timer lifecycle events and their observers

use std::sync::Arc;
use std::time::Duration;
use parking_lot::Mutex;
use tracing::{debug, info};

/// Lifecycle transition of a single timer.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    /// A new top-level activation began
    Started { name: String },
    /// The timer stopped accumulating because a nested timer started
    Paused { name: String, elapsed: Duration, total: Duration },
    /// The nested timer ended and this one is innermost again
    Resumed { name: String },
    /// The activation ended
    Stopped { name: String, elapsed: Duration, total: Duration },
}

impl TimerEvent {
    pub fn name(&self) -> &str {
        match self {
            TimerEvent::Started { name }
            | TimerEvent::Paused { name, .. }
            | TimerEvent::Resumed { name }
            | TimerEvent::Stopped { name, .. } => name,
        }
    }
}

/// Receives every timer transition made by a `Profiler`.
pub trait ProfilerObserver {
    fn on_event(&mut self, event: &TimerEvent);
}

/// Logs transitions through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ProfilerObserver for TracingObserver {
    fn on_event(&mut self, event: &TimerEvent) {
        match event {
            TimerEvent::Started { name } => info!(timer = %name, "Start timer"),
            TimerEvent::Paused { name, elapsed, total } => debug!(
                timer = %name,
                elapsed = elapsed.as_secs_f64(),
                total = total.as_secs_f64(),
                "Paused timer"
            ),
            TimerEvent::Resumed { name } => debug!(timer = %name, "Continue timer"),
            TimerEvent::Stopped { name, elapsed, total } => info!(
                timer = %name,
                elapsed = elapsed.as_secs_f64(),
                total = total.as_secs_f64(),
                "Stopped timer"
            ),
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ProfilerObserver for NullObserver {
    fn on_event(&mut self, _event: &TimerEvent) {}
}

/// Keeps events in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<TimerEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TimerEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl ProfilerObserver for RecordingObserver {
    fn on_event(&mut self, event: &TimerEvent) {
        self.events.lock().push(event.clone());
    }
}
