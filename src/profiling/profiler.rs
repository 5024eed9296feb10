use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use crate::error::{ProfilerError, ProfilerResult};
use super::{
    clock::{Clock, MonotonicClock},
    observer::{ProfilerObserver, TimerEvent, TracingObserver},
    report::TimerReport,
    timer::Timer,
};

/// Named-timer capability shared by every profiler implementation.
pub trait TimerProfiler {
    /// Open the region `name`, pausing the currently innermost one.
    fn start_timer(&mut self, name: &str) -> ProfilerResult<()>;

    /// Close the region `name`, which must be the innermost open one, and
    /// resume its parent.
    fn end_timer(&mut self, name: &str) -> ProfilerResult<()>;

    /// Snapshot of every timer seen so far, in first-start order.
    fn timers(&self) -> TimerReport;
}

/// Hierarchical self-time profiler.
///
/// Keeps a stack of open timers, outermost first. Only the innermost one is
/// ever accumulating: starting a timer pauses the current top, ending one
/// resumes the new top. Each timer therefore collects exclusive time only.
///
/// A profiler models a single logical call stack. Give each thread its own.
pub struct Profiler<C: Clock = MonotonicClock> {
    clock: C,
    timers: Vec<Timer>,
    index: HashMap<String, usize>,
    active: Vec<usize>,
    observer: Box<dyn ProfilerObserver>,
}

impl Profiler<MonotonicClock> {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for Profiler<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Profiler<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            timers: Vec::new(),
            index: HashMap::new(),
            active: Vec::new(),
            observer: Box::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl ProfilerObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn start_timer(&mut self, name: &str) -> ProfilerResult<()> {
        let existing = self.index.get(name).copied();
        if let Some(idx) = existing {
            if self.active.contains(&idx) {
                return Err(ProfilerError::already_active(name));
            }
        }

        let now = self.clock.now();
        if let Some(&top) = self.active.last() {
            self.pause(top, now);
        }

        let idx = match existing {
            Some(idx) => idx,
            None => self.register(name),
        };
        self.active.push(idx);
        self.timers[idx].begin_activation(now, true);
        self.observer.on_event(&TimerEvent::Started { name: name.to_string() });

        debug_assert!(self.holds_single_runner());
        Ok(())
    }

    pub fn end_timer(&mut self, name: &str) -> ProfilerResult<()> {
        let idx = *self
            .index
            .get(name)
            .ok_or_else(|| ProfilerError::unknown_timer(name))?;

        let top = self.active.last().copied();
        if top != Some(idx) {
            let innermost = top.map(|top| self.timers[top].name());
            return Err(ProfilerError::out_of_order(name, innermost));
        }

        let now = self.clock.now();
        let timer = &mut self.timers[idx];
        let elapsed = timer.end_activation(now);
        let total = timer.duration();
        self.active.pop();
        self.observer.on_event(&TimerEvent::Stopped {
            name: name.to_string(),
            elapsed,
            total,
        });

        if let Some(&parent) = self.active.last() {
            self.resume(parent, now);
        }

        debug_assert!(self.holds_single_runner());
        Ok(())
    }

    /// Run `f` inside a `name` region and return its value.
    ///
    /// Timers started inside `f` must be ended inside `f`, otherwise the
    /// closing `end_timer` fails with `OutOfOrderEnd`.
    pub fn measure<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> R) -> ProfilerResult<R> {
        self.start_timer(name)?;
        let value = f(self);
        self.end_timer(name)?;
        Ok(value)
    }

    pub fn timers(&self) -> TimerReport {
        let mut report = TimerReport::new();
        for timer in &self.timers {
            report.push(timer.name(), timer.snapshot());
        }
        report
    }

    pub fn timer(&self, name: &str) -> Option<&Timer> {
        self.index.get(name).map(|&idx| &self.timers[idx])
    }

    /// Names of the open timers, outermost first.
    pub fn active_timers(&self) -> Vec<&str> {
        self.active.iter().map(|&idx| self.timers[idx].name()).collect()
    }

    /// The timer currently accumulating time, if any.
    pub fn running_timer(&self) -> Option<&str> {
        self.active.last().map(|&idx| self.timers[idx].name())
    }

    pub fn depth(&self) -> usize {
        self.active.len()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Forget every timer and open region. Clock and observer are kept.
    pub fn reset(&mut self) {
        self.timers.clear();
        self.index.clear();
        self.active.clear();
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn register(&mut self, name: &str) -> usize {
        let idx = self.timers.len();
        self.timers.push(Timer::new(name));
        self.index.insert(name.to_string(), idx);
        idx
    }

    fn pause(&mut self, idx: usize, now: Duration) {
        let timer = &mut self.timers[idx];
        let elapsed = timer.end_activation(now);
        let event = TimerEvent::Paused {
            name: timer.name().to_string(),
            elapsed,
            total: timer.duration(),
        };
        self.observer.on_event(&event);
    }

    fn resume(&mut self, idx: usize, now: Duration) {
        let timer = &mut self.timers[idx];
        timer.begin_activation(now, false);
        let event = TimerEvent::Resumed {
            name: timer.name().to_string(),
        };
        self.observer.on_event(&event);
    }

    fn holds_single_runner(&self) -> bool {
        let running: Vec<usize> = (0..self.timers.len())
            .filter(|&idx| self.timers[idx].is_running())
            .collect();
        match self.active.last() {
            Some(&top) => running == [top],
            None => running.is_empty(),
        }
    }
}

impl<C: Clock> TimerProfiler for Profiler<C> {
    fn start_timer(&mut self, name: &str) -> ProfilerResult<()> {
        Profiler::start_timer(self, name)
    }

    fn end_timer(&mut self, name: &str) -> ProfilerResult<()> {
        Profiler::end_timer(self, name)
    }

    fn timers(&self) -> TimerReport {
        Profiler::timers(self)
    }
}

impl<C: Clock> fmt::Debug for Profiler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profiler")
            .field("clock", &self.clock)
            .field("timers", &self.timers)
            .field("active", &self.active_timers())
            .finish_non_exhaustive()
    }
}

/// Profiler that measures nothing, for builds where profiling is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProfiler;

impl TimerProfiler for NoopProfiler {
    fn start_timer(&mut self, _name: &str) -> ProfilerResult<()> {
        Ok(())
    }

    fn end_timer(&mut self, _name: &str) -> ProfilerResult<()> {
        Ok(())
    }

    fn timers(&self) -> TimerReport {
        TimerReport::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::profiling::{
        clock::ManualClock,
        observer::RecordingObserver,
        workload::{reference_expectation, run_reference_workload},
    };

    fn manual_profiler() -> (Profiler<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let profiler = Profiler::with_clock(clock.clone());
        (profiler, clock)
    }

    fn running_count<C: Clock>(profiler: &Profiler<C>) -> usize {
        profiler.timers.iter().filter(|t| t.is_running()).count()
    }

    #[test]
    fn test_reference_scenario() {
        let (mut profiler, clock) = manual_profiler();

        run_reference_workload(&mut profiler, &mut |d| clock.advance(d)).unwrap();

        let report = profiler.timers();
        assert_eq!(report.names(), vec!["main", "doLoop", "processItem"]);
        assert_eq!(report.get("processItem").unwrap().count, 10);
        assert_eq!(report.get("processItem").unwrap().duration, 10.0);
        assert_eq!(report.get("doLoop").unwrap().count, 2);
        assert_eq!(report.get("doLoop").unwrap().duration, 5.0);
        assert_eq!(report.get("main").unwrap().count, 1);
        assert_eq!(report.get("main").unwrap().duration, 1.2);
        assert!(profiler.is_idle());

        for (name, expected) in reference_expectation() {
            assert_eq!(report.get(name), Some(&expected), "timer {}", name);
        }
    }

    #[test]
    fn test_only_innermost_timer_runs() {
        let (mut profiler, clock) = manual_profiler();

        profiler.start_timer("a").unwrap();
        assert_eq!(running_count(&profiler), 1);
        profiler.start_timer("b").unwrap();
        profiler.start_timer("c").unwrap();
        assert_eq!(running_count(&profiler), 1);
        assert_eq!(profiler.running_timer(), Some("c"));
        assert!(!profiler.timer("a").unwrap().is_running());

        clock.advance_secs(1.0);
        profiler.end_timer("c").unwrap();
        assert_eq!(running_count(&profiler), 1);
        assert_eq!(profiler.running_timer(), Some("b"));

        profiler.end_timer("b").unwrap();
        profiler.end_timer("a").unwrap();
        assert_eq!(running_count(&profiler), 0);
        assert_eq!(profiler.running_timer(), None);
    }

    #[test]
    fn test_parent_excludes_descendants() {
        let (mut profiler, clock) = manual_profiler();

        profiler.start_timer("parent").unwrap();
        clock.advance_secs(0.5);
        profiler.start_timer("child").unwrap();
        clock.advance_secs(2.0);
        profiler.start_timer("grandchild").unwrap();
        clock.advance_secs(4.0);
        profiler.end_timer("grandchild").unwrap();
        clock.advance_secs(1.0);
        profiler.end_timer("child").unwrap();
        clock.advance_secs(0.25);
        profiler.end_timer("parent").unwrap();

        assert_eq!(profiler.timer("parent").unwrap().duration(), Duration::from_millis(750));
        assert_eq!(profiler.timer("child").unwrap().duration(), Duration::from_secs(3));
        assert_eq!(profiler.timer("grandchild").unwrap().duration(), Duration::from_secs(4));
    }

    #[test]
    fn test_pauses_do_not_count_as_activations() {
        let (mut profiler, _clock) = manual_profiler();

        profiler.start_timer("outer").unwrap();
        for _ in 0..25 {
            profiler.start_timer("inner").unwrap();
            profiler.end_timer("inner").unwrap();
        }
        profiler.end_timer("outer").unwrap();

        let report = profiler.timers();
        assert_eq!(report.get("outer").unwrap().count, 1);
        assert_eq!(report.get("inner").unwrap().count, 25);
    }

    #[test]
    fn test_snapshot_is_stable_without_calls() {
        let (mut profiler, clock) = manual_profiler();

        profiler.start_timer("main").unwrap();
        clock.advance_secs(1.0);
        profiler.start_timer("io").unwrap();
        clock.advance_secs(0.3);

        let first = profiler.timers();
        clock.advance_secs(5.0);
        let second = profiler.timers();
        assert_eq!(first, second);
    }

    #[test]
    fn test_snapshot_excludes_open_segment() {
        let (mut profiler, clock) = manual_profiler();

        profiler.start_timer("main").unwrap();
        clock.advance_secs(1.0);
        profiler.start_timer("io").unwrap();
        clock.advance_secs(0.3);

        let report = profiler.timers();
        assert_eq!(report.get("main").unwrap().duration, 1.0);
        assert_eq!(report.get("io").unwrap().duration, 0.0);
        assert_eq!(report.get("io").unwrap().count, 1);
        assert_eq!(profiler.active_timers(), vec!["main", "io"]);
    }

    #[test]
    fn test_unknown_timer() {
        let (mut profiler, _clock) = manual_profiler();

        let err = profiler.end_timer("x").unwrap_err();
        assert_eq!(err, ProfilerError::unknown_timer("x"));
        assert_eq!(err.code(), ErrorCode::UnknownTimer);
        assert!(profiler.timers().is_empty());
    }

    #[test]
    fn test_out_of_order_end_leaves_state_untouched() {
        let (mut profiler, clock) = manual_profiler();

        profiler.start_timer("main").unwrap();
        clock.advance_secs(1.0);
        profiler.start_timer("doLoop").unwrap();
        clock.advance_secs(2.0);

        let before = profiler.timers();
        let err = profiler.end_timer("main").unwrap_err();
        assert_eq!(err, ProfilerError::out_of_order("main", Some("doLoop")));
        assert_eq!(profiler.active_timers(), vec!["main", "doLoop"]);
        assert_eq!(profiler.running_timer(), Some("doLoop"));
        assert_eq!(profiler.timers(), before);

        // the caller may still unwind in the right order
        profiler.end_timer("doLoop").unwrap();
        profiler.end_timer("main").unwrap();
        assert_eq!(profiler.timers().get("doLoop").unwrap().duration, 2.0);
        assert_eq!(profiler.timers().get("main").unwrap().duration, 1.0);
    }

    #[test]
    fn test_end_after_close_is_out_of_order() {
        let (mut profiler, _clock) = manual_profiler();

        profiler.start_timer("main").unwrap();
        profiler.end_timer("main").unwrap();

        let err = profiler.end_timer("main").unwrap_err();
        assert_eq!(err, ProfilerError::out_of_order("main", None));
        assert_eq!(profiler.timers().get("main").unwrap().count, 1);
    }

    #[test]
    fn test_reentrant_start_is_rejected() {
        let (mut profiler, clock) = manual_profiler();

        profiler.start_timer("doLoop").unwrap();
        profiler.start_timer("processItem").unwrap();
        clock.advance_secs(1.0);

        let err = profiler.start_timer("doLoop").unwrap_err();
        assert_eq!(err, ProfilerError::already_active("doLoop"));
        assert_eq!(profiler.active_timers(), vec!["doLoop", "processItem"]);
        assert_eq!(profiler.running_timer(), Some("processItem"));

        profiler.end_timer("processItem").unwrap();
        assert_eq!(profiler.timers().get("processItem").unwrap().duration, 1.0);
        assert_eq!(profiler.timers().get("doLoop").unwrap().count, 1);
    }

    #[test]
    fn test_observer_sees_every_transition() {
        let clock = ManualClock::new();
        let recorder = RecordingObserver::new();
        let mut profiler = Profiler::with_clock(clock.clone()).with_observer(recorder.clone());

        profiler.start_timer("main").unwrap();
        clock.advance_secs(1.0);
        profiler.start_timer("child").unwrap();
        clock.advance_secs(2.0);
        profiler.end_timer("child").unwrap();
        profiler.end_timer("main").unwrap();

        let secs = Duration::from_secs;
        assert_eq!(
            recorder.events(),
            vec![
                TimerEvent::Started { name: "main".into() },
                TimerEvent::Paused { name: "main".into(), elapsed: secs(1), total: secs(1) },
                TimerEvent::Started { name: "child".into() },
                TimerEvent::Stopped { name: "child".into(), elapsed: secs(2), total: secs(2) },
                TimerEvent::Resumed { name: "main".into() },
                TimerEvent::Stopped { name: "main".into(), elapsed: secs(0), total: secs(1) },
            ]
        );
    }

    #[test]
    fn test_measure_returns_closure_value() {
        let (mut profiler, clock) = manual_profiler();

        let value = profiler
            .measure("outer", |p| {
                clock.advance_secs(1.0);
                p.measure("inner", |_| {
                    clock.advance_secs(2.0);
                    42
                })
            })
            .unwrap()
            .unwrap();

        assert_eq!(value, 42);
        assert_eq!(profiler.timers().get("outer").unwrap().duration, 1.0);
        assert_eq!(profiler.timers().get("inner").unwrap().duration, 2.0);
    }

    #[test]
    fn test_measure_with_leaked_child_fails() {
        let (mut profiler, _clock) = manual_profiler();

        let err = profiler
            .measure("outer", |p| p.start_timer("leak"))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::OutOfOrderEnd);
        assert_eq!(profiler.active_timers(), vec!["outer", "leak"]);
    }

    #[test]
    fn test_reset() {
        let (mut profiler, _clock) = manual_profiler();

        profiler.start_timer("main").unwrap();
        profiler.start_timer("child").unwrap();
        profiler.reset();

        assert!(profiler.is_idle());
        assert_eq!(profiler.depth(), 0);
        assert!(profiler.timers().is_empty());
        assert!(profiler.timer("main").is_none());

        profiler.start_timer("main").unwrap();
        profiler.end_timer("main").unwrap();
        assert_eq!(profiler.timers().get("main").unwrap().count, 1);
    }

    #[test]
    fn test_dyn_dispatch_and_noop() {
        let clock = ManualClock::new();
        let mut profilers: Vec<Box<dyn TimerProfiler>> = vec![
            Box::new(Profiler::with_clock(clock.clone())),
            Box::new(NoopProfiler),
        ];

        for profiler in profilers.iter_mut() {
            profiler.start_timer("main").unwrap();
            clock.advance_secs(0.5);
            profiler.end_timer("main").unwrap();
        }

        assert_eq!(profilers[0].timers().get("main").unwrap().duration, 0.5);
        assert!(profilers[1].timers().is_empty());
        assert!(NoopProfiler.end_timer("never-started").is_ok());
    }
}
