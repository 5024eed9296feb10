//! Reference nested workload used by the demo, tests and benchmarks

use std::time::Duration;
use crate::error::ProfilerResult;
use super::{profiler::TimerProfiler, report::TimerSnapshot};

pub const ITEMS: usize = 10;

/// Drive `profiler` through the reference call pattern:
///
/// ```text
/// main                1.0s
///   doLoop            3.0s
///     processItem x10 1.0s each
///   doLoop            2.0s
/// main                0.2s
///   doLoop            ~0s
/// ```
///
/// `wait` stands in for the work done inside each region. Pass a sleeping
/// closure for a real run or one that advances a `ManualClock` for a
/// simulated one.
pub fn run_reference_workload(
    profiler: &mut dyn TimerProfiler,
    wait: &mut dyn FnMut(Duration),
) -> ProfilerResult<()> {
    profiler.start_timer("main")?;
    wait(Duration::from_secs(1));

    profiler.start_timer("doLoop")?;
    wait(Duration::from_secs(3));
    for _ in 0..ITEMS {
        profiler.start_timer("processItem")?;
        wait(Duration::from_secs(1));
        profiler.end_timer("processItem")?;
    }
    wait(Duration::from_secs(2));
    profiler.end_timer("doLoop")?;

    wait(Duration::from_millis(200));

    profiler.start_timer("doLoop")?;
    profiler.end_timer("doLoop")?;

    profiler.end_timer("main")
}

/// Expected report for `run_reference_workload`, in report order.
pub fn reference_expectation() -> Vec<(&'static str, TimerSnapshot)> {
    vec![
        ("main", TimerSnapshot { count: 1, duration: 1.2 }),
        ("doLoop", TimerSnapshot { count: 2, duration: 5.0 }),
        ("processItem", TimerSnapshot { count: ITEMS as u64, duration: 10.0 }),
    ]
}
