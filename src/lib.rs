//! selftime - hierarchical self-time profiler
//!
//! Measures wall-clock duration of named, nested and repeated code regions.
//! Each region is charged only for the time it was the innermost open one:
//! starting a nested timer pauses its parent, ending it resumes the parent.
//!
//! ```
//! use selftime::{ManualClock, Profiler};
//!
//! let clock = ManualClock::new();
//! let mut profiler = Profiler::with_clock(clock.clone());
//!
//! profiler.start_timer("parse")?;
//! clock.advance_secs(1.0);
//! profiler.start_timer("lex")?;
//! clock.advance_secs(0.5);
//! profiler.end_timer("lex")?;
//! profiler.end_timer("parse")?;
//!
//! let report = profiler.timers();
//! assert_eq!(report.get("parse").unwrap().duration, 1.0);
//! assert_eq!(report.get("lex").unwrap().duration, 0.5);
//! # Ok::<(), selftime::ProfilerError>(())
//! ```

pub mod config;
pub mod error;
pub mod profiling;

pub use config::{ConfigBuilder, ConfigManager, ProfilerConfig};
pub use error::{ErrorCode, ProfilerError, ProfilerResult};
pub use profiling::{
    Clock, ManualClock, MonotonicClock, NoopProfiler, NullObserver, OutputFormat, Profiler,
    ProfilerObserver, RecordingObserver, ReportFormatter, Timer, TimerEvent, TimerProfiler,
    TimerReport, TimerSnapshot, TracingObserver,
};

use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber honouring `RUST_LOG` (default `info`).
///
/// Calling this more than once is harmless.
pub fn init() -> ProfilerResult<()> {
    init_with_level("info")
}

pub fn init_with_level(default_level: &str) -> ProfilerResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok() {
        tracing::debug!("selftime {} initialized", version());
    }
    Ok(())
}

/// Get the current crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
