//! Hierarchical self-time profiling

pub mod clock;
pub mod observer;
pub mod profiler;
pub mod report;
pub mod timer;
pub mod visualization;
pub mod workload;

pub use clock::*;
pub use observer::*;
pub use profiler::*;
pub use report::*;
pub use timer::*;
pub use visualization::*;
