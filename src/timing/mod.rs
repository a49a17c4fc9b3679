//! Barrier-synchronized timing harness
//!
//! Measures kernel throughput across worker threads, each running its own
//! independent batches. Every thread starts and stops its timer at a
//! shared barrier, and the reported time is the mean over all threads.
//!
//! ```text
//!  thread 0 ──┐ start_timer ┌── work ──┐ stop_timer ┌── ...
//!  thread 1 ──┤  (barrier)  ├── work ──┤ (barrier)  ├── ...
//!  thread 2 ──┘             └── work ──┘  mean dt   └── ...
//! ```
//!
//! The kernels themselves never use this module.
//!
//! # Example
//!
//! ```no_run
//! use tribatch::timing::{TimingConfig, TimingPool, run_timing_threads};
//!
//! let pool = TimingPool::new(4)?;
//! run_timing_threads(&pool, &TimingConfig::default(), |t| {
//!     t.name = "busy loop".to_string();
//!     t.start_timer()?;
//!     std::hint::black_box((0..1_000_000u64).sum::<u64>());
//!     t.stop_timer()?;
//!     Ok(())
//! })?;
//! # Ok::<(), tribatch::error::Error>(())
//! ```

mod affinity;
mod pool;
mod thread;

pub use affinity::{available_cores, pin_current_thread_to_core, warm_up_cpu};
pub use pool::TimingPool;
pub use thread::{TimingConfig, TimingThread, run_timing_threads};
