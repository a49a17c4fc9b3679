//! Per-thread timers and the scoped thread runner

use super::affinity::{pin_current_thread_to_core, warm_up_cpu};
use super::pool::TimingPool;
use crate::error::{Error, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

const GIB: f64 = (1u64 << 30) as f64;

/// Per-thread setup performed by [`run_timing_threads`]
#[derive(Clone, Copy, Debug, Default)]
pub struct TimingConfig {
    /// Pin thread `i` to core `i`
    pub pin_to_core: bool,
    /// Spin for ~10^9 cycles before running the body
    pub warm_up_cpu: bool,
}

/// Timer state of one worker thread
///
/// The pool-wide mean time of the last measurement is logged by thread 0
/// when `name` is non-empty, together with memory bandwidth and flop rate
/// when `nbytes_accessed` / `floating_point_ops` are set.
#[derive(Debug)]
pub struct TimingThread {
    pool: Arc<TimingPool>,
    thread_id: usize,
    /// Label used when reporting timings
    pub name: String,
    /// Bytes touched per measurement, for bandwidth reporting
    pub nbytes_accessed: u64,
    /// Floating point operations per measurement, for Gflops reporting
    pub floating_point_ops: u64,
    local_dt: f64,
    global_dt: f64,
    started_at: Option<Instant>,
}

impl TimingThread {
    /// Register a new thread with `pool`, taking the next thread id
    pub fn new(pool: &Arc<TimingPool>) -> Self {
        Self {
            pool: Arc::clone(pool),
            thread_id: pool.next_thread_id(),
            name: String::new(),
            nbytes_accessed: 0,
            floating_point_ops: 0,
            local_dt: 0.0,
            global_dt: 0.0,
            started_at: None,
        }
    }

    /// Id of this thread within its pool
    #[inline]
    pub fn thread_id(&self) -> usize {
        self.thread_id
    }

    /// Number of threads in the pool
    #[inline]
    pub fn nthreads(&self) -> usize {
        self.pool.nthreads()
    }

    /// Pool-mean seconds of the last completed measurement
    #[inline]
    pub fn global_dt(&self) -> f64 {
        self.global_dt
    }

    /// Wait for all threads, then start a fresh measurement
    ///
    /// # Errors
    /// Returns `TimerState` if the timer is already running, or
    /// `PoolAborted` if another thread of the pool failed.
    pub fn start_timer(&mut self) -> Result<()> {
        self.pool.wait_at_barrier(0.0)?;
        self.local_dt = 0.0;
        self.unpause_timer()
    }

    /// End the measurement and wait for all threads
    ///
    /// Returns the mean over all threads of their accumulated time.
    ///
    /// # Errors
    /// Returns `TimerState` if the timer is not running. In that case this
    /// thread does not reach the barrier. Returns `PoolAborted` if another
    /// thread of the pool failed.
    pub fn stop_timer(&mut self) -> Result<f64> {
        self.pause_timer()?;
        self.global_dt = self.pool.wait_at_barrier(self.local_dt)?;

        if self.thread_id == 0 && !self.name.is_empty() {
            self.report();
        }
        Ok(self.global_dt)
    }

    /// Stop accumulating time without ending the measurement
    ///
    /// # Errors
    /// Returns `TimerState` if the timer is not running.
    pub fn pause_timer(&mut self) -> Result<()> {
        let started_at = self.started_at.take().ok_or(Error::TimerState {
            reason: "pause or stop called, but timer was already stopped",
        })?;
        self.local_dt += started_at.elapsed().as_secs_f64();
        Ok(())
    }

    /// Resume accumulating time
    ///
    /// # Errors
    /// Returns `TimerState` if the timer is already running.
    pub fn unpause_timer(&mut self) -> Result<()> {
        if self.started_at.is_some() {
            return Err(Error::TimerState {
                reason: "start or unpause called, but timer is already running",
            });
        }
        self.started_at = Some(Instant::now());
        Ok(())
    }

    fn report(&self) {
        let dt = self.global_dt;
        let mut line = format!("{}: {} seconds", self.name, dt);

        if self.nbytes_accessed > 0 {
            let gbps = self.nbytes_accessed as f64 / dt / GIB;
            line.push_str(&format!(", memory bandwidth {gbps} GB/sec"));
        }
        if self.floating_point_ops > 0 {
            let gflops = self.floating_point_ops as f64 / dt / 1.0e9;
            line.push_str(&format!(", gflops={gflops}"));
        }

        info!(nthreads = self.nthreads(), "{line}");
    }
}

/// Aborts the pool when dropped while armed
///
/// Armed for the duration of a body, so a body that returns an error or
/// unwinds releases the peers waiting for it at the barrier.
struct AbortOnFailure<'a> {
    pool: &'a TimingPool,
    armed: bool,
}

impl Drop for AbortOnFailure<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.pool.abort();
        }
    }
}

/// Run `body` on every thread of `pool` and wait for all of them
///
/// Thread ids are assigned in spawn order. All threads must make the same
/// sequence of `start_timer` / `stop_timer` calls. If a body fails, the
/// pool is aborted and the other threads leave their next barrier with
/// `PoolAborted`.
///
/// # Errors
/// Returns the first error returned by any body, or `Internal` if a body
/// panicked. `PoolAborted` from threads released by that failure is only
/// returned when no other error is available. Pinning failures are logged
/// and otherwise ignored.
pub fn run_timing_threads<F>(pool: &Arc<TimingPool>, config: &TimingConfig, body: F) -> Result<()>
where
    F: Fn(&mut TimingThread) -> Result<()> + Sync,
{
    let body = &body;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..pool.nthreads())
            .map(|_| {
                let mut thread = TimingThread::new(pool);
                scope.spawn(move || {
                    let thread_id = thread.thread_id();
                    if config.pin_to_core {
                        if let Err(err) = pin_current_thread_to_core(thread_id) {
                            warn!(thread_id, %err, "could not pin timing thread");
                        }
                    }
                    if config.warm_up_cpu {
                        warm_up_cpu();
                    }

                    debug!(thread_id, "timing thread running");
                    let mut guard = AbortOnFailure { pool, armed: true };
                    let result = body(&mut thread);
                    guard.armed = result.is_err();
                    if let Err(err) = &result {
                        debug!(thread_id, %err, "timing thread failed");
                    }
                    result
                })
            })
            .collect();

        let mut result = Ok(());
        for handle in handles {
            let outcome = handle
                .join()
                .unwrap_or_else(|_| Err(Error::Internal("timing thread panicked".to_string())));
            if let Err(err) = outcome {
                if matches!(result, Ok(()) | Err(Error::PoolAborted)) {
                    result = Err(err);
                }
            }
        }
        result
    })
}
