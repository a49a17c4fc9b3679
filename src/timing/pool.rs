//! Shared barrier and thread-id allocation

use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct BarrierState {
    count: usize,
    generation: u64,
    dt_current: f64,
    dt_previous: f64,
    aborted: bool,
}

/// Pool shared by a fixed number of timing threads
///
/// Thread ids are never recycled, so a pool serves a single set of
/// threads. Create a new pool for every [`run_timing_threads`] call.
///
/// [`run_timing_threads`]: super::run_timing_threads
#[derive(Debug)]
pub struct TimingPool {
    nthreads: usize,
    next_thread_id: AtomicUsize,
    barrier: Mutex<BarrierState>,
    barrier_cv: Condvar,
}

impl TimingPool {
    /// Create a pool for `nthreads` threads
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `nthreads` is zero.
    pub fn new(nthreads: usize) -> Result<Arc<Self>> {
        if nthreads == 0 {
            return Err(Error::InvalidArgument {
                arg: "nthreads",
                reason: "timing pool needs at least one thread".to_string(),
            });
        }

        Ok(Arc::new(Self {
            nthreads,
            next_thread_id: AtomicUsize::new(0),
            barrier: Mutex::new(BarrierState::default()),
            barrier_cv: Condvar::new(),
        }))
    }

    /// Number of threads that must reach each barrier
    #[inline]
    pub fn nthreads(&self) -> usize {
        self.nthreads
    }

    /// Hand out thread ids 0, 1, 2, ... in call order
    pub(crate) fn next_thread_id(&self) -> usize {
        self.next_thread_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Block until all `nthreads` threads have arrived
    ///
    /// Each thread contributes `dt`; every thread returns the mean of the
    /// contributions of this generation. The barrier is reusable.
    ///
    /// # Errors
    /// Returns `PoolAborted` once [`abort`](Self::abort) has been called,
    /// both for threads already waiting and for later arrivals.
    pub fn wait_at_barrier(&self, dt: f64) -> Result<f64> {
        let mut state = self.barrier.lock();
        if state.aborted {
            return Err(Error::PoolAborted);
        }
        state.dt_current += dt;
        state.count += 1;

        if state.count == self.nthreads {
            state.dt_previous = state.dt_current;
            state.dt_current = 0.0;
            state.count = 0;
            state.generation += 1;
            self.barrier_cv.notify_all();
            return Ok(state.dt_previous / self.nthreads as f64);
        }

        let generation = state.generation;
        while state.generation == generation && !state.aborted {
            self.barrier_cv.wait(&mut state);
        }

        if state.generation == generation {
            return Err(Error::PoolAborted);
        }
        Ok(state.dt_previous / self.nthreads as f64)
    }

    /// Release every thread blocked at the barrier with `PoolAborted`
    ///
    /// Called when a thread exits with an error, since it will never
    /// arrive. The pool stays aborted.
    pub fn abort(&self) {
        let mut state = self.barrier.lock();
        state.aborted = true;
        self.barrier_cv.notify_all();
    }

    /// Whether [`abort`](Self::abort) has been called
    pub fn is_aborted(&self) -> bool {
        self.barrier.lock().aborted
    }
}
