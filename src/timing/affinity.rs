//! Core pinning and CPU warm-up

use crate::error::Result;
#[cfg(target_os = "linux")]
use crate::error::Error;

/// Number of hardware threads reported by the OS
pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Pin the calling thread to core `core`
///
/// Uses `sched_setaffinity` on Linux.
///
/// # Errors
/// Returns `CoreOutOfRange` if `core` is not below [`available_cores`], or
/// `Affinity` if the OS call fails.
#[cfg(target_os = "linux")]
pub fn pin_current_thread_to_core(core: usize) -> Result<()> {
    let available = available_cores();
    if core >= available {
        return Err(Error::CoreOutOfRange { core, available });
    }

    // SAFETY: cpu_set_t is plain data and all-zeroes is the empty set;
    // pid 0 addresses the calling thread.
    let ret = unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_SET(core, &mut set);
        libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set)
    };

    if ret != 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    Ok(())
}

/// Pin the calling thread to core `core` (no-op on this platform)
#[cfg(not(target_os = "linux"))]
pub fn pin_current_thread_to_core(core: usize) -> Result<()> {
    if core == 0 {
        tracing::warn!("pinning threads to cores is not implemented on this platform");
    }
    Ok(())
}

/// Keep the CPU busy for roughly 10^9 cycles
///
/// Timings are noticeably more stable once the core has left its
/// low-frequency state.
pub fn warm_up_cpu() {
    let mut n: u64 = 0;
    for i in 0..1_000_000_000u64 {
        n = n.wrapping_add(i ^ i.wrapping_sub(1));
    }
    std::hint::black_box(n);
}
