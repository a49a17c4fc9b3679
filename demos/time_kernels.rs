//! Time the batched kernels on every core
//!
//! Run with `cargo run --release --example time_kernels`. The number of
//! worker threads is read from `TRIBATCH_THREADS` (default 4). Setting
//! `TRIBATCH_VERBOSE` enables debug logging.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use tribatch::debug::{randomize_trimatrix, randomize_vector};
use tribatch::prelude::*;

const N: usize = 8;
const S: usize = 8;
const NBATCH: usize = 4096;
const NITER: usize = 100;

const DTYPE: DType = <f32 as Element>::DTYPE;

type Matrix = SimdTriMatrix<f32, S, N>;
type Vector = SimdNTuple<f32, S, N>;

fn thread_count() -> Result<usize> {
    match std::env::var("TRIBATCH_THREADS") {
        Ok(s) => s.parse().map_err(|_| Error::InvalidArgument {
            arg: "TRIBATCH_THREADS",
            reason: format!("expected a thread count, got {s:?}"),
        }),
        Err(_) => Ok(4),
    }
}

fn time_kernels(t: &mut TimingThread) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(t.thread_id() as u64);
    let factors: Vec<Matrix> = (0..NBATCH)
        .map(|_| randomize_trimatrix::<f32, S, _, _>(&mut rng, 5.0, 10.0))
        .collect();
    let spd: Vec<Matrix> = factors.iter().map(|l| l.decholesky()).collect();
    let rhs: Vec<Vector> = (0..NBATCH)
        .map(|_| randomize_vector::<f32, S, _, _>(&mut rng))
        .collect();

    let elem = DTYPE.size_in_bytes();
    let matrix_bytes = (NBATCH * <Matrix as SimdLayout<f32>>::FLAT_LEN * elem) as u64;
    let vector_bytes = (NBATCH * <Vector as SimdLayout<f32>>::FLAT_LEN * elem) as u64;
    let problems = (NITER * NBATCH * S) as u64;
    let n = N as u64;

    t.name = format!("cholesky ({DTYPE}, S={S}, N={N})");
    t.nbytes_accessed = 2 * NITER as u64 * matrix_bytes;
    t.floating_point_ops = problems * n * n * n / 3;
    let mut work = spd.clone();
    t.start_timer()?;
    for _ in 0..NITER {
        work.copy_from_slice(&spd);
        for a in work.iter_mut() {
            a.cholesky_in_place();
        }
        black_box(&mut work);
    }
    t.stop_timer()?;

    t.name = format!("cholesky_checked ({DTYPE}, S={S}, N={N})");
    let mut failures = 0;
    t.start_timer()?;
    for _ in 0..NITER {
        work.copy_from_slice(&spd);
        for a in work.iter_mut() {
            failures += S - a.cholesky_in_place_checked(1e-4).count_ones();
        }
        black_box(&mut work);
    }
    t.stop_timer()?;
    if failures > 0 {
        tracing::warn!(thread_id = t.thread_id(), failures, "checked cholesky flagged lanes");
    }

    t.name = format!("solve_lower + solve_upper ({DTYPE}, S={S}, N={N})");
    t.nbytes_accessed = NITER as u64 * (matrix_bytes + 2 * vector_bytes);
    t.floating_point_ops = problems * 2 * n * n;
    let mut x = rhs.clone();
    t.start_timer()?;
    for _ in 0..NITER {
        x.copy_from_slice(&rhs);
        for (l, x) in factors.iter().zip(x.iter_mut()) {
            l.solve_lower_in_place(x);
            l.solve_upper_in_place(x);
        }
        black_box(&mut x);
    }
    t.stop_timer()?;

    Ok(())
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let verbose = std::env::var_os("TRIBATCH_VERBOSE").is_some();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let nthreads = thread_count()?;
    tracing::info!(nthreads, cores = tribatch::timing::available_cores(), "starting");

    let pool = TimingPool::new(nthreads)?;
    let config = TimingConfig {
        pin_to_core: nthreads <= tribatch::timing::available_cores(),
        warm_up_cpu: true,
    };
    run_timing_threads(&pool, &config, time_kernels)?;
    Ok(())
}
