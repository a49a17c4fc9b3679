//! # tribatch
//!
//! **Register-resident batched triangular linear algebra for Rust.**
//!
//! tribatch solves many tiny symmetric positive-definite systems at once:
//! `S` independent problems of dimension `N <= 8` are packed into the lanes
//! of one vector register and processed in lockstep, with no heap traffic
//! and no data-dependent branches.
//!
//! ## Features
//!
//! - **Kernels**: triangular and symmetric matrix-vector products, forward
//!   and back substitution, in-place Cholesky and its inverse
//! - **Per-lane failure detection**: checked Cholesky returns a lane mask
//!   marking the problems that stayed positive definite at every pivot
//! - **Packed storage**: `N(N+1)/2` lane vectors per matrix, with a stable
//!   flat layout for interop with plain arrays
//! - **Test helpers**: random inputs, flatten/pack, relative residuals
//! - **Timing harness**: barrier-synchronized worker threads for measuring
//!   kernel throughput
//!
//! ## Quick Start
//!
//! ```rust
//! use tribatch::prelude::*;
//!
//! // Eight 3x3 problems, all A = [[4], [1, 5], [2, 1, 6]]
//! let rows = [4.0f32, 1.0, 5.0, 2.0, 1.0, 6.0];
//! let flat: Vec<f32> = rows.iter().flat_map(|&a| [a; 8]).collect();
//! let mut a = SimdTriMatrix::<f32, 8, 3>::loadu(&flat);
//!
//! let ok = a.cholesky_in_place_checked(1e-4);
//! assert!(ok.test_all_ones());
//! ```
//!
//! ## Feature Flags
//!
//! - `timing` (default): multi-thread timing harness (`tracing`, `parking_lot`, `libc`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod debug;
pub mod dtype;
pub mod error;
pub mod random;
pub mod simd;
#[cfg(feature = "timing")]
pub mod timing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::{DType, Element};
    pub use crate::error::{Error, Result};
    pub use crate::simd::{
        Batched, BatchedTriangular, BatchedVector, Dim, LaneMask, Lanes, Shape, SimdLayout,
        SimdNTuple, SimdTriMatrix,
    };

    #[cfg(feature = "timing")]
    pub use crate::timing::{TimingConfig, TimingPool, TimingThread, run_timing_threads};
}
