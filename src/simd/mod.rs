//! Batched triangular linear algebra across SIMD lanes
//!
//! All types here are small, fixed-size, stack-resident values. A batch of
//! `S` independent problems is processed in lockstep: lane `s` of every
//! lane vector belongs to problem `s`.
//!
//! # Module Structure
//!
//! ```text
//! simd/
//! ├── mod.rs          # This file: re-exports
//! ├── lanes.rs        # Lanes<T, S> lane vector, LaneMask<S>
//! ├── batched.rs      # SimdLayout / Batched traits shared by all values
//! ├── ntuple.rs       # Batched N-vectors (type-level recursion)
//! ├── trimatrix.rs    # Batched triangular matrices and kernels
//! └── shape.rs        # Dim<N> -> SimdNTuple / SimdTriMatrix aliases
//! ```
//!
//! # Layers
//!
//! | Type | Contents | Flat length |
//! |------|----------|-------------|
//! | [`Lanes<T, S>`] | one scalar per problem | `S` |
//! | [`SimdNTuple<T, S, N>`] | one N-vector per problem | `N * S` |
//! | [`SimdTriMatrix<T, S, N>`] | one packed lower triangle per problem | `N(N+1)/2 * S` |
//!
//! # Example
//!
//! ```
//! use tribatch::prelude::*;
//!
//! // Two problems: A = [[4], [2, 5]] in lane 0, A = [[9], [3, 10]] in lane 1
//! let a = SimdTriMatrix::<f64, 2, 2>::loadu(&[4.0, 9.0, 2.0, 3.0, 5.0, 10.0]);
//! let b = SimdNTuple::<f64, 2, 2>::loadu(&[1.0, 1.0, 1.0, 1.0]);
//!
//! let (l, ok) = a.cholesky_checked(1e-6);
//! assert!(ok.test_all_ones());
//!
//! // Solve A x = b as L L^T x = b
//! let x = l.solve_upper(&l.solve_lower(&b));
//! assert!(a.multiply_symmetric(&x).compare(&b) < 1e-12);
//! ```

mod batched;
mod lanes;
mod ntuple;
mod shape;
mod trimatrix;

pub use batched::{Batched, SimdLayout};
pub use lanes::{LaneMask, Lanes};
pub use ntuple::{BatchedVector, NTuple, NTupleNil};
pub use shape::{Dim, MAX_DIM, Shape, SimdNTuple, SimdTriMatrix};
pub use trimatrix::{BatchedTriangular, TriMatrix, TriMatrixNil};
