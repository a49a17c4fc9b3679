//! Batched lower-triangular matrices and in-register linear algebra
//!
//! An N×N triangular matrix is an (N-1)×(N-1) triangular matrix plus one
//! length-N row. The last entry of the row is the diagonal.
//!
//! ```text
//! row 0:  a00                      TriMatrix {
//! row 1:  a10 a11                      m: rows 0..N-1 (TriMatrix of N-1)
//! row 2:  a20 a21 a22                  v: NTuple { v: [a20, a21], x: a22 }
//!                                  }
//! flat layout: | a00 | a10 | a11 | a20 | a21 | a22 |   (each block S scalars)
//! ```
//!
//! Entry (i, j) of problem s lives at flat index `(i(i+1)/2 + j) * S + s`.
//!
//! The same storage carries two interpretations:
//! - a lower-triangular factor `L` (`multiply_lower`, `multiply_upper`,
//!   `solve_lower`, `solve_upper`, `decholesky_in_place`)
//! - a symmetric matrix `A` given by its lower triangle (`multiply_symmetric`,
//!   `cholesky_in_place`)
//!
//! Nothing at runtime distinguishes the two; calling a kernel on data in the
//! other interpretation silently produces garbage.
//!
//! # Kernels
//!
//! Every kernel peels the last row and recurses into the leading block. All
//! `S` lanes execute the same instruction stream. Per-lane failure of the
//! Cholesky factorization is reported only through the mask returned by
//! [`BatchedTriangular::cholesky_in_place_checked`].

use super::batched::{Batched, SimdLayout};
use super::lanes::{LaneMask, Lanes};
use super::ntuple::{BatchedVector, NTuple, NTupleNil};
use crate::dtype::Element;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

/// Batched N×N lower-triangular (or symmetric) matrix
pub trait BatchedTriangular<T: Element, const S: usize>: Batched<T, S> {
    /// Matching batched vector of length N
    type Tuple: BatchedVector<T, S>;

    /// Matrix dimension
    const N: usize;

    /// `t <- L t`
    fn multiply_lower_in_place(&self, t: &mut Self::Tuple);

    /// `t <- L^T t`
    fn multiply_upper_in_place(&self, t: &mut Self::Tuple);

    /// `t <- A t`, mirroring the stored lower triangle above the diagonal
    fn multiply_symmetric_in_place(&self, t: &mut Self::Tuple);

    /// Forward substitution: `t <- L^{-1} t`
    ///
    /// An exactly zero diagonal entry produces inf/NaN in that lane.
    fn solve_lower_in_place(&self, t: &mut Self::Tuple);

    /// Back substitution: `t <- L^{-T} t`
    ///
    /// An exactly zero diagonal entry produces inf/NaN in that lane.
    fn solve_upper_in_place(&self, t: &mut Self::Tuple);

    /// Replace the symmetric matrix `A` by its Cholesky factor `L`, `L L^T = A`
    ///
    /// Lanes holding a matrix that is not positive definite receive
    /// garbage (negative square roots, NaN). Use
    /// [`cholesky_in_place_checked`](Self::cholesky_in_place_checked) when
    /// failure must be observable.
    fn cholesky_in_place(&mut self);

    /// Cholesky factorization with per-lane failure detection
    ///
    /// At every pivot, with `d` the original diagonal entry and `u` the
    /// Schur complement, the lane passes if `u > epsilon * d`. The square
    /// root is taken of `max(u, epsilon * d)`, so failing lanes with a
    /// non-negative diagonal never turn into NaN. A negative diagonal entry
    /// makes the floor negative and that lane does produce NaN; its mask bit
    /// is still clear.
    ///
    /// Returns the mask of lanes that passed every pivot; results in the
    /// other lanes should be discarded.
    fn cholesky_in_place_checked(&mut self, epsilon: T) -> LaneMask<S>;

    /// Inverse of [`cholesky_in_place`](Self::cholesky_in_place): replace `L`
    /// by `A = L L^T`
    fn decholesky_in_place(&mut self);

    /// `L t`
    #[inline]
    fn multiply_lower(&self, t: &Self::Tuple) -> Self::Tuple {
        let mut ret = *t;
        self.multiply_lower_in_place(&mut ret);
        ret
    }

    /// `L^T t`
    #[inline]
    fn multiply_upper(&self, t: &Self::Tuple) -> Self::Tuple {
        let mut ret = *t;
        self.multiply_upper_in_place(&mut ret);
        ret
    }

    /// `A t`
    #[inline]
    fn multiply_symmetric(&self, t: &Self::Tuple) -> Self::Tuple {
        let mut ret = *t;
        self.multiply_symmetric_in_place(&mut ret);
        ret
    }

    /// Solve `L y = t`
    #[inline]
    fn solve_lower(&self, t: &Self::Tuple) -> Self::Tuple {
        let mut ret = *t;
        self.solve_lower_in_place(&mut ret);
        ret
    }

    /// Solve `L^T y = t`
    #[inline]
    fn solve_upper(&self, t: &Self::Tuple) -> Self::Tuple {
        let mut ret = *t;
        self.solve_upper_in_place(&mut ret);
        ret
    }

    /// Cholesky factor of `self`
    #[inline]
    fn cholesky(&self) -> Self {
        let mut ret = *self;
        ret.cholesky_in_place();
        ret
    }

    /// Cholesky factor of `self` with the per-lane success mask
    #[inline]
    fn cholesky_checked(&self, epsilon: T) -> (Self, LaneMask<S>) {
        let mut ret = *self;
        let mask = ret.cholesky_in_place_checked(epsilon);
        (ret, mask)
    }

    /// `L L^T` for `self = L`
    #[inline]
    fn decholesky(&self) -> Self {
        let mut ret = *self;
        ret.decholesky_in_place();
        ret
    }
}

/// Empty matrix (N = 0): every operation is a no-op
#[derive(Clone, Copy, Debug)]
pub struct TriMatrixNil<T, const S: usize>(PhantomData<T>);

/// Batched triangular matrix of dimension `M::N + 1`
#[derive(Clone, Copy, Debug)]
pub struct TriMatrix<M, T, const S: usize>
where
    M: BatchedTriangular<T, S>,
    T: Element,
{
    /// Leading (N-1)×(N-1) block
    pub m: M,
    /// Last row: off-diagonal entries in `v.v`, diagonal in `v.x`
    pub v: NTuple<M::Tuple, T, S>,
}

impl<M, T, const S: usize> TriMatrix<M, T, S>
where
    M: BatchedTriangular<T, S>,
    T: Element,
{
    /// Extend the leading block `m` by the row `v`
    #[inline(always)]
    pub fn new(m: M, v: NTuple<M::Tuple, T, S>) -> Self {
        Self { m, v }
    }

    /// Diagonal entry of the last row
    #[inline(always)]
    pub fn last_diagonal(&self) -> Lanes<T, S> {
        self.v.x
    }
}

// ============================================================================
// Layout
// ============================================================================

impl<T: Element, const S: usize> SimdLayout<T> for TriMatrixNil<T, S> {
    const FLAT_LEN: usize = 0;

    #[inline(always)]
    fn setzero() -> Self {
        Self(PhantomData)
    }

    #[inline(always)]
    fn loadu(_p: &[T]) -> Self {
        Self(PhantomData)
    }

    #[inline(always)]
    fn storeu(&self, _p: &mut [T]) {}
}

impl<M, T, const S: usize> SimdLayout<T> for TriMatrix<M, T, S>
where
    M: BatchedTriangular<T, S>,
    T: Element,
{
    const FLAT_LEN: usize = M::FLAT_LEN + <NTuple<M::Tuple, T, S> as SimdLayout<T>>::FLAT_LEN;

    #[inline(always)]
    fn setzero() -> Self {
        Self {
            m: M::setzero(),
            v: NTuple::setzero(),
        }
    }

    #[inline(always)]
    fn loadu(p: &[T]) -> Self {
        Self {
            m: M::loadu(p),
            v: NTuple::loadu(&p[M::FLAT_LEN..]),
        }
    }

    #[inline(always)]
    fn storeu(&self, p: &mut [T]) {
        self.m.storeu(p);
        self.v.storeu(&mut p[M::FLAT_LEN..]);
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

macro_rules! impl_trimatrix_binop {
    ($Op:ident, $op:ident, $OpAssign:ident, $op_assign:ident) => {
        impl<T: Element, const S: usize> $Op for TriMatrixNil<T, S> {
            type Output = Self;

            #[inline(always)]
            fn $op(self, _rhs: Self) -> Self {
                self
            }
        }

        impl<T: Element, const S: usize> $OpAssign for TriMatrixNil<T, S> {
            #[inline(always)]
            fn $op_assign(&mut self, _rhs: Self) {}
        }

        impl<M, T, const S: usize> $Op for TriMatrix<M, T, S>
        where
            M: BatchedTriangular<T, S>,
            T: Element,
        {
            type Output = Self;

            #[inline(always)]
            fn $op(self, rhs: Self) -> Self {
                Self {
                    m: $Op::$op(self.m, rhs.m),
                    v: $Op::$op(self.v, rhs.v),
                }
            }
        }

        impl<M, T, const S: usize> $OpAssign for TriMatrix<M, T, S>
        where
            M: BatchedTriangular<T, S>,
            T: Element,
        {
            #[inline(always)]
            fn $op_assign(&mut self, rhs: Self) {
                $OpAssign::$op_assign(&mut self.m, rhs.m);
                $OpAssign::$op_assign(&mut self.v, rhs.v);
            }
        }
    };
}

impl_trimatrix_binop!(Add, add, AddAssign, add_assign);
impl_trimatrix_binop!(Sub, sub, SubAssign, sub_assign);
impl_trimatrix_binop!(Mul, mul, MulAssign, mul_assign);
impl_trimatrix_binop!(Div, div, DivAssign, div_assign);

impl<T: Element, const S: usize> Batched<T, S> for TriMatrixNil<T, S> {
    #[inline(always)]
    fn vertical_sum(&self) -> Lanes<T, S> {
        Lanes::setzero()
    }
}

impl<M, T, const S: usize> Batched<T, S> for TriMatrix<M, T, S>
where
    M: BatchedTriangular<T, S>,
    T: Element,
{
    #[inline(always)]
    fn vertical_sum(&self) -> Lanes<T, S> {
        self.m.vertical_sum() + self.v.vertical_sum()
    }
}

// ============================================================================
// Kernels
// ============================================================================

impl<T: Element, const S: usize> BatchedTriangular<T, S> for TriMatrixNil<T, S> {
    type Tuple = NTupleNil<T, S>;
    const N: usize = 0;

    #[inline(always)]
    fn multiply_lower_in_place(&self, _t: &mut Self::Tuple) {}

    #[inline(always)]
    fn multiply_upper_in_place(&self, _t: &mut Self::Tuple) {}

    #[inline(always)]
    fn multiply_symmetric_in_place(&self, _t: &mut Self::Tuple) {}

    #[inline(always)]
    fn solve_lower_in_place(&self, _t: &mut Self::Tuple) {}

    #[inline(always)]
    fn solve_upper_in_place(&self, _t: &mut Self::Tuple) {}

    #[inline(always)]
    fn cholesky_in_place(&mut self) {}

    #[inline(always)]
    fn cholesky_in_place_checked(&mut self, _epsilon: T) -> LaneMask<S> {
        LaneMask::all_ones()
    }

    #[inline(always)]
    fn decholesky_in_place(&mut self) {}
}

impl<M, T, const S: usize> BatchedTriangular<T, S> for TriMatrix<M, T, S>
where
    M: BatchedTriangular<T, S>,
    T: Element,
{
    type Tuple = NTuple<M::Tuple, T, S>;
    const N: usize = M::N + 1;

    #[inline(always)]
    fn multiply_lower_in_place(&self, t: &mut Self::Tuple) {
        // Last row reads all of t, so it goes before t.v is overwritten
        t.x = self.v.vertical_dot(t);
        self.m.multiply_lower_in_place(&mut t.v);
    }

    #[inline(always)]
    fn multiply_upper_in_place(&self, t: &mut Self::Tuple) {
        self.m.multiply_upper_in_place(&mut t.v);
        t.v += self.v.v * t.x;
        t.x *= self.v.x;
    }

    #[inline(always)]
    fn multiply_symmetric_in_place(&self, t: &mut Self::Tuple) {
        let x = self.v.vertical_dot(t);
        self.m.multiply_symmetric_in_place(&mut t.v);
        t.v += self.v.v * t.x;
        t.x = x;
    }

    #[inline(always)]
    fn solve_lower_in_place(&self, t: &mut Self::Tuple) {
        self.m.solve_lower_in_place(&mut t.v);
        t.x = (t.x - self.v.v.vertical_dot(&t.v)) / self.v.x;
    }

    #[inline(always)]
    fn solve_upper_in_place(&self, t: &mut Self::Tuple) {
        t.x /= self.v.x;
        t.v -= self.v.v * t.x;
        self.m.solve_upper_in_place(&mut t.v);
    }

    #[inline(always)]
    fn cholesky_in_place(&mut self) {
        self.m.cholesky_in_place();
        self.m.solve_lower_in_place(&mut self.v.v);

        let u = self.v.x - self.v.v.vertical_dot(&self.v.v);
        self.v.x = u.sqrt();
    }

    #[inline(always)]
    fn cholesky_in_place_checked(&mut self, epsilon: T) -> LaneMask<S> {
        let mask = self.m.cholesky_in_place_checked(epsilon);
        self.m.solve_lower_in_place(&mut self.v.v);

        let floor = self.v.x * Lanes::broadcast(epsilon);
        let u = self.v.x - self.v.v.vertical_dot(&self.v.v);
        self.v.x = u.max(floor).sqrt();

        mask & u.compare_gt(floor)
    }

    #[inline(always)]
    fn decholesky_in_place(&mut self) {
        // The row transform needs the leading block still in factored form
        self.v.x = self.v.vertical_dot(&self.v);
        self.m.multiply_lower_in_place(&mut self.v.v);
        self.m.decholesky_in_place();
    }
}
