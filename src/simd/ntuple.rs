//! Fixed-length batched vectors
//!
//! A length-N batched vector holds, for each of the `S` lanes, an
//! independent N-vector. It is built by type-level recursion: a
//! length-N tuple is a length-(N-1) tuple plus one more lane vector.
//!
//! ```text
//! NTuple<NTuple<NTuple<NTupleNil, ..>, ..>, ..>      (N = 3)
//!
//! flat layout:  | x[0]: S scalars | x[1]: S scalars | x[2]: S scalars |
//! ```
//!
//! Block `i` of the flat layout holds coordinate `i` for all `S` problems.

use super::batched::{Batched, SimdLayout};
use super::lanes::Lanes;
use crate::dtype::Element;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

/// Batched N-vector, for each of `S` problems
///
/// Besides same-shape arithmetic, every coordinate can be combined with a
/// single lane vector (`tuple * lanes` scales each coordinate lane-wise).
pub trait BatchedVector<T: Element, const S: usize>:
    Batched<T, S>
    + Add<Lanes<T, S>, Output = Self>
    + Sub<Lanes<T, S>, Output = Self>
    + Mul<Lanes<T, S>, Output = Self>
    + Div<Lanes<T, S>, Output = Self>
    + AddAssign<Lanes<T, S>>
    + SubAssign<Lanes<T, S>>
    + MulAssign<Lanes<T, S>>
    + DivAssign<Lanes<T, S>>
{
    /// Vector length
    const N: usize;

    /// Every coordinate equal to `x`
    fn splat(x: Lanes<T, S>) -> Self;

    /// Lane-wise dot product with `other`
    fn vertical_dot(&self, other: &Self) -> Lanes<T, S>;
}

/// Empty tuple (N = 0): every operation is a no-op
#[derive(Clone, Copy, Debug)]
pub struct NTupleNil<T, const S: usize>(PhantomData<T>);

/// Batched vector of length `P::N + 1`
///
/// `v` holds the leading coordinates and `x` the last one.
#[derive(Clone, Copy, Debug)]
pub struct NTuple<P, T, const S: usize> {
    /// Leading `N - 1` coordinates
    pub v: P,
    /// Last coordinate
    pub x: Lanes<T, S>,
}

impl<P: BatchedVector<T, S>, T: Element, const S: usize> NTuple<P, T, S> {
    /// Append coordinate `x` to `v`
    #[inline(always)]
    pub fn new(v: P, x: Lanes<T, S>) -> Self {
        Self { v, x }
    }
}

// ============================================================================
// Layout
// ============================================================================

impl<T: Element, const S: usize> SimdLayout<T> for NTupleNil<T, S> {
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

impl<P: BatchedVector<T, S>, T: Element, const S: usize> SimdLayout<T> for NTuple<P, T, S> {
    const FLAT_LEN: usize = P::FLAT_LEN + S;

    #[inline(always)]
    fn setzero() -> Self {
        Self {
            v: P::setzero(),
            x: Lanes::setzero(),
        }
    }

    #[inline(always)]
    fn loadu(p: &[T]) -> Self {
        Self {
            v: P::loadu(p),
            x: Lanes::loadu(&p[P::FLAT_LEN..]),
        }
    }

    #[inline(always)]
    fn storeu(&self, p: &mut [T]) {
        self.v.storeu(p);
        self.x.storeu(&mut p[P::FLAT_LEN..]);
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

macro_rules! impl_ntuple_binop {
    ($Op:ident, $op:ident, $OpAssign:ident, $op_assign:ident) => {
        impl<T: Element, const S: usize> $Op for NTupleNil<T, S> {
            type Output = Self;

            #[inline(always)]
            fn $op(self, _rhs: Self) -> Self {
                self
            }
        }

        impl<T: Element, const S: usize> $Op<Lanes<T, S>> for NTupleNil<T, S> {
            type Output = Self;

            #[inline(always)]
            fn $op(self, _rhs: Lanes<T, S>) -> Self {
                self
            }
        }

        impl<T: Element, const S: usize> $OpAssign for NTupleNil<T, S> {
            #[inline(always)]
            fn $op_assign(&mut self, _rhs: Self) {}
        }

        impl<T: Element, const S: usize> $OpAssign<Lanes<T, S>> for NTupleNil<T, S> {
            #[inline(always)]
            fn $op_assign(&mut self, _rhs: Lanes<T, S>) {}
        }

        impl<P: BatchedVector<T, S>, T: Element, const S: usize> $Op for NTuple<P, T, S> {
            type Output = Self;

            #[inline(always)]
            fn $op(self, rhs: Self) -> Self {
                Self {
                    v: $Op::$op(self.v, rhs.v),
                    x: $Op::$op(self.x, rhs.x),
                }
            }
        }

        impl<P: BatchedVector<T, S>, T: Element, const S: usize> $Op<Lanes<T, S>>
            for NTuple<P, T, S>
        {
            type Output = Self;

            #[inline(always)]
            fn $op(self, rhs: Lanes<T, S>) -> Self {
                Self {
                    v: $Op::$op(self.v, rhs),
                    x: $Op::$op(self.x, rhs),
                }
            }
        }

        impl<P: BatchedVector<T, S>, T: Element, const S: usize> $OpAssign for NTuple<P, T, S> {
            #[inline(always)]
            fn $op_assign(&mut self, rhs: Self) {
                $OpAssign::$op_assign(&mut self.v, rhs.v);
                $OpAssign::$op_assign(&mut self.x, rhs.x);
            }
        }

        impl<P: BatchedVector<T, S>, T: Element, const S: usize> $OpAssign<Lanes<T, S>>
            for NTuple<P, T, S>
        {
            #[inline(always)]
            fn $op_assign(&mut self, rhs: Lanes<T, S>) {
                $OpAssign::$op_assign(&mut self.v, rhs);
                $OpAssign::$op_assign(&mut self.x, rhs);
            }
        }
    };
}

impl_ntuple_binop!(Add, add, AddAssign, add_assign);
impl_ntuple_binop!(Sub, sub, SubAssign, sub_assign);
impl_ntuple_binop!(Mul, mul, MulAssign, mul_assign);
impl_ntuple_binop!(Div, div, DivAssign, div_assign);

// ============================================================================
// Reductions
// ============================================================================

impl<T: Element, const S: usize> Batched<T, S> for NTupleNil<T, S> {
    #[inline(always)]
    fn vertical_sum(&self) -> Lanes<T, S> {
        Lanes::setzero()
    }
}

impl<T: Element, const S: usize> BatchedVector<T, S> for NTupleNil<T, S> {
    const N: usize = 0;

    #[inline(always)]
    fn splat(_x: Lanes<T, S>) -> Self {
        Self(PhantomData)
    }

    #[inline(always)]
    fn vertical_dot(&self, _other: &Self) -> Lanes<T, S> {
        Lanes::setzero()
    }
}

impl<P: BatchedVector<T, S>, T: Element, const S: usize> Batched<T, S> for NTuple<P, T, S> {
    #[inline(always)]
    fn vertical_sum(&self) -> Lanes<T, S> {
        self.v.vertical_sum() + self.x
    }
}

impl<P: BatchedVector<T, S>, T: Element, const S: usize> BatchedVector<T, S>
    for NTuple<P, T, S>
{
    const N: usize = P::N + 1;

    #[inline(always)]
    fn splat(x: Lanes<T, S>) -> Self {
        Self { v: P::splat(x), x }
    }

    #[inline(always)]
    fn vertical_dot(&self, other: &Self) -> Lanes<T, S> {
        self.v.vertical_dot(&other.v) + self.x * other.x
    }
}
