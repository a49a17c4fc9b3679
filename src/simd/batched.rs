//! Traits shared by every batched value
//!
//! [`SimdLayout`] fixes the flat memory layout; [`Batched`] adds same-shape
//! elementwise arithmetic and the reductions used by diagnostics.

use super::lanes::Lanes;
use crate::dtype::Element;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

/// Fixed-size value with a flat (unpacked) memory representation
///
/// The flat layout is a sequence of lane-vector blocks of `S` scalars each,
/// in the order documented by the implementing type.
pub trait SimdLayout<T: Element>: Copy + Debug {
    /// Number of scalars in the flat representation
    const FLAT_LEN: usize;

    /// All entries zero
    fn setzero() -> Self;

    /// Unpack from the first `FLAT_LEN` scalars of `p`
    ///
    /// # Panics
    /// Panics if `p.len() < FLAT_LEN`.
    fn loadu(p: &[T]) -> Self;

    /// Pack into the first `FLAT_LEN` scalars of `p`
    ///
    /// # Panics
    /// Panics if `p.len() < FLAT_LEN`.
    fn storeu(&self, p: &mut [T]);
}

/// Batched value supporting same-shape elementwise arithmetic
pub trait Batched<T: Element, const S: usize>:
    SimdLayout<T>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    /// Lane-wise sum of every lane vector in the value
    fn vertical_sum(&self) -> Lanes<T, S>;

    /// Sum of every scalar in the value
    #[inline]
    fn sum(&self) -> T {
        self.vertical_sum().sum()
    }

    /// Per-lane relative residual `|a - b| / sqrt(|a|^2 + |b|^2)`
    ///
    /// Lanes where both operands are exactly zero report 0.
    fn compare_lanes(&self, other: &Self) -> Lanes<T, S> {
        let d = *self - *other;
        let num = (d * d).vertical_sum();
        let den = (*self * *self + *other * *other).vertical_sum();

        let zero = Lanes::setzero();
        let nonzero = den.compare_gt(zero);
        let den = Lanes::select(nonzero, den, Lanes::broadcast(T::one()));
        Lanes::select(nonzero, (num / den).sqrt(), zero)
    }

    /// Relative residual over all lanes at once
    ///
    /// Returns 0 when both operands are exactly zero.
    fn compare(&self, other: &Self) -> T {
        let d = *self - *other;
        let num = (d * d).sum();
        let den = (*self * *self + *other * *other).sum();

        if den > T::zero() {
            (num / den).sqrt_val()
        } else {
            T::zero()
        }
    }
}
