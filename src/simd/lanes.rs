//! Lane vector and lane mask primitives
//!
//! [`Lanes<T, S>`] holds one scalar per lane for `S` independent problems.
//! Every operation acts lane-by-lane; lanes only interact through the
//! explicit horizontal reductions ([`Lanes::horizontal_sum`], [`Lanes::sum`]).
//!
//! The storage is a plain `[T; S]` so that the compiler lowers each
//! operation to a single vector instruction on any target that has one
//! (SSE/AVX/AVX-512 on x86-64, NEON on AArch64) without per-architecture
//! code paths. Conditional logic is never expressed as a branch on lane
//! values: compute both sides, then [`Lanes::select`] with a [`LaneMask`].

use super::batched::{Batched, SimdLayout};
use crate::dtype::Element;
use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, Div, DivAssign, Mul, MulAssign,
    Neg, Not, Sub, SubAssign,
};

/// One hardware vector register's worth of `S` scalars of type `T`
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(transparent)]
pub struct Lanes<T, const S: usize>(pub(crate) [T; S]);

// SAFETY: `Lanes` is `repr(transparent)` over `[T; S]`, which is `Zeroable`
// and `Pod` whenever `T` is.
unsafe impl<T: Zeroable, const S: usize> Zeroable for Lanes<T, S> {}
unsafe impl<T: Pod, const S: usize> Pod for Lanes<T, S> {}

impl<T: Element, const S: usize> Lanes<T, S> {
    /// Number of lanes
    pub const LANES: usize = S;

    /// All lanes zero
    #[inline(always)]
    pub fn setzero() -> Self {
        Zeroable::zeroed()
    }

    /// All lanes equal to `x`
    #[inline(always)]
    pub fn broadcast(x: T) -> Self {
        Self([x; S])
    }

    /// Build from an array, lane `i` taking `a[i]`
    #[inline(always)]
    pub const fn from_array(a: [T; S]) -> Self {
        Self(a)
    }

    /// Copy out to an array
    #[inline(always)]
    pub const fn to_array(self) -> [T; S] {
        self.0
    }

    /// Unaligned load of the first `S` scalars of `p`
    ///
    /// # Panics
    /// Panics if `p.len() < S`.
    #[inline(always)]
    pub fn loadu(p: &[T]) -> Self {
        let mut a = [T::zero(); S];
        a.copy_from_slice(&p[..S]);
        Self(a)
    }

    /// Unaligned store into the first `S` scalars of `p`
    ///
    /// # Panics
    /// Panics if `p.len() < S`.
    #[inline(always)]
    pub fn storeu(self, p: &mut [T]) {
        p[..S].copy_from_slice(&self.0);
    }

    /// Extract a lane selected at compile time
    #[inline(always)]
    pub fn extract<const I: usize>(self) -> T {
        const { assert!(I < S, "lane index out of range") };
        self.0[I]
    }

    /// Extract a lane selected at run time
    ///
    /// # Panics
    /// Panics if `lane >= S`.
    #[inline(always)]
    pub fn lane(self, lane: usize) -> T {
        self.0[lane]
    }

    /// Sum of all lanes, broadcast back to every lane
    #[inline(always)]
    pub fn horizontal_sum(self) -> Self {
        Self::broadcast(self.sum())
    }

    /// Sum of all lanes as a scalar
    #[inline(always)]
    pub fn sum(self) -> T {
        self.0.iter().fold(T::zero(), |acc, &x| acc + x)
    }

    /// Lane-wise square root
    #[inline(always)]
    pub fn sqrt(self) -> Self {
        self.map(|a| a.sqrt_val())
    }

    /// Lane-wise maximum
    ///
    /// Follows `maxps` semantics: if either lane is NaN, the lane of `rhs`
    /// is returned.
    #[inline(always)]
    pub fn max(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| if a > b { a } else { b })
    }

    /// Lane-wise minimum, with the same NaN convention as [`Lanes::max`]
    #[inline(always)]
    pub fn min(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| if a < b { a } else { b })
    }

    /// Lane-wise `self > rhs`
    #[inline(always)]
    pub fn compare_gt(self, rhs: Self) -> LaneMask<S> {
        self.mask_with(rhs, |a, b| a > b)
    }

    /// Lane-wise `self >= rhs`
    #[inline(always)]
    pub fn compare_ge(self, rhs: Self) -> LaneMask<S> {
        self.mask_with(rhs, |a, b| a >= b)
    }

    /// Lane-wise `self < rhs`
    #[inline(always)]
    pub fn compare_lt(self, rhs: Self) -> LaneMask<S> {
        self.mask_with(rhs, |a, b| a < b)
    }

    /// Lane-wise `self == rhs`
    #[inline(always)]
    pub fn compare_eq(self, rhs: Self) -> LaneMask<S> {
        self.mask_with(rhs, |a, b| a == b)
    }

    /// Blend: lanes of `a` where `mask` is set, lanes of `b` elsewhere
    #[inline(always)]
    pub fn select(mask: LaneMask<S>, a: Self, b: Self) -> Self {
        Self(std::array::from_fn(|i| if mask.0[i] { a.0[i] } else { b.0[i] }))
    }

    #[inline(always)]
    fn map(self, f: impl Fn(T) -> T) -> Self {
        Self(std::array::from_fn(|i| f(self.0[i])))
    }

    #[inline(always)]
    fn zip_with(self, rhs: Self, f: impl Fn(T, T) -> T) -> Self {
        Self(std::array::from_fn(|i| f(self.0[i], rhs.0[i])))
    }

    #[inline(always)]
    fn mask_with(self, rhs: Self, f: impl Fn(T, T) -> bool) -> LaneMask<S> {
        LaneMask(std::array::from_fn(|i| f(self.0[i], rhs.0[i])))
    }
}

impl<T: Element, const S: usize> From<[T; S]> for Lanes<T, S> {
    #[inline(always)]
    fn from(a: [T; S]) -> Self {
        Self(a)
    }
}

macro_rules! impl_lanes_binop {
    ($Op:ident, $op:ident, $OpAssign:ident, $op_assign:ident) => {
        impl<T: Element, const S: usize> $Op for Lanes<T, S> {
            type Output = Self;

            #[inline(always)]
            fn $op(self, rhs: Self) -> Self {
                self.zip_with(rhs, |a, b| $Op::$op(a, b))
            }
        }

        impl<T: Element, const S: usize> $OpAssign for Lanes<T, S> {
            #[inline(always)]
            fn $op_assign(&mut self, rhs: Self) {
                *self = $Op::$op(*self, rhs);
            }
        }
    };
}

impl_lanes_binop!(Add, add, AddAssign, add_assign);
impl_lanes_binop!(Sub, sub, SubAssign, sub_assign);
impl_lanes_binop!(Mul, mul, MulAssign, mul_assign);
impl_lanes_binop!(Div, div, DivAssign, div_assign);

impl<T: Element, const S: usize> Neg for Lanes<T, S> {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        self.map(|a| -a)
    }
}

impl<T: Element, const S: usize> SimdLayout<T> for Lanes<T, S> {
    const FLAT_LEN: usize = S;

    #[inline(always)]
    fn setzero() -> Self {
        Lanes::setzero()
    }

    #[inline(always)]
    fn loadu(p: &[T]) -> Self {
        Lanes::loadu(p)
    }

    #[inline(always)]
    fn storeu(&self, p: &mut [T]) {
        Lanes::storeu(*self, p)
    }
}

impl<T: Element, const S: usize> Batched<T, S> for Lanes<T, S> {
    #[inline(always)]
    fn vertical_sum(&self) -> Lanes<T, S> {
        *self
    }
}

impl<T: Element, const S: usize> fmt::Display for Lanes<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, x) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, "]")
    }
}

// ============================================================================
// Lane mask
// ============================================================================

/// Per-lane boolean mask, produced by lane comparisons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LaneMask<const S: usize>(pub(crate) [bool; S]);

impl<const S: usize> LaneMask<S> {
    /// Every lane set
    #[inline(always)]
    pub const fn all_ones() -> Self {
        Self([true; S])
    }

    /// No lane set
    #[inline(always)]
    pub const fn none() -> Self {
        Self([false; S])
    }

    /// Build from an array, lane `i` taking `a[i]`
    #[inline(always)]
    pub const fn from_array(a: [bool; S]) -> Self {
        Self(a)
    }

    /// Copy out to an array
    #[inline(always)]
    pub const fn to_array(self) -> [bool; S] {
        self.0
    }

    /// Whether lane `lane` is set
    ///
    /// # Panics
    /// Panics if `lane >= S`.
    #[inline(always)]
    pub fn lane(self, lane: usize) -> bool {
        self.0[lane]
    }

    /// Lane-wise agreement: set where both masks hold the same bit
    #[inline(always)]
    pub fn compare_eq(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] == rhs.0[i]))
    }

    /// True iff every lane is set
    #[inline(always)]
    pub fn test_all_ones(self) -> bool {
        self.0.iter().all(|&b| b)
    }

    /// True iff no lane is set
    #[inline(always)]
    pub fn test_all_zeros(self) -> bool {
        !self.0.iter().any(|&b| b)
    }

    /// Number of set lanes
    #[inline]
    pub fn count_ones(self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }
}

impl<const S: usize> From<[bool; S]> for LaneMask<S> {
    #[inline(always)]
    fn from(a: [bool; S]) -> Self {
        Self(a)
    }
}

impl<const S: usize> BitAnd for LaneMask<S> {
    type Output = Self;

    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] & rhs.0[i]))
    }
}

impl<const S: usize> BitAndAssign for LaneMask<S> {
    #[inline(always)]
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}

impl<const S: usize> BitOr for LaneMask<S> {
    type Output = Self;

    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] | rhs.0[i]))
    }
}

impl<const S: usize> BitOrAssign for LaneMask<S> {
    #[inline(always)]
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl<const S: usize> Not for LaneMask<S> {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        Self(self.0.map(|b| !b))
    }
}

impl<const S: usize> fmt::Display for LaneMask<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, &b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", b as u8)?;
        }
        write!(f, "]")
    }
}
