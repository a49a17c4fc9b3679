//! Mapping from a const dimension to its recursive batched types
//!
//! The kernels are implemented on the recursive structs, whose nesting
//! depth is the dimension. [`Dim<N>`] names the nesting for `N` in `0..=8`
//! so that callers can write `SimdTriMatrix<f32, 8, 6>` instead of six
//! levels of `TriMatrix<..>`.
//!
//! Generic code over the dimension carries a `Dim<N>: Shape<T, S>` bound.

use super::ntuple::{BatchedVector, NTuple, NTupleNil};
use super::trimatrix::{BatchedTriangular, TriMatrix, TriMatrixNil};
use crate::dtype::Element;

/// Largest supported dimension
pub const MAX_DIM: usize = 8;

/// Type-level dimension marker
#[derive(Clone, Copy, Debug, Default)]
pub struct Dim<const N: usize>;

/// Batched types of one dimension
pub trait Shape<T: Element, const S: usize> {
    /// Batched vector of this length
    type Tuple: BatchedVector<T, S>;
    /// Batched triangular matrix of this dimension
    type Matrix: BatchedTriangular<T, S, Tuple = Self::Tuple>;
}

/// Batched N-vector with `S` lanes of `T`
pub type SimdNTuple<T, const S: usize, const N: usize> = <Dim<N> as Shape<T, S>>::Tuple;

/// Batched N×N triangular matrix with `S` lanes of `T`
pub type SimdTriMatrix<T, const S: usize, const N: usize> = <Dim<N> as Shape<T, S>>::Matrix;

impl<T: Element, const S: usize> Shape<T, S> for Dim<0> {
    type Tuple = NTupleNil<T, S>;
    type Matrix = TriMatrixNil<T, S>;
}

macro_rules! impl_shape {
    ($($n:literal => $prev:literal),* $(,)?) => {
        $(
            impl<T: Element, const S: usize> Shape<T, S> for Dim<$n> {
                type Tuple = NTuple<<Dim<$prev> as Shape<T, S>>::Tuple, T, S>;
                type Matrix = TriMatrix<<Dim<$prev> as Shape<T, S>>::Matrix, T, S>;
            }
        )*
    };
}

impl_shape!(1 => 0, 2 => 1, 3 => 2, 4 => 3, 5 => 4, 6 => 5, 7 => 6, 8 => 7);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::SimdLayout;

    #[test]
    fn test_dimensions_and_flat_lengths() {
        assert_eq!(<SimdNTuple<f32, 8, 5> as BatchedVector<f32, 8>>::N, 5);
        assert_eq!(<SimdNTuple<f32, 8, 5> as SimdLayout<f32>>::FLAT_LEN, 40);

        assert_eq!(<SimdTriMatrix<f32, 4, 8> as BatchedTriangular<f32, 4>>::N, MAX_DIM);
        assert_eq!(<SimdTriMatrix<f32, 4, 8> as SimdLayout<f32>>::FLAT_LEN, 36 * 4);
        assert_eq!(<SimdTriMatrix<f64, 4, 0> as SimdLayout<f64>>::FLAT_LEN, 0);
    }
}
