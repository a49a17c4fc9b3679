//! Validation and diagnostic helpers
//!
//! Conversions between batched values and flat arrays, and random batched
//! inputs. Used by tests, benchmarks and debugging; never by the kernels.

use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::random::{gaussian_rand, uniform_rand};
use crate::simd::{BatchedTriangular, BatchedVector, LaneMask, SimdLayout};
use rand::Rng;

/// Unpack any batched value into its flat layout
pub fn flatten<T: Element, X: SimdLayout<T>>(x: &X) -> Vec<T> {
    let mut ret = vec![T::zero(); X::FLAT_LEN];
    x.storeu(&mut ret);
    ret
}

/// Build a batched value from its flat layout
///
/// Unlike [`SimdLayout::loadu`], the length of `flat` must match exactly.
pub fn pack<T: Element, X: SimdLayout<T>>(flat: &[T]) -> Result<X> {
    if flat.len() != X::FLAT_LEN {
        return Err(Error::flat_len_mismatch(X::FLAT_LEN, flat.len()));
    }
    Ok(X::loadu(flat))
}

/// Batched vector with independent standard Gaussian entries
pub fn randomize_vector<T, const S: usize, V, R>(rng: &mut R) -> V
where
    T: Element,
    V: BatchedVector<T, S>,
    R: Rng + ?Sized,
{
    let mut buf = vec![T::zero(); V::FLAT_LEN];
    gaussian_rand(rng, &mut buf, 1.0);
    V::loadu(&buf)
}

/// Random batched triangular matrix
///
/// Off-diagonal entries are standard Gaussian; diagonal entries are uniform
/// in `[diag_lo, diag_hi)`. With a diagonal bounded well away from zero the
/// result is a well-conditioned factor `L`, and `L L^T` is a well-conditioned
/// positive-definite matrix.
pub fn randomize_trimatrix<T, const S: usize, M, R>(rng: &mut R, diag_lo: f64, diag_hi: f64) -> M
where
    T: Element,
    M: BatchedTriangular<T, S>,
    R: Rng + ?Sized,
{
    let mut buf = vec![T::zero(); M::FLAT_LEN];

    for i in 0..M::N {
        let row = (i * (i + 1) / 2) * S;
        gaussian_rand(rng, &mut buf[row..row + i * S], 1.0);
        uniform_rand(rng, &mut buf[row + i * S..row + (i + 1) * S], diag_lo, diag_hi);
    }

    M::loadu(&buf)
}

/// Mask with each lane independently set with probability 1/2
pub fn random_mask<const S: usize, R: Rng + ?Sized>(rng: &mut R) -> LaneMask<S> {
    LaneMask::from_array(std::array::from_fn(|_| rng.random::<bool>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::{Lanes, SimdNTuple, SimdTriMatrix};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_flatten_pack_layout() {
        let flat: Vec<f32> = (0..24).map(|k| k as f32).collect();
        let m: SimdTriMatrix<f32, 4, 3> = pack(&flat).unwrap();
        assert_eq!(flatten::<f32, _>(&m), flat);

        let l: Lanes<f32, 4> = pack(&flat[..4]).unwrap();
        assert_eq!(flatten::<f32, _>(&l), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_pack_rejects_wrong_length() {
        let flat = vec![0.0f64; 10];
        let err = pack::<f64, SimdNTuple<f64, 4, 3>>(&flat).unwrap_err();
        match err {
            Error::ShapeMismatch { expected, got } => {
                assert_eq!(expected, vec![12]);
                assert_eq!(got, vec![10]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_randomize_trimatrix_diagonal_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let m: SimdTriMatrix<f64, 8, 5> = randomize_trimatrix::<f64, 8, _, _>(&mut rng, 5.0, 10.0);
        let flat = flatten::<f64, _>(&m);

        for i in 0..5 {
            let diag = (i * (i + 1) / 2 + i) * 8;
            assert!(flat[diag..diag + 8].iter().all(|&d| (5.0..10.0).contains(&d)));
        }
    }

    #[test]
    fn test_random_mask_mixes_lanes() {
        let mut rng = StdRng::seed_from_u64(5);
        let total: usize = (0..64).map(|_| random_mask::<8, _>(&mut rng).count_ones()).sum();
        // 512 fair coin flips
        assert!(total > 150 && total < 362, "total = {}", total);
    }
}
