//! Random scalar generation for test inputs
//!
//! Thin helpers over `rand` / `rand_distr` that fill slices of any
//! [`Element`] type. Values are drawn in f64 and converted.

use crate::dtype::Element;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Uniform value in `[lo, hi)`
#[inline]
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * rng.random::<f64>()
}

/// Gaussian value with mean 0 and standard deviation `rms`
#[inline]
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, rms: f64) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    rms * z
}

/// Fill `dst` with uniform values in `[lo, hi)`
pub fn uniform_rand<T: Element, R: Rng + ?Sized>(rng: &mut R, dst: &mut [T], lo: f64, hi: f64) {
    for elem in dst.iter_mut() {
        *elem = T::from_f64(uniform(rng, lo, hi));
    }
}

/// Fill `dst` with Gaussian values of standard deviation `rms`
pub fn gaussian_rand<T: Element, R: Rng + ?Sized>(rng: &mut R, dst: &mut [T], rms: f64) {
    for elem in dst.iter_mut() {
        *elem = T::from_f64(gaussian(rng, rms));
    }
}

/// Vector of `n` uniform values in `[lo, hi)`
pub fn uniform_randvec<T: Element, R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    lo: f64,
    hi: f64,
) -> Vec<T> {
    let mut ret = vec![T::zero(); n];
    uniform_rand(rng, &mut ret, lo, hi);
    ret
}

/// Vector of `n` Gaussian values of standard deviation `rms`
pub fn gaussian_randvec<T: Element, R: Rng + ?Sized>(rng: &mut R, n: usize, rms: f64) -> Vec<T> {
    let mut ret = vec![T::zero(); n];
    gaussian_rand(rng, &mut ret, rms);
    ret
}
