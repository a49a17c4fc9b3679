//! Common test utilities
#![allow(dead_code)]

use rand::SeedableRng;
use rand::rngs::StdRng;
use tribatch::dtype::Element;

/// Deterministic generator for reproducible inputs
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Relative residual accepted for each element type
pub trait Tolerance: Element {
    const TOL: f64;
}

impl Tolerance for f64 {
    const TOL: f64 = 1e-6;
}

impl Tolerance for f32 {
    const TOL: f64 = 1e-6;
}

pub fn to_f64<T: Element>(flat: &[T]) -> Vec<f64> {
    flat.iter().map(|x| x.to_f64()).collect()
}

pub fn from_f64<T: Element>(flat: &[f64]) -> Vec<T> {
    flat.iter().map(|&x| T::from_f64(x)).collect()
}

/// Flat index of matrix entry (i, j), j <= i, of lane `lane`
#[inline]
pub fn tri_index(i: usize, j: usize, s: usize, lane: usize) -> usize {
    (i * (i + 1) / 2 + j) * s + lane
}

/// Dense lower triangle of one lane; entries above the diagonal are zero
pub fn lane_matrix(flat: &[f64], n: usize, s: usize, lane: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| if j <= i { flat[tri_index(i, j, s, lane)] } else { 0.0 })
                .collect()
        })
        .collect()
}

pub fn lane_vector(flat: &[f64], n: usize, s: usize, lane: usize) -> Vec<f64> {
    (0..n).map(|i| flat[i * s + lane]).collect()
}

/// Pack per-lane dense lower triangles into the flat matrix layout
pub fn pack_matrices(mats: &[Vec<Vec<f64>>], n: usize) -> Vec<f64> {
    let s = mats.len();
    let mut flat = vec![0.0; n * (n + 1) / 2 * s];
    for (lane, a) in mats.iter().enumerate() {
        for i in 0..n {
            for j in 0..=i {
                flat[tri_index(i, j, s, lane)] = a[i][j];
            }
        }
    }
    flat
}

fn per_lane_product(
    m: &[f64],
    t: &[f64],
    n: usize,
    s: usize,
    entry: impl Fn(&[Vec<f64>], usize, usize) -> f64,
) -> Vec<f64> {
    let mut out = vec![0.0; n * s];
    for lane in 0..s {
        let a = lane_matrix(m, n, s, lane);
        let x = lane_vector(t, n, s, lane);
        for i in 0..n {
            out[i * s + lane] = (0..n).map(|j| entry(&a, i, j) * x[j]).sum();
        }
    }
    out
}

/// Reference `L t` on flat data
pub fn ref_multiply_lower(m: &[f64], t: &[f64], n: usize, s: usize) -> Vec<f64> {
    per_lane_product(m, t, n, s, |a, i, j| a[i][j])
}

/// Reference `L^T t` on flat data
pub fn ref_multiply_upper(m: &[f64], t: &[f64], n: usize, s: usize) -> Vec<f64> {
    per_lane_product(m, t, n, s, |a, i, j| a[j][i])
}

/// Reference `A t`, with `A` given by its lower triangle
pub fn ref_multiply_symmetric(m: &[f64], t: &[f64], n: usize, s: usize) -> Vec<f64> {
    per_lane_product(m, t, n, s, |a, i, j| if j <= i { a[i][j] } else { a[j][i] })
}

/// Reference `L L^T`, returned as a packed lower triangle
pub fn ref_lower_times_upper(m: &[f64], n: usize, s: usize) -> Vec<f64> {
    let mats: Vec<_> = (0..s)
        .map(|lane| {
            let l = lane_matrix(m, n, s, lane);
            (0..n)
                .map(|i| (0..n).map(|j| (0..n).map(|k| l[i][k] * l[j][k]).sum()).collect())
                .collect()
        })
        .collect();
    pack_matrices(&mats, n)
}

/// Per-lane relative residual `|a - b| / sqrt(|a|^2 + |b|^2)`
pub fn lane_residuals(got: &[f64], want: &[f64], s: usize) -> Vec<f64> {
    assert_eq!(got.len(), want.len(), "length mismatch");
    (0..s)
        .map(|lane| {
            let (mut num, mut den) = (0.0, 0.0);
            for k in (lane..got.len()).step_by(s) {
                num += (got[k] - want[k]) * (got[k] - want[k]);
                den += got[k] * got[k] + want[k] * want[k];
            }
            if den > 0.0 { (num / den).sqrt() } else { 0.0 }
        })
        .collect()
}

/// Assert every lane of `got` matches `want` within relative residual `tol`
pub fn assert_lanes_close(got: &[f64], want: &[f64], s: usize, tol: f64, msg: &str) {
    for (lane, r) in lane_residuals(got, want, s).into_iter().enumerate() {
        assert!(
            r <= tol,
            "{}: lane {} residual {} exceeds {}",
            msg,
            lane,
            r,
            tol
        );
    }
}
