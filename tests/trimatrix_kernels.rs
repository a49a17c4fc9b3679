//! Integration tests for the batched triangular kernels
//!
//! Every kernel is checked lane by lane against a dense reference, for
//! f32 and f64, 4 and 8 lanes, and every dimension from 1 to 8.

mod common;

use common::{
    Tolerance, assert_lanes_close, ref_lower_times_upper, ref_multiply_lower,
    ref_multiply_symmetric, ref_multiply_upper, seeded_rng, to_f64,
};
use paste::paste;
use tribatch::debug::{flatten, randomize_trimatrix, randomize_vector};
use tribatch::prelude::*;

fn flat64<T: Element, X: SimdLayout<T>>(x: &X) -> Vec<f64> {
    to_f64(&flatten::<T, X>(x))
}

fn check_multiply<T: Tolerance, const S: usize, const N: usize>(seed: u64)
where
    Dim<N>: Shape<T, S>,
{
    let mut rng = seeded_rng(seed);
    let m: SimdTriMatrix<T, S, N> = randomize_trimatrix::<T, S, _, _>(&mut rng, 5.0, 10.0);
    let t: SimdNTuple<T, S, N> = randomize_vector::<T, S, _, _>(&mut rng);
    let (mf, tf) = (flat64::<T, _>(&m), flat64::<T, _>(&t));

    let got = flat64::<T, _>(&m.multiply_lower(&t));
    assert_lanes_close(&got, &ref_multiply_lower(&mf, &tf, N, S), S, T::TOL, "multiply_lower");

    let got = flat64::<T, _>(&m.multiply_upper(&t));
    assert_lanes_close(&got, &ref_multiply_upper(&mf, &tf, N, S), S, T::TOL, "multiply_upper");

    let got = flat64::<T, _>(&m.multiply_symmetric(&t));
    assert_lanes_close(
        &got,
        &ref_multiply_symmetric(&mf, &tf, N, S),
        S,
        T::TOL,
        "multiply_symmetric",
    );

    // out-of-place wrappers leave the input alone
    assert_eq!(flat64::<T, _>(&t), tf);
}

fn check_solve<T: Tolerance, const S: usize, const N: usize>(seed: u64)
where
    Dim<N>: Shape<T, S>,
{
    let mut rng = seeded_rng(seed);
    let l: SimdTriMatrix<T, S, N> = randomize_trimatrix::<T, S, _, _>(&mut rng, 5.0, 10.0);
    let t: SimdNTuple<T, S, N> = randomize_vector::<T, S, _, _>(&mut rng);
    let tf = flat64::<T, _>(&t);

    let x = l.solve_lower(&l.multiply_lower(&t));
    assert_lanes_close(&flat64::<T, _>(&x), &tf, S, T::TOL, "solve_lower(L t)");

    let x = l.solve_upper(&l.multiply_upper(&t));
    assert_lanes_close(&flat64::<T, _>(&x), &tf, S, T::TOL, "solve_upper(L^T t)");

    let mut x = t;
    l.solve_lower_in_place(&mut x);
    l.multiply_lower_in_place(&mut x);
    assert_lanes_close(&flat64::<T, _>(&x), &tf, S, T::TOL, "L solve_lower(t)");

    let mut x = t;
    l.solve_upper_in_place(&mut x);
    l.multiply_upper_in_place(&mut x);
    assert_lanes_close(&flat64::<T, _>(&x), &tf, S, T::TOL, "L^T solve_upper(t)");
}

fn check_decholesky<T: Tolerance, const S: usize, const N: usize>(seed: u64)
where
    Dim<N>: Shape<T, S>,
{
    let mut rng = seeded_rng(seed);
    let l: SimdTriMatrix<T, S, N> = randomize_trimatrix::<T, S, _, _>(&mut rng, 5.0, 10.0);
    let t: SimdNTuple<T, S, N> = randomize_vector::<T, S, _, _>(&mut rng);

    let a = l.decholesky();
    assert_lanes_close(
        &flat64::<T, _>(&a),
        &ref_lower_times_upper(&flat64::<T, _>(&l), N, S),
        S,
        T::TOL,
        "decholesky",
    );

    let lhs = a.multiply_symmetric(&t);
    let rhs = l.multiply_lower(&l.multiply_upper(&t));
    assert_lanes_close(&flat64::<T, _>(&lhs), &flat64::<T, _>(&rhs), S, T::TOL, "A t = L L^T t");
}

fn check_cholesky<T: Tolerance, const S: usize, const N: usize>(seed: u64)
where
    Dim<N>: Shape<T, S>,
{
    let mut rng = seeded_rng(seed);
    let l: SimdTriMatrix<T, S, N> = randomize_trimatrix::<T, S, _, _>(&mut rng, 5.0, 10.0);
    let lf = flat64::<T, _>(&l);
    let a = l.decholesky();

    let mut factored = a;
    factored.cholesky_in_place();
    assert_lanes_close(&flat64::<T, _>(&factored), &lf, S, T::TOL, "cholesky(decholesky(L))");
    assert_lanes_close(&flat64::<T, _>(&a.cholesky()), &lf, S, T::TOL, "cholesky");

    let (checked, mask) = a.cholesky_checked(T::from_f64(1e-3));
    assert!(mask.test_all_ones(), "positive definite lanes flagged: {}", mask);
    assert_eq!(flat64::<T, _>(&checked), flat64::<T, _>(&factored));

    // solving with the factor inverts the symmetric product; going through A
    // squares the condition number of L
    let t: SimdNTuple<T, S, N> = randomize_vector::<T, S, _, _>(&mut rng);
    let x = factored.solve_upper(&factored.solve_lower(&a.multiply_symmetric(&t)));
    let tol = 10.0 * T::TOL;
    assert_lanes_close(&flat64::<T, _>(&x), &flat64::<T, _>(&t), S, tol, "A^-1 A t");
}

macro_rules! kernel_tests {
    ($($t:ident, $s:literal, $n:literal);* $(;)?) => {
        paste! {
            $(
                #[test]
                fn [<test_multiply_ $t _s $s _n $n>]() {
                    check_multiply::<$t, $s, $n>(1000 + $n * 10 + $s);
                }

                #[test]
                fn [<test_solve_ $t _s $s _n $n>]() {
                    check_solve::<$t, $s, $n>(2000 + $n * 10 + $s);
                }

                #[test]
                fn [<test_decholesky_ $t _s $s _n $n>]() {
                    check_decholesky::<$t, $s, $n>(3000 + $n * 10 + $s);
                }

                #[test]
                fn [<test_cholesky_ $t _s $s _n $n>]() {
                    check_cholesky::<$t, $s, $n>(4000 + $n * 10 + $s);
                }
            )*
        }
    };
}

kernel_tests! {
    f32, 4, 1; f32, 4, 2; f32, 4, 3; f32, 4, 4; f32, 4, 5; f32, 4, 6; f32, 4, 7; f32, 4, 8;
    f32, 8, 1; f32, 8, 2; f32, 8, 3; f32, 8, 4; f32, 8, 5; f32, 8, 6; f32, 8, 7; f32, 8, 8;
    f64, 4, 1; f64, 4, 2; f64, 4, 3; f64, 4, 4; f64, 4, 5; f64, 4, 6; f64, 4, 7; f64, 4, 8;
    f64, 8, 1; f64, 8, 2; f64, 8, 3; f64, 8, 4; f64, 8, 5; f64, 8, 6; f64, 8, 7; f64, 8, 8;
}

// ============================================================================
// Fixed inputs
// ============================================================================

#[test]
fn test_known_factor_2x2() {
    // A = [[4, 2], [2, 5]] = L L^T with L = [[2, 0], [1, 2]]
    let a = SimdTriMatrix::<f64, 4, 2>::loadu(&[
        4.0, 4.0, 4.0, 4.0, //
        2.0, 2.0, 2.0, 2.0, //
        5.0, 5.0, 5.0, 5.0,
    ]);
    let l = a.cholesky();
    let flat = flatten::<f64, _>(&l);
    assert_eq!(&flat[0..4], &[2.0; 4]);
    assert_eq!(&flat[4..8], &[1.0; 4]);
    assert_eq!(&flat[8..12], &[2.0; 4]);

    // A x = [6, 7] has solution x = [1, 1]
    let b = SimdNTuple::<f64, 4, 2>::loadu(&[6.0, 6.0, 6.0, 6.0, 7.0, 7.0, 7.0, 7.0]);
    let x = l.solve_upper(&l.solve_lower(&b));
    for v in flatten::<f64, _>(&x) {
        assert!((v - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_lanes_are_independent() {
    // Lane s holds the 1x1 problem a = (s + 1)^2
    let a = SimdTriMatrix::<f32, 8, 1>::loadu(&[1.0, 4.0, 9.0, 16.0, 25.0, 36.0, 49.0, 64.0]);
    let l = a.cholesky();
    assert_eq!(
        flatten::<f32, _>(&l),
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
    );
}
