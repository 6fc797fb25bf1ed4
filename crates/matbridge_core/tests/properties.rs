//! Cross-operation properties of the dispatch layer.

use matbridge_core::{
    determinant_bareiss, eigen_decompose, hermite_form, rank, right_kernel, Determinant,
    EliminationEngine, HnfOptions, InterruptFlag, Matrix, Solver, SparseMatrix,
};
use num_bigint::BigInt;
use num_traits::{One, Zero};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize, bound: i64) -> Matrix<BigInt> {
    let data = (0..rows * cols)
        .map(|_| BigInt::from(rng.gen_range(-bound..=bound)))
        .collect();
    Matrix::from_flat(data, rows, cols)
}

/// A matrix with duplicated / combined rows, so ranks are often deficient.
fn random_deficient(rng: &mut StdRng, rows: usize, cols: usize) -> Matrix<BigInt> {
    let base = random_matrix(rng, rows, cols, 6);
    let mut rows_out: Vec<Vec<BigInt>> = base.iter_rows().map(<[BigInt]>::to_vec).collect();
    if rows >= 2 {
        let src = rng.gen_range(0..rows);
        let dst = rng.gen_range(0..rows);
        let factor = BigInt::from(rng.gen_range(-3i64..=3));
        rows_out[dst] = rows_out[src].iter().map(|v| v * &factor).collect();
    }
    Matrix::from_rows(&rows_out).unwrap()
}

#[test]
fn invert_returns_scaled_identity() {
    let mut rng = StdRng::seed_from_u64(7);
    let engine = EliminationEngine::new();
    let solver = Solver::new(&engine);
    let flag = InterruptFlag::new();

    let mut checked = 0;
    while checked < 8 {
        let n = rng.gen_range(1..=4);
        let a = random_matrix(&mut rng, n, n, 9);
        if determinant_bareiss(&a, &flag).unwrap().is_zero() {
            continue;
        }
        let (b, d) = solver.invert(&a).unwrap();
        assert!(d > BigInt::zero());
        let ab = a.mul_checked(&b).unwrap();
        for i in 0..n {
            for j in 0..n {
                let expected = if i == j { d.clone() } else { BigInt::zero() };
                assert_eq!(ab.get(i, j), &expected);
            }
        }
        checked += 1;
    }
}

#[test]
fn solve_right_matches_denominator_contract() {
    let mut rng = StdRng::seed_from_u64(11);
    let engine = EliminationEngine::new();
    let solver = Solver::new(&engine);
    let flag = InterruptFlag::new();

    let mut checked = 0;
    while checked < 6 {
        let n = rng.gen_range(1..=4);
        let a = random_matrix(&mut rng, n, n, 7);
        if determinant_bareiss(&a, &flag).unwrap().is_zero() {
            continue;
        }
        let cols = rng.gen_range(1..=3);
        let b = random_matrix(&mut rng, n, cols, 7);
        let (c, d) = solver.solve_right(&a, &b).unwrap();
        let ac = a.mul_checked(&c).unwrap();
        for i in 0..n {
            for j in 0..b.cols() {
                assert_eq!(ac.get(i, j), &(&d * b.get(i, j)));
            }
        }
        checked += 1;
    }
}

#[test]
fn rank_paths_agree() {
    let mut rng = StdRng::seed_from_u64(23);
    let flag = InterruptFlag::new();

    for _ in 0..12 {
        let rows = rng.gen_range(1..=5);
        let cols = rng.gen_range(1..=5);
        let a = random_deficient(&mut rng, rows, cols);

        let by_bareiss = rank(&a, &flag).unwrap();
        let by_kernel = cols - right_kernel(&a, &flag).unwrap().cols();
        let by_hnf = hermite_form(
            &a,
            HnfOptions {
                include_zero_rows: false,
            },
            &flag,
        )
        .unwrap()
        .rows();
        let by_sparse = rank(&SparseMatrix::from_dense(&a).to_dense(), &flag).unwrap();

        assert_eq!(by_bareiss, by_kernel, "kernel disagrees on {a:?}");
        assert_eq!(by_bareiss, by_hnf, "hnf disagrees on {a:?}");
        assert_eq!(by_bareiss, by_sparse, "sparse path disagrees on {a:?}");
    }
}

#[test]
fn determinant_paths_agree() {
    let mut rng = StdRng::seed_from_u64(31);
    let engine = EliminationEngine::new();
    let det = Determinant::new(&engine);
    let flag = InterruptFlag::new();

    for _ in 0..10 {
        let n = rng.gen_range(1..=5);
        let a = random_matrix(&mut rng, n, n, 20);
        assert_eq!(det.compute(&a).unwrap(), determinant_bareiss(&a, &flag).unwrap());
    }
}

#[test]
fn hermite_form_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(43);
    let flag = InterruptFlag::new();

    for _ in 0..12 {
        let rows = rng.gen_range(1..=5);
        let cols = rng.gen_range(1..=5);
        let a = random_deficient(&mut rng, rows, cols);
        let h = hermite_form(&a, HnfOptions::default(), &flag).unwrap();
        assert_eq!(hermite_form(&h, HnfOptions::default(), &flag).unwrap(), h);

        let trimmed = hermite_form(
            &a,
            HnfOptions {
                include_zero_rows: false,
            },
            &flag,
        )
        .unwrap();
        let retrimmed = hermite_form(
            &trimmed,
            HnfOptions {
                include_zero_rows: false,
            },
            &flag,
        )
        .unwrap();
        assert_eq!(retrimmed, trimmed);
    }
}

#[test]
fn kernel_annihilates_and_sizes() {
    let mut rng = StdRng::seed_from_u64(59);
    let flag = InterruptFlag::new();

    for _ in 0..12 {
        let rows = rng.gen_range(1..=5);
        let cols = rng.gen_range(1..=5);
        let a = random_deficient(&mut rng, rows, cols);
        let k = right_kernel(&a, &flag).unwrap();
        assert_eq!(k.rows(), cols);
        assert_eq!(k.cols(), cols - rank(&a, &flag).unwrap());
        assert!(a.mul_checked(&k).unwrap().is_zero());

        // M·K = 0 through the sparse layout as well.
        let s = SparseMatrix::from_dense(&a);
        for j in 0..k.cols() {
            let y = s.matvec(&k.column(j)).unwrap();
            assert!(y.iter().all(Zero::is_zero));
        }
    }
}

#[test]
fn empty_matrices_never_reach_engines() {
    let engine = EliminationEngine::new();
    let det = Determinant::new(&engine);
    let solver = Solver::new(&engine);
    let flag = InterruptFlag::new();

    let zero_by_zero = Matrix::<BigInt>::zeros(0, 0);
    assert_eq!(det.compute(&zero_by_zero).unwrap(), BigInt::one());
    assert_eq!(rank(&zero_by_zero, &flag).unwrap(), 0);

    let wide = Matrix::<BigInt>::zeros(0, 4);
    assert_eq!(rank(&wide, &flag).unwrap(), 0);
    assert_eq!(right_kernel(&wide, &flag).unwrap().dims(), (4, 0));
    assert_eq!(
        hermite_form(&wide, HnfOptions::default(), &flag).unwrap().dims(),
        (0, 4)
    );

    let tall = Matrix::<BigInt>::zeros(4, 0);
    assert_eq!(rank(&tall, &flag).unwrap(), 0);
    assert_eq!(right_kernel(&tall, &flag).unwrap().dims(), (0, 0));

    let (c, d) = solver.solve_right(&zero_by_zero, &Matrix::zeros(0, 3)).unwrap();
    assert_eq!(c.dims(), (0, 3));
    assert_eq!(d, BigInt::one());

    let decomposition = eigen_decompose(&zero_by_zero, &flag).unwrap();
    assert!(decomposition.pairs.is_empty());
}

#[test]
fn eigen_decomposition_reconstructs_spectrum() {
    let flag = InterruptFlag::new();
    // Similar to diag(2, 5) under a unimodular change of basis.
    let a = Matrix::from_flat(
        [2i64, 3, 0, 5].iter().map(|&v| BigInt::from(v)).collect(),
        2,
        2,
    );
    let d = eigen_decompose(&a, &flag).unwrap();
    let values: Vec<i64> = d
        .pairs
        .iter()
        .map(|p| (&p.value).try_into().unwrap())
        .collect();
    assert_eq!(values, vec![2, 5]);
    for pair in &d.pairs {
        let shifted = a.sub_scalar_diag(&pair.value).unwrap();
        assert!(shifted.mul_checked(&pair.vectors).unwrap().is_zero());
        assert_eq!(pair.vectors.cols(), 1);
    }
}
