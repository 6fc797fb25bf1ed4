//! Exact linear solving and inversion
//!
//! Dispatch layer over the lifting engine: shape checks, degenerate
//! short-circuits, and the left/right solve conventions. Solutions come
//! back as an integer matrix plus a positive denominator, so `A·C = d·B`
//! (or `C·A = d·B`) holds exactly.

use num_bigint::BigInt;

use crate::engine::ModularEngine;
use crate::error::{Error, Result};
use crate::interrupt::{InterruptFlag, InterruptGuard};
use crate::lifting::{Lifting, LiftingConfig};
use crate::matrix::Matrix;

/// Exact solver over a modular engine.
pub struct Solver<'e, E: ModularEngine> {
    engine: &'e E,
    config: LiftingConfig,
    flag: InterruptFlag,
}

impl<'e, E: ModularEngine> Solver<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self {
            engine,
            config: LiftingConfig::default(),
            flag: InterruptFlag::new(),
        }
    }

    pub fn with_interrupt(engine: &'e E, flag: InterruptFlag) -> Self {
        Self {
            engine,
            config: LiftingConfig::default(),
            flag,
        }
    }

    pub fn with_config(mut self, config: LiftingConfig) -> Self {
        self.config = config;
        self
    }

    /// Solve `A·C = d·B` for square A (n×n) and B (n×m).
    pub fn solve_right(
        &self,
        a: &Matrix<BigInt>,
        b: &Matrix<BigInt>,
    ) -> Result<(Matrix<BigInt>, BigInt)> {
        if !a.is_square() {
            return Err(Error::NotSquare {
                rows: a.rows(),
                cols: a.cols(),
            });
        }
        if b.rows() != a.rows() {
            return Err(Error::shape_mismatch(a.dims(), b.dims()));
        }
        let guard = InterruptGuard::enter(&self.flag);
        let lifting = Lifting::with_config(self.engine, self.config.clone());
        lifting.solve(a, b, &guard)
    }

    /// Solve `C·A = d·B` for square A (n×n) and B (m×n), by transposing
    /// both operands through the right-solve path.
    pub fn solve_left(
        &self,
        a: &Matrix<BigInt>,
        b: &Matrix<BigInt>,
    ) -> Result<(Matrix<BigInt>, BigInt)> {
        if !a.is_square() {
            return Err(Error::NotSquare {
                rows: a.rows(),
                cols: a.cols(),
            });
        }
        if b.cols() != a.cols() {
            return Err(Error::shape_mismatch(a.dims(), b.dims()));
        }
        let (ct, d) = self.solve_right(&a.transpose(), &b.transpose())?;
        Ok((ct.transpose(), d))
    }

    /// Inverse up to a denominator: `A·B = d·I`. Singular A is an error.
    pub fn invert(&self, a: &Matrix<BigInt>) -> Result<(Matrix<BigInt>, BigInt)> {
        if !a.is_square() {
            return Err(Error::NotSquare {
                rows: a.rows(),
                cols: a.cols(),
            });
        }
        self.solve_right(a, &Matrix::identity(a.rows()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EliminationEngine;
    use num_traits::One;

    fn m(rows: usize, cols: usize, vals: &[i64]) -> Matrix<BigInt> {
        Matrix::from_flat(vals.iter().map(|&v| BigInt::from(v)).collect(), rows, cols)
    }

    #[test]
    fn solve_right_exact() {
        let engine = EliminationEngine::new();
        let solver = Solver::new(&engine);
        let a = m(2, 2, &[2, 1, 1, 3]);
        let b = m(2, 1, &[5, 10]);
        let (c, d) = solver.solve_right(&a, &b).unwrap();
        assert_eq!(a.mul_checked(&c).unwrap(), m(2, 1, &[5 * 1, 10 * 1]));
        assert_eq!(d, BigInt::one());
    }

    #[test]
    fn solve_left_transposed_convention() {
        let engine = EliminationEngine::new();
        let solver = Solver::new(&engine);
        let a = m(2, 2, &[2, 1, 1, 3]);
        let b = m(1, 2, &[5, 10]);
        let (c, d) = solver.solve_left(&a, &b).unwrap();
        // C·A = d·B
        let ca = c.mul_checked(&a).unwrap();
        for j in 0..2 {
            assert_eq!(ca.get(0, j), &(&d * b.get(0, j)));
        }
    }

    #[test]
    fn invert_against_identity() {
        let engine = EliminationEngine::new();
        let solver = Solver::new(&engine);
        let a = m(2, 2, &[1, 2, 3, 4]);
        let (b, d) = solver.invert(&a).unwrap();
        let ab = a.mul_checked(&b).unwrap();
        let mut di = Matrix::zeros(2, 2);
        for i in 0..2 {
            *di.get_mut(i, i) = d.clone();
        }
        assert_eq!(ab, di);
    }

    #[test]
    fn shape_errors() {
        let engine = EliminationEngine::new();
        let solver = Solver::new(&engine);
        let a = m(2, 3, &[1, 2, 3, 4, 5, 6]);
        assert!(matches!(
            solver.invert(&a),
            Err(Error::NotSquare { .. })
        ));

        let sq = m(2, 2, &[1, 0, 0, 1]);
        let b = m(3, 1, &[1, 2, 3]);
        assert!(matches!(
            solver.solve_right(&sq, &b),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn singular_reported() {
        let engine = EliminationEngine::new();
        let solver = Solver::new(&engine);
        let a = m(2, 2, &[1, 2, 2, 4]);
        assert!(matches!(solver.invert(&a), Err(Error::Singular)));
    }

    #[test]
    fn empty_system() {
        let engine = EliminationEngine::new();
        let solver = Solver::new(&engine);
        let a = Matrix::zeros(0, 0);
        let b = Matrix::zeros(0, 2);
        let (c, d) = solver.solve_right(&a, &b).unwrap();
        assert_eq!(c.dims(), (0, 2));
        assert_eq!(d, BigInt::one());
    }
}
