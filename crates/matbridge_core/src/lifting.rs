//! Dixon p-adic lifting for exact linear solving
//!
//! Solves A·X = d·B over the integers: invert A modulo one prime, lift the
//! solution digit by digit past the Hadamard-derived bound, then rationally
//! reconstruct every entry and clear denominators. The factorization cost
//! is paid once for all right-hand sides.

use num_bigint::BigInt;
use num_integer::{Integer, Roots};
use num_traits::{One, Signed, Zero};
use tracing::debug;

use crate::engine::ModularEngine;
use crate::error::{Error, Result};
use crate::interrupt::InterruptGuard;
use crate::layout::{self, EngineLayout};
use crate::matrix::Matrix;
use crate::primes::PrimeSource;
use crate::rank;

/// Configuration for the lifting engine.
#[derive(Debug, Clone)]
pub struct LiftingConfig {
    /// Prime to lift with; must leave intermediates inside u64.
    pub prime: u32,
    /// Trial primes before certifying singularity exactly.
    pub prime_retries: usize,
}

impl Default for LiftingConfig {
    fn default() -> Self {
        Self {
            // Largest 31-bit prime.
            prime: 2_147_483_629,
            prime_retries: 4,
        }
    }
}

/// Exact multi-RHS solver over the lifting engine.
pub struct Lifting<'e, E: ModularEngine> {
    engine: &'e E,
    config: LiftingConfig,
}

impl<'e, E: ModularEngine> Lifting<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self {
            engine,
            config: LiftingConfig::default(),
        }
    }

    pub fn with_config(engine: &'e E, config: LiftingConfig) -> Self {
        Self { engine, config }
    }

    /// Solve A·X = d·B exactly for square A (n×n) and B (n×m).
    ///
    /// Returns the integer matrix X and the positive denominator d. The
    /// caller is responsible for shape checks; A singular over the rationals
    /// surfaces as [`Error::Singular`].
    pub fn solve(
        &self,
        a: &Matrix<BigInt>,
        b: &Matrix<BigInt>,
        guard: &InterruptGuard,
    ) -> Result<(Matrix<BigInt>, BigInt)> {
        let n = a.rows();
        let m = b.cols();
        debug_assert!(a.is_square());
        debug_assert_eq!(b.rows(), n);

        if n == 0 {
            return Ok((Matrix::zeros(0, m), BigInt::one()));
        }

        let a_buf = layout::to_engine(a, EngineLayout::HOST)?;
        let a_cells = a_buf.as_slice();

        let (p, a_inv) = self.choose_prime(a, a_cells, n, guard)?;
        let iterations = lift_iterations(a, b, p);
        debug!(prime = p, iterations, rhs = m, "dixon lifting");

        let a_mod = reduce_mod(a_cells, p);
        let p_big = BigInt::from(p);

        // Accumulated p-adic solutions and integer residuals, per column.
        let mut x: Vec<Vec<BigInt>> = vec![vec![BigInt::zero(); n]; m];
        let mut res: Vec<Vec<BigInt>> = (0..m).map(|j| b.column(j)).collect();
        let mut p_pow = BigInt::one();

        for _ in 0..iterations {
            guard.checkpoint()?;
            for col in 0..m {
                let r_mod: Vec<u32> = res[col].iter().map(|v| bigint_mod_u32(v, p)).collect();
                let digit = self.engine.matvec_mod(&a_inv, &r_mod, n, p);

                for i in 0..n {
                    x[col][i] += &p_pow * BigInt::from(digit[i]);
                }
                // res = (res - A·digit) / p, exact since A·digit ≡ res mod p.
                for i in 0..n {
                    let mut s = BigInt::zero();
                    for j in 0..n {
                        s += &a_cells[i * n + j] * BigInt::from(digit[j]);
                    }
                    res[col][i] = (&res[col][i] - s) / &p_big;
                }
            }
            p_pow *= &p_big;
        }

        self.reconstruct_solution(a, b, x, &p_pow, guard)
    }

    /// Pick a lifting prime where A is invertible. If every trial prime
    /// fails, certify with an exact determinant before reporting
    /// singularity: a nonsingular A only looks singular mod p when p
    /// divides det(A).
    fn choose_prime(
        &self,
        a: &Matrix<BigInt>,
        a_cells: &[BigInt],
        n: usize,
        guard: &InterruptGuard,
    ) -> Result<(u32, Vec<u32>)> {
        let mut candidates = PrimeSource::primes_31bit(self.config.prime_retries.max(1));
        if !candidates.contains(&self.config.prime) {
            candidates.insert(0, self.config.prime);
        }
        for &p in &candidates {
            let a_mod = reduce_mod(a_cells, p);
            if let Some(inv) = self.engine.inverse_mod(&a_mod, n, p, guard)? {
                return Ok((p, inv));
            }
        }

        let mut work = a_cells.to_vec();
        let (r, det) = rank::bareiss_echelon(&mut work, n, n, guard)?;
        if r < n || det.is_zero() {
            return Err(Error::Singular);
        }
        let p = PrimeSource::primes_31bit(64)
            .into_iter()
            .find(|&p| !(&det % BigInt::from(p)).is_zero())
            .ok_or(Error::EngineFailure("no usable lifting prime"))?;
        let a_mod = reduce_mod(a_cells, p);
        let inv = self
            .engine
            .inverse_mod(&a_mod, n, p, guard)?
            .ok_or(Error::EngineFailure("certified prime rejected by engine"))?;
        Ok((p, inv))
    }

    fn reconstruct_solution(
        &self,
        a: &Matrix<BigInt>,
        b: &Matrix<BigInt>,
        x: Vec<Vec<BigInt>>,
        modulus: &BigInt,
        guard: &InterruptGuard,
    ) -> Result<(Matrix<BigInt>, BigInt)> {
        let n = a.rows();
        let m = b.cols();
        let bound = (modulus / BigInt::from(2)).sqrt();

        let mut numerators = vec![BigInt::zero(); n * m];
        let mut denominators = vec![BigInt::one(); n * m];
        let mut denom = BigInt::one();

        for (col, col_vals) in x.iter().enumerate() {
            guard.checkpoint()?;
            for (i, val) in col_vals.iter().enumerate() {
                let (num, den) = rational_reconstruct(val, modulus, &bound)
                    .ok_or(Error::EngineFailure("rational reconstruction failed"))?;
                denom = denom.lcm(&den);
                numerators[i * m + col] = num;
                denominators[i * m + col] = den;
            }
        }

        let mut out = Matrix::zeros(n, m);
        for i in 0..n {
            for j in 0..m {
                let scale = &denom / &denominators[i * m + j];
                *out.get_mut(i, j) = &numerators[i * m + j] * scale;
            }
        }

        // Exact acceptance check: A·X must equal d·B.
        guard.checkpoint()?;
        let ax = a.mul_checked(&out)?;
        for i in 0..n {
            for j in 0..m {
                if ax.get(i, j) != &(&denom * b.get(i, j)) {
                    return Err(Error::EngineFailure("lifted solution failed verification"));
                }
            }
        }

        Ok((out, denom))
    }
}

/// Lifting iterations needed so p^k clears 2·N·D for the Cramer bounds on
/// numerators (N) and the denominator (D), both controlled by the column
/// Hadamard bound of A and the magnitude of B.
fn lift_iterations(a: &Matrix<BigInt>, b: &Matrix<BigInt>, p: u32) -> usize {
    let n = a.rows();
    let mut had2 = BigInt::one();
    for j in 0..a.cols() {
        let mut norm2 = BigInt::zero();
        for i in 0..n {
            let v = a.get(i, j);
            norm2 += v * v;
        }
        if norm2.is_zero() {
            norm2 = BigInt::one();
        }
        had2 *= norm2;
    }
    let bmax = {
        let m = b.max_abs_entry();
        if m.is_zero() {
            BigInt::one()
        } else {
            m
        }
    };
    // (2·N·D)^2 <= 4 · had2^2 · n · bmax^2
    let bound2 = BigInt::from(4) * &had2 * &had2 * BigInt::from(n.max(1)) * &bmax * &bmax;
    let p_bits = 31u64.min(64 - u64::from(p).leading_zeros() as u64);
    (bound2.bits() / (2 * p_bits.max(1)) + 2) as usize
}

/// Reduce a buffer of signed big integers into [0, p).
fn reduce_mod(cells: &[BigInt], p: u32) -> Vec<u32> {
    cells.iter().map(|v| bigint_mod_u32(v, p)).collect()
}

fn bigint_mod_u32(v: &BigInt, p: u32) -> u32 {
    let m = BigInt::from(p);
    let r = ((v % &m) + &m) % &m;
    r.to_u32_digits().1.first().copied().unwrap_or(0)
}

/// Reconstruct n/d ≡ x (mod m) with |n| ≤ bound and 0 < d, by the
/// half-extended Euclidean algorithm.
fn rational_reconstruct(x: &BigInt, m: &BigInt, bound: &BigInt) -> Option<(BigInt, BigInt)> {
    let (mut r0, mut r1) = (m.clone(), x.mod_floor(m));
    let (mut t0, mut t1) = (BigInt::zero(), BigInt::one());
    while &r1 > bound {
        let q = &r0 / &r1;
        let r = &r0 - &q * &r1;
        r0 = std::mem::replace(&mut r1, r);
        let t = &t0 - &q * &t1;
        t0 = std::mem::replace(&mut t1, t);
    }
    if t1.is_zero() {
        return None;
    }
    let (mut num, mut den) = (r1, t1);
    if den.is_negative() {
        num = -num;
        den = -den;
    }
    let g = num.gcd(&den);
    if !g.is_one() && !g.is_zero() {
        num /= &g;
        den /= &g;
    }
    if ((x * &den - &num) % m).is_zero() {
        Some((num, den))
    } else {
        None
    }
}
