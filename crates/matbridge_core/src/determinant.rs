//! Exact determinant over a residue basis
//!
//! Reduces the matrix modulo enough 31-bit primes to clear the Hadamard
//! bound, runs the elimination engine per prime, and reconstructs the
//! signed determinant. The 0×0 determinant is 1 by convention and never
//! reaches the engine.

use num_bigint::BigInt;
use num_traits::{One, Zero};
use tracing::debug;

use crate::crt;
use crate::engine::ModularEngine;
use crate::error::{Error, Result};
use crate::interrupt::{InterruptFlag, InterruptGuard};
use crate::layout::{self, EngineLayout};
use crate::matrix::Matrix;
use crate::primes::{PrimeSource, ResidueBasis};

/// CRT determinant calculator over a modular engine.
pub struct Determinant<'e, E: ModularEngine> {
    engine: &'e E,
    flag: InterruptFlag,
}

impl<'e, E: ModularEngine> Determinant<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self {
            engine,
            flag: InterruptFlag::new(),
        }
    }

    pub fn with_interrupt(engine: &'e E, flag: InterruptFlag) -> Self {
        Self { engine, flag }
    }

    /// Exact determinant of a square integer matrix.
    pub fn compute(&self, m: &Matrix<BigInt>) -> Result<BigInt> {
        if !m.is_square() {
            return Err(Error::NotSquare {
                rows: m.rows(),
                cols: m.cols(),
            });
        }
        if m.is_empty() {
            // The engine rejects empty buffers; det of 0x0 is 1.
            return Ok(BigInt::one());
        }

        let guard = InterruptGuard::enter(&self.flag);
        let n = m.rows();

        let buf = layout::to_engine(m, EngineLayout::HOST)?;
        let cells = buf.as_slice();

        let basis = ResidueBasis::new(PrimeSource::primes_31bit(prime_count(m)));
        debug!(n, primes = basis.len(), engine = self.engine.name(), "crt determinant");

        let mut residues = Vec::with_capacity(basis.len());
        for &p in &basis.primes {
            guard.checkpoint()?;
            let reduced: Vec<u32> = cells.iter().map(|v| mod_u32(v, p)).collect();
            residues.push(self.engine.determinant_mod(&reduced, n, p, &guard)?);
        }

        Ok(crt::reconstruct_signed(&residues, &basis))
    }
}

/// Primes needed so the basis product exceeds twice the Hadamard bound.
fn prime_count(m: &Matrix<BigInt>) -> usize {
    let n = m.rows();
    let mut had2 = BigInt::one();
    for i in 0..n {
        let mut norm2 = BigInt::zero();
        for j in 0..n {
            let v = m.get(i, j);
            norm2 += v * v;
        }
        if norm2.is_zero() {
            norm2 = BigInt::one();
        }
        had2 *= norm2;
    }
    // |det| <= sqrt(had2); signed reconstruction needs one extra bit.
    PrimeSource::primes_for_bits(had2.bits() / 2 + 2)
}

fn mod_u32(v: &BigInt, p: u32) -> u32 {
    let m = BigInt::from(p);
    let r = ((v % &m) + &m) % &m;
    r.to_u32_digits().1.first().copied().unwrap_or(0)
}
