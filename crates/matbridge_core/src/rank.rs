//! Fraction-free elimination: exact rank and determinant
//!
//! Bareiss one-step elimination keeps every intermediate an integer (each is
//! a minor of the input), so rank and determinant come out exact without
//! rational arithmetic. This is the certification path the lifting engine
//! falls back to when a matrix looks singular modulo its trial primes.

use num_bigint::BigInt;
use num_traits::{One, Zero};

use crate::error::{Error, Result};
use crate::interrupt::{InterruptFlag, InterruptGuard};
use crate::layout::{self, EngineLayout};
use crate::matrix::Matrix;

/// Exact rank of an arbitrary integer matrix.
pub fn rank(m: &Matrix<BigInt>, flag: &InterruptFlag) -> Result<usize> {
    if m.is_empty() {
        return Ok(0);
    }
    let guard = InterruptGuard::enter(flag);
    let mut buf = layout::to_engine(m, EngineLayout::HOST)?;
    let (rank, _) = bareiss_echelon(buf.as_mut_slice(), m.rows(), m.cols(), &guard)?;
    Ok(rank)
}

/// Exact determinant by fraction-free elimination. The 0×0 determinant is 1
/// by convention and bypasses the engine.
pub fn determinant_bareiss(m: &Matrix<BigInt>, flag: &InterruptFlag) -> Result<BigInt> {
    if !m.is_square() {
        return Err(Error::NotSquare {
            rows: m.rows(),
            cols: m.cols(),
        });
    }
    if m.is_empty() {
        return Ok(BigInt::one());
    }
    let guard = InterruptGuard::enter(flag);
    let mut buf = layout::to_engine(m, EngineLayout::HOST)?;
    let (rank, det) = bareiss_echelon(buf.as_mut_slice(), m.rows(), m.cols(), &guard)?;
    if rank < m.rows() {
        return Ok(BigInt::zero());
    }
    Ok(det)
}

/// In-place fraction-free echelon form of a flat row-major buffer.
///
/// Returns the rank and, when the matrix is square with full rank, its
/// determinant (the final pivot with the row-swap sign applied).
pub(crate) fn bareiss_echelon(
    a: &mut [BigInt],
    rows: usize,
    cols: usize,
    guard: &InterruptGuard,
) -> Result<(usize, BigInt)> {
    let mut prev = BigInt::one();
    let mut sign = 1i32;
    let mut r = 0usize;

    for c in 0..cols {
        if r == rows {
            break;
        }
        guard.checkpoint()?;

        let pivot = match (r..rows).find(|&i| !a[i * cols + c].is_zero()) {
            Some(i) => i,
            None => continue,
        };
        if pivot != r {
            for j in 0..cols {
                a.swap(r * cols + j, pivot * cols + j);
            }
            sign = -sign;
        }

        for i in (r + 1)..rows {
            for j in (c + 1)..cols {
                let num = &a[r * cols + c] * &a[i * cols + j] - &a[i * cols + c] * &a[r * cols + j];
                // Exact by the Bareiss identity: num is prev times a minor.
                a[i * cols + j] = num / &prev;
            }
            a[i * cols + c] = BigInt::zero();
        }

        prev = a[r * cols + c].clone();
        r += 1;
    }

    let det = if sign < 0 { -prev } else { prev };
    Ok((r, det))
}
