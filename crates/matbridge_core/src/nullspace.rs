//! Exact right kernel extraction
//!
//! Reduces a rational working copy to reduced row echelon form, reads the
//! kernel dimension off the pivot set (it is only known after the engine
//! call), and converts each basis vector back to a primitive integer
//! column. The input matrix is never mutated.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use tracing::debug;

use crate::error::Result;
use crate::interrupt::{InterruptFlag, InterruptGuard};
use crate::layout;
use crate::lease::CellBuffer;
use crate::matrix::Matrix;
use crate::rational::Rational;

/// Basis of the right kernel of an R×C integer matrix, as a C×dim integer
/// matrix with primitive columns; `dim = C − rank`.
///
/// Degenerate inputs (0 rows or 0 columns) return a C×0 matrix without
/// entering the engine, which rejects empty buffers.
pub fn right_kernel(m: &Matrix<BigInt>, flag: &InterruptFlag) -> Result<Matrix<BigInt>> {
    if m.is_empty() {
        return Ok(Matrix::zeros(m.cols(), 0));
    }

    let guard = InterruptGuard::enter(flag);
    let (rows, cols) = m.dims();

    let len = layout::checked_len(rows, cols)?;
    let mut cells = Vec::with_capacity(len);
    for i in 0..rows {
        for j in 0..cols {
            cells.push(Rational::from_integer(m.get(i, j).clone()));
        }
    }
    let mut work = CellBuffer::from_cells(cells, rows, cols);

    let pivots = rref_in_place(work.as_mut_slice(), rows, cols, &guard)?;
    let dim = cols - pivots.len();
    debug!(rows, cols, rank = pivots.len(), kernel_dim = dim, "kernel extracted");

    // Result conversion: dimensions discovered from the engine result.
    let mut kernel = Matrix::zeros(cols, dim);
    let a = work.as_slice();
    let mut free_idx = 0usize;
    for f in 0..cols {
        if pivots.contains(&f) {
            continue;
        }
        guard.checkpoint()?;

        let mut v = vec![Rational::zero(); cols];
        v[f] = Rational::one();
        for (r, &pc) in pivots.iter().enumerate() {
            v[pc] = -&a[r * cols + f];
        }

        for (i, entry) in integer_primitive(&v).into_iter().enumerate() {
            *kernel.get_mut(i, free_idx) = entry;
        }
        free_idx += 1;
    }

    Ok(kernel)
}

/// Reduced row echelon form over the rationals, in place. Returns the
/// pivot columns in order.
fn rref_in_place(
    a: &mut [Rational],
    rows: usize,
    cols: usize,
    guard: &InterruptGuard,
) -> Result<Vec<usize>> {
    let mut pivots = Vec::new();
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
        }

        let inv = a[r * cols + c]
            .recip()
            .expect("pivot is nonzero by selection");
        for j in c..cols {
            a[r * cols + j] = &a[r * cols + j] * &inv;
        }

        for i in 0..rows {
            if i == r || a[i * cols + c].is_zero() {
                continue;
            }
            let factor = a[i * cols + c].clone();
            for j in c..cols {
                let delta = &factor * &a[r * cols + j];
                a[i * cols + j] = &a[i * cols + j] - &delta;
            }
        }

        pivots.push(c);
        r += 1;
    }

    Ok(pivots)
}

/// Clear denominators and divide by the content, keeping the sign of the
/// free-variable entry positive.
fn integer_primitive(v: &[Rational]) -> Vec<BigInt> {
    let mut l = BigInt::one();
    for x in v {
        l = l.lcm(x.denom());
    }
    let scaled: Vec<BigInt> = v.iter().map(|x| x.numer() * (&l / x.denom())).collect();

    let mut g = BigInt::zero();
    for x in &scaled {
        g = g.gcd(x);
    }
    if g.is_zero() || g.is_one() {
        return scaled;
    }
    scaled.into_iter().map(|x| x / &g).collect()
}
