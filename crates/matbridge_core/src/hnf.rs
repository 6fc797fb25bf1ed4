//! Hermite normal form through the scratch-stack engine
//!
//! The engine consumes a column-major, column-reversed buffer and keeps its
//! working copy on the process-wide scratch stack; the result converter
//! un-reverses and transposes back into the host layout and drops trailing
//! zero rows when asked. Row convention: pivots positive, entries above a
//! pivot reduced into [0, pivot).

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use tracing::debug;

use crate::error::Result;
use crate::interrupt::{InterruptFlag, InterruptGuard};
use crate::layout::{self, EngineLayout};
use crate::lease::CellBuffer;
use crate::matrix::Matrix;
use crate::scratch::ScratchSession;

/// Options for [`hermite_form`].
#[derive(Debug, Clone, Copy)]
pub struct HnfOptions {
    /// Keep the trailing all-zero rows of the reduced matrix.
    pub include_zero_rows: bool,
}

impl Default for HnfOptions {
    fn default() -> Self {
        Self {
            include_zero_rows: true,
        }
    }
}

/// Row-style Hermite normal form of an integer matrix.
pub fn hermite_form(
    m: &Matrix<BigInt>,
    opts: HnfOptions,
    flag: &InterruptFlag,
) -> Result<Matrix<BigInt>> {
    let (rows, cols) = m.dims();

    // The engine rejects empty buffers; an empty matrix is its own HNF.
    if m.is_empty() {
        return Ok(if opts.include_zero_rows {
            m.clone()
        } else {
            Matrix::zeros(0, cols)
        });
    }

    let guard = InterruptGuard::enter(flag);

    let buf = layout::to_engine(m, EngineLayout::STACK)?;
    let mut session = ScratchSession::open();
    let range = session.alloc(buf.len())?;
    session
        .cells_mut(range.clone())
        .clone_from_slice(buf.as_slice());

    let rank = hnf_rows(session.cells_mut(range.clone()), rows, cols, &guard)?;
    debug!(rows, cols, rank, "hermite form computed");

    // Result conversion: un-reverse and transpose back, then size by the
    // rank the engine reported.
    let out_buf = CellBuffer::from_cells(session.cells(range).to_vec(), rows, cols);
    drop(session);
    let full = layout::from_engine(&out_buf, EngineLayout::STACK);

    if opts.include_zero_rows {
        Ok(full)
    } else {
        let kept = full.as_slice()[..rank * cols].to_vec();
        Ok(Matrix::from_flat(kept, rank, cols))
    }
}

/// In-place row HNF over a buffer in the stack engine's layout. Returns the
/// number of nonzero rows (the rank).
fn hnf_rows(a: &mut [BigInt], rows: usize, cols: usize, guard: &InterruptGuard) -> Result<usize> {
    let lay = EngineLayout::STACK;
    let idx = |i: usize, j: usize| lay.position(rows, cols, i, j);

    let mut r = 0usize;
    for c in 0..cols {
        if r == rows {
            break;
        }
        guard.checkpoint()?;

        // Euclidean reduction of column c across rows r..: keep moving the
        // smallest nonzero entry up and reducing the others by it.
        loop {
            let mut best: Option<usize> = None;
            for i in r..rows {
                if a[idx(i, c)].is_zero() {
                    continue;
                }
                best = match best {
                    Some(b) if a[idx(b, c)].abs() <= a[idx(i, c)].abs() => Some(b),
                    _ => Some(i),
                };
            }
            let best = match best {
                Some(b) => b,
                None => break,
            };
            if best != r {
                for j in 0..cols {
                    a.swap(idx(best, j), idx(r, j));
                }
            }

            let mut reduced_all = true;
            for i in (r + 1)..rows {
                if a[idx(i, c)].is_zero() {
                    continue;
                }
                let q = &a[idx(i, c)] / &a[idx(r, c)];
                if !q.is_zero() {
                    for j in 0..cols {
                        let delta = &q * &a[idx(r, j)];
                        a[idx(i, j)] -= delta;
                    }
                }
                if !a[idx(i, c)].is_zero() {
                    reduced_all = false;
                }
            }
            if reduced_all {
                break;
            }
        }

        if a[idx(r, c)].is_zero() {
            continue;
        }
        if a[idx(r, c)].is_negative() {
            for j in 0..cols {
                let neg = -&a[idx(r, j)];
                a[idx(r, j)] = neg;
            }
        }

        // Normalize entries above the pivot into [0, pivot).
        for i in 0..r {
            let q = num_integer::Integer::div_floor(&a[idx(i, c)], &a[idx(r, c)]);
            if !q.is_zero() {
                for j in 0..cols {
                    let delta = &q * &a[idx(r, j)];
                    a[idx(i, j)] -= delta;
                }
            }
        }

        r += 1;
    }

    Ok(r)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: usize, cols: usize, vals: &[i64]) -> Matrix<BigInt> {
        Matrix::from_flat(vals.iter().map(|&v| BigInt::from(v)).collect(), rows, cols)
    }

    fn hnf(mat: &Matrix<BigInt>) -> Matrix<BigInt> {
        hermite_form(mat, HnfOptions::default(), &InterruptFlag::new()).unwrap()
    }

    #[test]
    fn already_reduced_is_fixed() {
        let a = m(2, 2, &[1, 0, 0, 1]);
        assert_eq!(hnf(&a), a);

        let b = m(2, 3, &[2, 1, 0, 0, 3, 1]);
        assert_eq!(hnf(&b), b);
    }

    #[test]
    fn reduces_simple_matrix() {
        // rows (2, 4), (1, 3): HNF is [[1, 1], [0, 2]]
        let a = m(2, 2, &[2, 4, 1, 3]);
        assert_eq!(hnf(&a), m(2, 2, &[1, 1, 0, 2]));
    }

    #[test]
    fn idempotent() {
        let a = m(3, 3, &[4, 7, 2, 6, 1, 9, 2, 2, 2]);
        let h = hnf(&a);
        assert_eq!(hnf(&h), h);
    }

    #[test]
    fn zero_rows_dropped_on_request() {
        let a = m(3, 2, &[1, 2, 2, 4, 3, 6]);
        let full = hnf(&a);
        assert_eq!(full.dims(), (3, 2));
        assert!(full.row(1).iter().all(Zero::is_zero) || full.row(2).iter().all(Zero::is_zero));

        let trimmed = hermite_form(
            &a,
            HnfOptions {
                include_zero_rows: false,
            },
            &InterruptFlag::new(),
        )
        .unwrap();
        assert_eq!(trimmed.dims(), (1, 2));
        assert_eq!(trimmed, m(1, 2, &[1, 2]));
    }

    #[test]
    fn pivots_positive_entries_reduced() {
        let a = m(2, 2, &[-2, 0, 3, 1]);
        let h = hnf(&a);
        // Pivots positive; above-pivot entries in [0, pivot).
        assert_eq!(h, m(2, 2, &[1, 1, 0, 2]));
    }

    #[test]
    fn empty_inputs_bypass_engine() {
        let a = Matrix::<BigInt>::zeros(0, 3);
        assert_eq!(hnf(&a).dims(), (0, 3));
        let b = Matrix::<BigInt>::zeros(3, 0);
        assert_eq!(hnf(&b).dims(), (3, 0));
        let trimmed = hermite_form(
            &b,
            HnfOptions {
                include_zero_rows: false,
            },
            &InterruptFlag::new(),
        )
        .unwrap();
        assert_eq!(trimmed.dims(), (0, 0));
    }
}
