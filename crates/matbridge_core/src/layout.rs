//! Entry-layout conversion between host matrices and engine buffers
//!
//! Each engine consumes a flat buffer of cells in its own stride order. The
//! host is row-major; the scratch-stack engine wants column-major with the
//! column order reversed. [`EngineLayout`] is the explicit conversion
//! descriptor: source element positions are remapped cell by cell, in both
//! directions, without ever mutating the source.

use num_bigint::BigInt;

use crate::error::{Error, Result};
use crate::lease::CellBuffer;
use crate::matrix::Matrix;

/// Stride order of a flat engine buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrideOrder {
    RowMajor,
    ColumnMajor,
}

/// Conversion descriptor: how an engine lays out an R×C matrix in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineLayout {
    pub order: StrideOrder,
    /// Columns stored in reversed order (last host column first).
    pub reversed_cols: bool,
}

impl EngineLayout {
    /// The host's own convention; conversion is a straight copy.
    pub const HOST: Self = Self {
        order: StrideOrder::RowMajor,
        reversed_cols: false,
    };

    /// The scratch-stack engine's convention: column-major, columns reversed.
    /// Result conversion must un-reverse and transpose back.
    pub const STACK: Self = Self {
        order: StrideOrder::ColumnMajor,
        reversed_cols: true,
    };

    /// Flat position of host entry (i, j) in a buffer with this layout.
    #[inline]
    pub fn position(&self, rows: usize, cols: usize, i: usize, j: usize) -> usize {
        let j = if self.reversed_cols { cols - 1 - j } else { j };
        match self.order {
            StrideOrder::RowMajor => i * cols + j,
            StrideOrder::ColumnMajor => j * rows + i,
        }
    }
}

/// Checked buffer length for an R×C conversion. Fails loudly instead of
/// truncating when the product overflows `usize`.
pub fn checked_len(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .ok_or(Error::AllocationTooLarge { rows, cols })
}

/// Copy a host matrix into a freshly allocated engine buffer.
pub fn to_engine(m: &Matrix<BigInt>, layout: EngineLayout) -> Result<CellBuffer<BigInt>> {
    let (rows, cols) = m.dims();
    let len = checked_len(rows, cols)?;
    let mut cells = vec![BigInt::default(); len];
    for i in 0..rows {
        for j in 0..cols {
            cells[layout.position(rows, cols, i, j)] = m.get(i, j).clone();
        }
    }
    Ok(CellBuffer::from_cells(cells, rows, cols))
}

/// Copy an engine buffer back into a freshly allocated host matrix.
///
/// `rows`/`cols` are the host dimensions of the result, which for several
/// operations are only known after the engine call.
pub fn from_engine(buf: &CellBuffer<BigInt>, layout: EngineLayout) -> Matrix<BigInt> {
    let (rows, cols) = (buf.rows(), buf.cols());
    let cells = buf.as_slice();
    let mut out = Matrix::zeros(rows, cols);
    for i in 0..rows {
        for j in 0..cols {
            *out.get_mut(i, j) = cells[layout.position(rows, cols, i, j)].clone();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: usize, cols: usize, vals: &[i64]) -> Matrix<BigInt> {
        Matrix::from_flat(vals.iter().map(|&v| BigInt::from(v)).collect(), rows, cols)
    }

    #[test]
    fn host_layout_is_identity() {
        let a = m(2, 3, &[1, 2, 3, 4, 5, 6]);
        let buf = to_engine(&a, EngineLayout::HOST).unwrap();
        let flat: Vec<i64> = buf.as_slice().iter().map(|v| v.try_into().unwrap()).collect();
        assert_eq!(flat, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(from_engine(&buf, EngineLayout::HOST), a);
    }

    #[test]
    fn stack_layout_transposes_and_reverses() {
        // [[1, 2], [3, 4]] -> columns reversed, column-major:
        // column 1 = (2, 4) first, then column 0 = (1, 3)
        let a = m(2, 2, &[1, 2, 3, 4]);
        let buf = to_engine(&a, EngineLayout::STACK).unwrap();
        let flat: Vec<i64> = buf.as_slice().iter().map(|v| v.try_into().unwrap()).collect();
        assert_eq!(flat, vec![2, 4, 1, 3]);
        assert_eq!(from_engine(&buf, EngineLayout::STACK), a);
    }

    #[test]
    fn round_trip_rectangular() {
        let a = m(3, 2, &[1, -2, 3, -4, 5, -6]);
        for layout in [EngineLayout::HOST, EngineLayout::STACK] {
            let buf = to_engine(&a, layout).unwrap();
            assert_eq!(from_engine(&buf, layout), a);
        }
    }

    #[test]
    fn empty_round_trip() {
        let a = Matrix::<BigInt>::zeros(0, 4);
        let buf = to_engine(&a, EngineLayout::STACK).unwrap();
        assert!(buf.is_empty());
        assert_eq!(from_engine(&buf, EngineLayout::STACK).dims(), (0, 4));
    }
}
