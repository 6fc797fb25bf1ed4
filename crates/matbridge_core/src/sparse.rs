//! Compressed sparse row layout
//!
//! The row-list layout some engines consume: values in row order, paired
//! column indices, and per-row offsets. Conversion to and from the dense
//! host layout is loss-free; zero entries are dropped on the way in.

use num_bigint::BigInt;
use num_traits::Zero;

use crate::error::{Error, Result};
use crate::matrix::Matrix;

/// CSR matrix over exact integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseMatrix {
    pub nrows: usize,
    pub ncols: usize,
    /// Nonzero values in row-major order.
    pub values: Vec<BigInt>,
    /// Column index of each value.
    pub col_indices: Vec<usize>,
    /// Row i spans values[row_ptrs[i]..row_ptrs[i+1]].
    pub row_ptrs: Vec<usize>,
}

impl SparseMatrix {
    /// Build from coordinate entries; duplicates are rejected by debug
    /// assertion, zeros are dropped.
    pub fn from_coo(nrows: usize, ncols: usize, entries: &[(usize, usize, BigInt)]) -> Self {
        let mut sorted: Vec<_> = entries.to_vec();
        sorted.sort_by_key(|(r, c, _)| (*r, *c));

        let mut values = Vec::with_capacity(sorted.len());
        let mut col_indices = Vec::with_capacity(sorted.len());
        let mut row_ptrs = vec![0usize; nrows + 1];

        for (row, col, val) in sorted {
            debug_assert!(row < nrows && col < ncols);
            if !val.is_zero() {
                values.push(val);
                col_indices.push(col);
                row_ptrs[row + 1] += 1;
            }
        }
        for i in 1..=nrows {
            row_ptrs[i] += row_ptrs[i - 1];
        }

        Self {
            nrows,
            ncols,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Convert a dense host matrix into the row-list layout.
    pub fn from_dense(dense: &Matrix<BigInt>) -> Self {
        let (nrows, ncols) = dense.dims();
        let mut values = Vec::new();
        let mut col_indices = Vec::new();
        let mut row_ptrs = Vec::with_capacity(nrows + 1);
        row_ptrs.push(0);

        for i in 0..nrows {
            for (j, v) in dense.row(i).iter().enumerate() {
                if !v.is_zero() {
                    values.push(v.clone());
                    col_indices.push(j);
                }
            }
            row_ptrs.push(values.len());
        }

        Self {
            nrows,
            ncols,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Convert back into a freshly allocated dense host matrix.
    pub fn to_dense(&self) -> Matrix<BigInt> {
        let mut out = Matrix::zeros(self.nrows, self.ncols);
        for i in 0..self.nrows {
            for k in self.row_ptrs[i]..self.row_ptrs[i + 1] {
                *out.get_mut(i, self.col_indices[k]) = self.values[k].clone();
            }
        }
        out
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Exact sparse matrix-vector product.
    pub fn matvec(&self, x: &[BigInt]) -> Result<Vec<BigInt>> {
        if x.len() != self.ncols {
            return Err(Error::shape_mismatch((self.nrows, self.ncols), (x.len(), 1)));
        }
        let mut y = vec![BigInt::zero(); self.nrows];
        for i in 0..self.nrows {
            for k in self.row_ptrs[i]..self.row_ptrs[i + 1] {
                y[i] += &self.values[k] * &x[self.col_indices[k]];
            }
        }
        Ok(y)
    }
}
