//! Dense host matrix representation
//!
//! Row-major dense matrices over arbitrary-precision entries. This is the
//! host-side layout every engine buffer is converted from and back into.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use crate::error::{Error, Result};

/// Dense matrix in row-major order.
///
/// Invariant: `data.len() == rows * cols`. Matrices with zero rows or zero
/// columns are ordinary values; operations that cannot handle them must
/// short-circuit before reaching an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T> Matrix<T> {
    /// Build a matrix from a flat row-major vector.
    pub fn from_flat(data: Vec<T>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols);
        Self { data, rows, cols }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// True when the matrix has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[i * self.cols + j]
    }

    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut T {
        &mut self.data[i * self.cols + j]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> {
        (0..self.rows).map(move |i| self.row(i))
    }
}

impl<T: Clone> Matrix<T> {
    /// Build a matrix from explicit rows. All rows must share one length.
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        for r in rows {
            if r.len() != ncols {
                return Err(Error::shape_mismatch((nrows, ncols), (1, r.len())));
            }
        }
        let mut data = Vec::with_capacity(nrows * ncols);
        for r in rows {
            data.extend(r.iter().cloned());
        }
        Ok(Self::from_flat(data, nrows, ncols))
    }

    /// Clone the entries of column `j` top to bottom.
    pub fn column(&self, j: usize) -> Vec<T> {
        (0..self.rows).map(|i| self.get(i, j).clone()).collect()
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.rows * self.cols);
        for j in 0..self.cols {
            for i in 0..self.rows {
                data.push(self.get(i, j).clone());
            }
        }
        Self::from_flat(data, self.cols, self.rows)
    }
}

impl<T: Clone + Default> Matrix<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::default(); rows * cols],
            rows,
            cols,
        }
    }
}

impl Matrix<BigInt> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![BigInt::zero(); rows * cols],
            rows,
            cols,
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            *m.get_mut(i, i) = BigInt::one();
        }
        m
    }

    /// Exact product, shape-checked.
    pub fn mul_checked(&self, other: &Self) -> Result<Self> {
        if self.cols != other.rows {
            return Err(Error::shape_mismatch(self.dims(), other.dims()));
        }
        let mut out = Self::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a_ik = self.get(i, k);
                if a_ik.is_zero() {
                    continue;
                }
                for j in 0..other.cols {
                    *out.get_mut(i, j) += a_ik * other.get(k, j);
                }
            }
        }
        Ok(out)
    }

    /// Exact matrix-vector product, shape-checked.
    pub fn mul_vec(&self, x: &[BigInt]) -> Result<Vec<BigInt>> {
        if self.cols != x.len() {
            return Err(Error::shape_mismatch(self.dims(), (x.len(), 1)));
        }
        let mut out = vec![BigInt::zero(); self.rows];
        for i in 0..self.rows {
            for j in 0..self.cols {
                out[i] += self.get(i, j) * &x[j];
            }
        }
        Ok(out)
    }

    /// Trace of a square matrix.
    pub fn trace(&self) -> Result<BigInt> {
        if !self.is_square() {
            return Err(Error::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let mut t = BigInt::zero();
        for i in 0..self.rows {
            t += self.get(i, i);
        }
        Ok(t)
    }

    /// Largest absolute entry, or zero for an empty matrix.
    pub fn max_abs_entry(&self) -> BigInt {
        let mut max = BigInt::zero();
        for v in &self.data {
            let a = v.abs();
            if a > max {
                max = a;
            }
        }
        max
    }

    /// True when every entry is zero.
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(Zero::is_zero)
    }

    /// `self - t * I` for a square matrix; used by the eigen path.
    pub fn sub_scalar_diag(&self, t: &BigInt) -> Result<Self> {
        if !self.is_square() {
            return Err(Error::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let mut out = self.clone();
        for i in 0..self.rows {
            *out.get_mut(i, i) -= t;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: usize, cols: usize, vals: &[i64]) -> Matrix<BigInt> {
        Matrix::from_flat(vals.iter().map(|&v| BigInt::from(v)).collect(), rows, cols)
    }

    #[test]
    fn access_and_transpose() {
        let a = m(2, 3, &[0, 1, 2, 3, 4, 5]);
        assert_eq!(a.get(1, 2), &BigInt::from(5));
        let t = a.transpose();
        assert_eq!(t.dims(), (3, 2));
        assert_eq!(t.get(2, 1), &BigInt::from(5));
        assert_eq!(t.transpose(), a);
    }

    #[test]
    fn multiply() {
        let a = m(2, 2, &[1, 2, 3, 4]);
        let id = Matrix::identity(2);
        assert_eq!(a.mul_checked(&id).unwrap(), a);

        let b = m(2, 1, &[1, 1]);
        let ab = a.mul_checked(&b).unwrap();
        assert_eq!(ab, m(2, 1, &[3, 7]));
    }

    #[test]
    fn multiply_shape_mismatch() {
        let a = m(2, 3, &[0, 1, 2, 3, 4, 5]);
        let b = m(2, 2, &[1, 0, 0, 1]);
        assert!(matches!(
            a.mul_checked(&b),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn empty_matrices_are_values() {
        let a = Matrix::<BigInt>::zeros(0, 3);
        assert!(a.is_empty());
        assert_eq!(a.transpose().dims(), (3, 0));
    }
}
