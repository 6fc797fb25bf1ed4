//! Residue arithmetic engines
//!
//! The engines do the actual finite-field work: Gaussian elimination over
//! GF(p) with u32 residues. Callers hand in flat buffers already converted
//! by the layout module and poll the interrupt guard between pivot columns.

use crate::error::Result;
use crate::interrupt::InterruptGuard;

/// Engine interface for modular matrix kernels.
///
/// `Ok(None)` means the input was singular modulo `p`; an interrupt
/// surfaces as `Err(Interrupted)`.
pub trait ModularEngine: Send + Sync {
    /// Engine name, for logging.
    fn name(&self) -> &'static str;

    /// det(A) mod p for a flat row-major n×n buffer of residues.
    fn determinant_mod(&self, matrix: &[u32], n: usize, p: u32, guard: &InterruptGuard) -> Result<u32>;

    /// A^(-1) mod p, or `None` when A is singular mod p.
    fn inverse_mod(
        &self,
        matrix: &[u32],
        n: usize,
        p: u32,
        guard: &InterruptGuard,
    ) -> Result<Option<Vec<u32>>>;

    /// y = A·x mod p.
    fn matvec_mod(&self, matrix: &[u32], x: &[u32], n: usize, p: u32) -> Vec<u32>;
}

/// Dense Gaussian elimination engine over GF(p).
pub struct EliminationEngine;

impl EliminationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Modular inverse by extended Euclid on u64; `None` for 0 or a
    /// non-invertible residue (non-prime modulus).
    fn mod_inverse(a: u64, p: u64) -> Option<u64> {
        if a == 0 {
            return None;
        }
        let (mut t, mut new_t): (i64, i64) = (0, 1);
        let (mut r, mut new_r) = (p as i64, (a % p) as i64);
        while new_r != 0 {
            let q = r / new_r;
            let tmp_t = t - q * new_t;
            t = new_t;
            new_t = tmp_t;
            let tmp_r = r - q * new_r;
            r = new_r;
            new_r = tmp_r;
        }
        if r > 1 {
            return None;
        }
        if t < 0 {
            t += p as i64;
        }
        Some(t as u64)
    }
}

impl Default for EliminationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ModularEngine for EliminationEngine {
    fn name(&self) -> &'static str {
        "elimination"
    }

    fn determinant_mod(&self, matrix: &[u32], n: usize, p: u32, guard: &InterruptGuard) -> Result<u32> {
        let p64 = p as u64;
        let mut m: Vec<u64> = matrix.iter().map(|&x| (x as u64) % p64).collect();
        let mut det: u64 = 1;
        let mut sign = 1i64;

        for col in 0..n {
            guard.checkpoint()?;

            let pivot = (col..n).find(|&row| m[row * n + col] != 0);
            let pivot = match pivot {
                Some(row) => row,
                None => return Ok(0),
            };
            if pivot != col {
                for j in 0..n {
                    m.swap(col * n + j, pivot * n + j);
                }
                sign = -sign;
            }

            let pivot_val = m[col * n + col];
            det = (det * pivot_val) % p64;

            let pivot_inv = Self::mod_inverse(pivot_val, p64)
                .expect("nonzero residue mod a prime is invertible");
            for row in (col + 1)..n {
                let factor = (m[row * n + col] * pivot_inv) % p64;
                if factor == 0 {
                    continue;
                }
                for j in col..n {
                    let sub = (factor * m[col * n + j]) % p64;
                    m[row * n + j] = (m[row * n + j] + p64 - sub) % p64;
                }
            }
        }

        if sign < 0 {
            Ok(((p64 - det) % p64) as u32)
        } else {
            Ok(det as u32)
        }
    }

    fn inverse_mod(
        &self,
        matrix: &[u32],
        n: usize,
        p: u32,
        guard: &InterruptGuard,
    ) -> Result<Option<Vec<u32>>> {
        let p64 = p as u64;
        let w = 2 * n;

        // Augmented [A | I], Gauss-Jordan.
        let mut aug = vec![0u64; n * w];
        for i in 0..n {
            for j in 0..n {
                aug[i * w + j] = (matrix[i * n + j] as u64) % p64;
            }
            aug[i * w + n + i] = 1;
        }

        for col in 0..n {
            guard.checkpoint()?;

            let pivot = (col..n).find(|&row| aug[row * w + col] != 0);
            let pivot = match pivot {
                Some(row) => row,
                None => return Ok(None),
            };
            if pivot != col {
                for j in 0..w {
                    aug.swap(col * w + j, pivot * w + j);
                }
            }

            let pivot_inv = match Self::mod_inverse(aug[col * w + col], p64) {
                Some(inv) => inv,
                None => return Ok(None),
            };
            for j in 0..w {
                aug[col * w + j] = (aug[col * w + j] * pivot_inv) % p64;
            }

            for row in 0..n {
                if row == col {
                    continue;
                }
                let factor = aug[row * w + col];
                if factor == 0 {
                    continue;
                }
                for j in 0..w {
                    let sub = (factor * aug[col * w + j]) % p64;
                    aug[row * w + j] = (aug[row * w + j] + p64 - sub) % p64;
                }
            }
        }

        let mut inv = vec![0u32; n * n];
        for i in 0..n {
            for j in 0..n {
                inv[i * n + j] = aug[i * w + n + j] as u32;
            }
        }
        Ok(Some(inv))
    }

    fn matvec_mod(&self, matrix: &[u32], x: &[u32], n: usize, p: u32) -> Vec<u32> {
        let p64 = p as u64;
        let mut y = vec![0u32; n];
        for i in 0..n {
            let mut sum = 0u64;
            for j in 0..n {
                sum = (sum + matrix[i * n + j] as u64 * x[j] as u64) % p64;
            }
            y[i] = sum as u32;
        }
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interrupt::InterruptFlag;

    #[test]
    fn determinant_mod_small() {
        let engine = EliminationEngine::new();
        let flag = InterruptFlag::new();
        let guard = InterruptGuard::enter(&flag);

        // [[1, 2], [3, 4]]: det = -2 = 99 mod 101
        let det = engine.determinant_mod(&[1, 2, 3, 4], 2, 101, &guard).unwrap();
        assert_eq!(det, 99);
    }

    #[test]
    fn inverse_mod_round_trip() {
        let engine = EliminationEngine::new();
        let flag = InterruptFlag::new();
        let guard = InterruptGuard::enter(&flag);

        let a = [2u32, 1, 1, 3];
        let p = 101;
        let inv = engine.inverse_mod(&a, 2, p, &guard).unwrap().unwrap();

        // A * A^(-1) = I mod p
        for i in 0..2 {
            for j in 0..2 {
                let mut sum = 0u64;
                for k in 0..2 {
                    sum += a[i * 2 + k] as u64 * inv[k * 2 + j] as u64;
                }
                assert_eq!((sum % p as u64) as u32, u32::from(i == j));
            }
        }
    }

    #[test]
    fn singular_mod_p_reports_none() {
        let engine = EliminationEngine::new();
        let flag = InterruptFlag::new();
        let guard = InterruptGuard::enter(&flag);

        // Second row is 2x the first.
        let a = [1u32, 2, 2, 4];
        assert!(engine.inverse_mod(&a, 2, 101, &guard).unwrap().is_none());
        assert_eq!(engine.determinant_mod(&a, 2, 101, &guard).unwrap(), 0);
    }

    #[test]
    fn interrupt_stops_elimination() {
        let engine = EliminationEngine::new();
        let flag = InterruptFlag::new();
        flag.interrupt();
        let guard = InterruptGuard::enter(&flag);

        let a = [1u32, 0, 0, 1];
        assert!(engine.determinant_mod(&a, 2, 101, &guard).is_err());
    }
}
