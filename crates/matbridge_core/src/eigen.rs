//! Symbolic eigen-decomposition over the integers
//!
//! The characteristic polynomial comes out of the exact Faddeev–LeVerrier
//! recurrence; eigenvalues are its integer roots (monic with integer
//! coefficients, so every rational root is an integer), and eigenvector
//! bases fall out of the kernel of A − λI. When the polynomial does not
//! split into linear factors the decomposition fails with
//! [`Error::NotExact`]; the generalized problem is not supported for this
//! entry domain at all.

use num_bigint::BigInt;
use num_integer::Roots;
use num_traits::{One, Signed, Zero};
use tracing::debug;

use crate::error::{Error, Result};
use crate::interrupt::{InterruptFlag, InterruptGuard};
use crate::matrix::Matrix;
use crate::nullspace;

/// Divisor-search ceiling for root extraction. Constant terms whose divisor
/// structure cannot be explored under this ceiling surface as `NotExact`.
const ROOT_SEARCH_LIMIT: u64 = 1 << 20;

/// One eigenvalue with its algebraic multiplicity and a basis of its
/// eigenspace (columns; the geometric multiplicity may be smaller than the
/// algebraic one).
#[derive(Debug, Clone)]
pub struct EigenPair {
    pub value: BigInt,
    pub multiplicity: usize,
    pub vectors: Matrix<BigInt>,
}

/// Full decomposition: pairs sorted by eigenvalue, plus the characteristic
/// polynomial in ascending coefficient order (monic).
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    pub pairs: Vec<EigenPair>,
    pub charpoly: Vec<BigInt>,
}

/// Characteristic polynomial of a square integer matrix, ascending
/// coefficients, monic of degree n. The empty matrix yields the constant 1.
pub fn charpoly(m: &Matrix<BigInt>, flag: &InterruptFlag) -> Result<Vec<BigInt>> {
    if !m.is_square() {
        return Err(Error::NotSquare {
            rows: m.rows(),
            cols: m.cols(),
        });
    }
    let n = m.rows();
    if n == 0 {
        return Ok(vec![BigInt::one()]);
    }

    let guard = InterruptGuard::enter(flag);
    let mut coeffs = vec![BigInt::zero(); n + 1];
    coeffs[n] = BigInt::one();

    // Faddeev–LeVerrier: every division by k is exact.
    let mut mk = Matrix::identity(n);
    for k in 1..=n {
        guard.checkpoint()?;
        let am = m.mul_checked(&mk)?;
        let c = -(am.trace()? / BigInt::from(k));
        coeffs[n - k] = c.clone();
        if k < n {
            mk = am;
            for i in 0..n {
                *mk.get_mut(i, i) += &c;
            }
        }
    }

    Ok(coeffs)
}

/// Exact eigen-decomposition. Fails with [`Error::NotExact`] when the
/// characteristic polynomial has no closed-form factorization over the
/// integers.
pub fn eigen_decompose(m: &Matrix<BigInt>, flag: &InterruptFlag) -> Result<EigenDecomposition> {
    let poly = charpoly(m, flag)?;
    if m.is_empty() {
        return Ok(EigenDecomposition {
            pairs: Vec::new(),
            charpoly: poly,
        });
    }

    let radius = gershgorin_radius(m);
    let (roots, remaining_degree) = integer_roots(&poly, &radius);
    if remaining_degree > 0 {
        return Err(Error::NotExact);
    }
    debug!(n = m.rows(), roots = roots.len(), "characteristic polynomial split");

    let mut pairs = Vec::with_capacity(roots.len());
    for (value, multiplicity) in roots {
        let shifted = m.sub_scalar_diag(&value)?;
        let vectors = nullspace::right_kernel(&shifted, flag)?;
        pairs.push(EigenPair {
            value,
            multiplicity,
            vectors,
        });
    }
    pairs.sort_by(|a, b| a.value.cmp(&b.value));

    Ok(EigenDecomposition {
        pairs,
        charpoly: poly,
    })
}

/// Generalized eigenproblem A·x = λ·B·x. Not available for integer
/// matrices; callers must move to a field that supports it.
pub fn eigen_decompose_generalized(
    a: &Matrix<BigInt>,
    b: &Matrix<BigInt>,
) -> Result<EigenDecomposition> {
    let _ = (a, b);
    Err(Error::Unsupported(
        "generalized eigenproblem over integer matrices",
    ))
}

/// Gershgorin bound: every eigenvalue satisfies |λ| ≤ max row sum of
/// absolute entries.
fn gershgorin_radius(m: &Matrix<BigInt>) -> BigInt {
    let mut radius = BigInt::zero();
    for i in 0..m.rows() {
        let mut sum = BigInt::zero();
        for v in m.row(i) {
            sum += v.abs();
        }
        if sum > radius {
            radius = sum;
        }
    }
    radius
}

/// Extract integer roots with multiplicity. Returns the roots and the
/// degree of the unfactored remainder (zero means the polynomial split).
fn integer_roots(coeffs: &[BigInt], radius: &BigInt) -> (Vec<(BigInt, usize)>, usize) {
    let mut poly = coeffs.to_vec();
    let mut roots: Vec<(BigInt, usize)> = Vec::new();

    // Zero roots: strip the x^m factor.
    let mut zero_mult = 0usize;
    while poly.len() > 1 && poly[0].is_zero() {
        poly.remove(0);
        zero_mult += 1;
    }
    if zero_mult > 0 {
        roots.push((BigInt::zero(), zero_mult));
    }

    for candidate in root_candidates(&poly[0], radius) {
        let mut mult = 0usize;
        while poly.len() > 1 && eval(&poly, &candidate).is_zero() {
            poly = divide_by_linear(&poly, &candidate);
            mult += 1;
        }
        if mult > 0 {
            roots.push((candidate, mult));
        }
        if poly.len() == 1 {
            break;
        }
    }

    (roots, poly.len() - 1)
}

/// Candidate integer roots: divisors of the constant term within the
/// eigenvalue radius, both signs, smallest magnitude first.
fn root_candidates(constant: &BigInt, radius: &BigInt) -> Vec<BigInt> {
    let c = constant.abs();
    debug_assert!(!c.is_zero());

    let mut divisors: Vec<BigInt> = Vec::new();
    // Divisors beyond the radius cannot be eigenvalues, so the scan never
    // needs to pass min(sqrt(c), radius).
    let limit_small = c
        .sqrt()
        .min(radius.clone())
        .min(BigInt::from(ROOT_SEARCH_LIMIT));
    let mut d = BigInt::one();
    while d <= limit_small {
        if (&c % &d).is_zero() {
            if &d <= radius {
                divisors.push(d.clone());
            }
            let cof = &c / &d;
            if &cof <= radius {
                divisors.push(cof);
            }
        }
        d += 1u32;
    }

    divisors.sort();
    divisors.dedup();
    let mut candidates = Vec::with_capacity(divisors.len() * 2);
    for d in divisors {
        candidates.push(d.clone());
        candidates.push(-d);
    }
    candidates
}

fn eval(coeffs: &[BigInt], x: &BigInt) -> BigInt {
    let mut acc = BigInt::zero();
    for c in coeffs.iter().rev() {
        acc = acc * x + c;
    }
    acc
}

/// Exact division of a polynomial by (x − t); the caller guarantees t is a
/// root.
fn divide_by_linear(coeffs: &[BigInt], t: &BigInt) -> Vec<BigInt> {
    let deg = coeffs.len() - 1;
    let mut quotient = vec![BigInt::zero(); deg];
    let mut carry = BigInt::zero();
    for k in (0..deg).rev() {
        // Descending synthetic division, written against ascending storage.
        let q = &coeffs[k + 1] + t * &carry;
        quotient[k] = q.clone();
        carry = q;
    }
    debug_assert!((&coeffs[0] + t * &carry).is_zero());
    quotient
}
