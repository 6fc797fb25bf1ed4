//! Residue-to-integer reconstruction
//!
//! Garner's incremental algorithm over a [`ResidueBasis`], with a signed
//! variant that maps into the symmetric range around zero.

use num_bigint::BigInt;
use num_traits::Zero;

use crate::primes::ResidueBasis;

/// Reconstruct the unique x in [0, M) with x ≡ residues[i] mod primes[i].
pub fn reconstruct(residues: &[u32], basis: &ResidueBasis) -> BigInt {
    debug_assert_eq!(residues.len(), basis.len());

    if residues.is_empty() {
        return BigInt::zero();
    }
    let mut result = BigInt::from(residues[0]);
    for i in 1..residues.len() {
        let mi = BigInt::from(basis.primes[i]);
        let ri = BigInt::from(residues[i]);
        let result_mod = ((&result % &mi) + &mi) % &mi;
        let diff = ((ri - result_mod) % &mi + &mi) % &mi;
        let t = (diff * &basis.garner_inverses[i]) % &mi;
        result += &basis.partial_products[i] * t;
    }
    result
}

/// Reconstruct into the symmetric range (-M/2, M/2].
pub fn reconstruct_signed(residues: &[u32], basis: &ResidueBasis) -> BigInt {
    let unsigned = reconstruct(residues, basis);
    if unsigned > basis.half_product {
        unsigned - &basis.product
    } else {
        unsigned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residues_of(x: i64, basis: &ResidueBasis) -> Vec<u32> {
        basis
            .primes
            .iter()
            .map(|&p| x.rem_euclid(p as i64) as u32)
            .collect()
    }

    #[test]
    fn round_trip_positive() {
        let basis = ResidueBasis::with_primes(3);
        let x = 123_456_789_i64;
        assert_eq!(reconstruct(&residues_of(x, &basis), &basis), BigInt::from(x));
    }

    #[test]
    fn round_trip_negative() {
        let basis = ResidueBasis::with_primes(3);
        let x = -987_654_321_i64;
        assert_eq!(
            reconstruct_signed(&residues_of(x, &basis), &basis),
            BigInt::from(x)
        );
    }

    #[test]
    fn zero() {
        let basis = ResidueBasis::with_primes(2);
        assert_eq!(
            reconstruct_signed(&residues_of(0, &basis), &basis),
            BigInt::zero()
        );
    }
}
