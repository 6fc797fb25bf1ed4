//! Prime moduli for the residue engines
//!
//! 31-bit primes keep every intermediate product inside u64, which is what
//! the elimination engine's inner loops assume.

use num_bigint::BigInt;
use num_traits::{One, Zero};

/// Generator of 31-bit prime moduli, largest first.
pub struct PrimeSource;

impl PrimeSource {
    /// Generate `count` distinct 31-bit primes, descending from 2^31.
    pub fn primes_31bit(count: usize) -> Vec<u32> {
        let mut primes = Vec::with_capacity(count);
        let mut candidate = (1u32 << 31) - 1;
        while primes.len() < count {
            if Self::is_prime(candidate) {
                primes.push(candidate);
            }
            candidate -= 2;
        }
        primes
    }

    /// Primes needed so that their product exceeds `bit_width` bits.
    pub fn primes_for_bits(bit_width: u64) -> usize {
        (bit_width as usize + 30) / 31 + 1
    }

    fn is_prime(n: u32) -> bool {
        if n < 2 {
            return false;
        }
        if n % 2 == 0 {
            return n == 2;
        }
        let mut i = 3u32;
        while (i as u64) * (i as u64) <= n as u64 {
            if n % i == 0 {
                return false;
            }
            i += 2;
        }
        true
    }
}

/// A set of coprime moduli with the precomputation Garner's algorithm needs.
#[derive(Debug, Clone)]
pub struct ResidueBasis {
    pub primes: Vec<u32>,
    /// Product of all primes.
    pub product: BigInt,
    /// Half the product, for signed reconstruction.
    pub half_product: BigInt,
    /// partial_products[i] = product of primes[0..i].
    pub partial_products: Vec<BigInt>,
    /// garner_inverses[i] = partial_products[i]^(-1) mod primes[i].
    pub garner_inverses: Vec<BigInt>,
}

impl ResidueBasis {
    pub fn new(primes: Vec<u32>) -> Self {
        let k = primes.len();
        assert!(k > 0, "residue basis needs at least one prime");

        let mut partial_products = vec![BigInt::one(); k];
        for i in 1..k {
            partial_products[i] = &partial_products[i - 1] * BigInt::from(primes[i - 1]);
        }
        let product = &partial_products[k - 1] * BigInt::from(primes[k - 1]);
        let half_product = &product / 2;

        let mut garner_inverses = vec![BigInt::zero(); k];
        for i in 1..k {
            let mi = BigInt::from(primes[i]);
            let pp_mod = &partial_products[i] % &mi;
            garner_inverses[i] = mod_inverse(&pp_mod, &mi).expect("distinct primes are coprime");
        }

        Self {
            primes,
            product,
            half_product,
            partial_products,
            garner_inverses,
        }
    }

    /// Basis with `count` fresh 31-bit primes.
    pub fn with_primes(count: usize) -> Self {
        Self::new(PrimeSource::primes_31bit(count))
    }

    pub fn len(&self) -> usize {
        self.primes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }
}

/// Modular inverse via the extended Euclidean algorithm.
pub fn mod_inverse(a: &BigInt, m: &BigInt) -> Option<BigInt> {
    let (g, x, _) = extended_gcd(a, m);
    if !g.is_one() {
        return None;
    }
    Some(((x % m) + m) % m)
}

/// Extended Euclidean algorithm: returns (g, x, y) with a*x + b*y = g.
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut r0, mut r1) = (a.clone(), b.clone());
    let (mut x0, mut x1) = (BigInt::one(), BigInt::zero());
    let (mut y0, mut y1) = (BigInt::zero(), BigInt::one());
    while !r1.is_zero() {
        let q = &r0 / &r1;
        let r = &r0 - &q * &r1;
        r0 = std::mem::replace(&mut r1, r);
        let x = &x0 - &q * &x1;
        x0 = std::mem::replace(&mut x1, x);
        let y = &y0 - &q * &y1;
        y0 = std::mem::replace(&mut y1, y);
    }
    (r0, x0, y0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primes_are_prime_and_distinct() {
        let primes = PrimeSource::primes_31bit(8);
        assert_eq!(primes.len(), 8);
        for w in primes.windows(2) {
            assert!(w[0] > w[1]);
        }
        for p in primes {
            assert!(p >= 1 << 30);
            assert!(PrimeSource::is_prime(p));
        }
    }

    #[test]
    fn basis_precomputation() {
        let basis = ResidueBasis::with_primes(3);
        assert_eq!(basis.len(), 3);
        let expected: BigInt = basis
            .primes
            .iter()
            .map(|&p| BigInt::from(p))
            .product();
        assert_eq!(basis.product, expected);
    }

    #[test]
    fn extended_gcd_bezout() {
        let a = BigInt::from(240);
        let b = BigInt::from(46);
        let (g, x, y) = extended_gcd(&a, &b);
        assert_eq!(g, BigInt::from(2));
        assert_eq!(&a * &x + &b * &y, g);
    }

    #[test]
    fn mod_inverse_round_trip() {
        let m = BigInt::from(101);
        for a in 1..101 {
            let a = BigInt::from(a);
            let inv = mod_inverse(&a, &m).unwrap();
            assert_eq!((&a * &inv) % &m, BigInt::from(1));
        }
    }
}
