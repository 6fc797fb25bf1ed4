//! Exact rational scalar type
//!
//! Numerator/denominator pairs over `BigInt`, kept reduced with a positive
//! denominator. The kernel-extraction path does its elimination over these.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Exact rational number. Always reduced; denominator always positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rational {
    num: BigInt,
    den: BigInt,
}

impl Rational {
    pub fn new(num: BigInt, den: BigInt) -> Self {
        let mut r = Self { num, den };
        r.reduce();
        r
    }

    pub fn from_integer<T: Into<BigInt>>(n: T) -> Self {
        Self {
            num: n.into(),
            den: BigInt::one(),
        }
    }

    pub fn zero() -> Self {
        Self::from_integer(0)
    }

    pub fn one() -> Self {
        Self::from_integer(1)
    }

    pub fn numer(&self) -> &BigInt {
        &self.num
    }

    pub fn denom(&self) -> &BigInt {
        &self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn is_integer(&self) -> bool {
        self.den.is_one()
    }

    /// Multiplicative inverse; `None` for zero.
    pub fn recip(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        Some(Self::new(self.den.clone(), self.num.clone()))
    }

    pub fn into_parts(self) -> (BigInt, BigInt) {
        (self.num, self.den)
    }

    fn reduce(&mut self) {
        if self.num.is_zero() {
            self.den = BigInt::one();
            return;
        }
        let g = self.num.gcd(&self.den);
        self.num = &self.num / &g;
        self.den = &self.den / &g;
        if self.den.is_negative() {
            self.num = -&self.num;
            self.den = -&self.den;
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den.is_one() {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl From<BigInt> for Rational {
    fn from(n: BigInt) -> Self {
        Self::from_integer(n)
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_integer(n)
    }
}

impl Add for &Rational {
    type Output = Rational;

    fn add(self, other: Self) -> Rational {
        Rational::new(
            &self.num * &other.den + &other.num * &self.den,
            &self.den * &other.den,
        )
    }
}

impl Sub for &Rational {
    type Output = Rational;

    fn sub(self, other: Self) -> Rational {
        Rational::new(
            &self.num * &other.den - &other.num * &self.den,
            &self.den * &other.den,
        )
    }
}

impl Mul for &Rational {
    type Output = Rational;

    fn mul(self, other: Self) -> Rational {
        Rational::new(&self.num * &other.num, &self.den * &other.den)
    }
}

impl Div for &Rational {
    type Output = Rational;

    fn div(self, other: Self) -> Rational {
        Rational::new(&self.num * &other.den, &self.den * &other.num)
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            num: -&self.num,
            den: self.den.clone(),
        }
    }
}

macro_rules! forward_owned_binop {
    ($trait:ident, $method:ident) => {
        impl $trait for Rational {
            type Output = Rational;

            fn $method(self, other: Self) -> Rational {
                $trait::$method(&self, &other)
            }
        }
    };
}

forward_owned_binop!(Add, add);
forward_owned_binop!(Sub, sub);
forward_owned_binop!(Mul, mul);
forward_owned_binop!(Div, div);

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        -&self
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn arithmetic() {
        assert_eq!(&r(1, 2) + &r(1, 3), r(5, 6));
        assert_eq!(&r(1, 2) * &r(1, 3), r(1, 6));
        assert_eq!(&r(1, 2) / &r(3, 4), r(2, 3));
        assert_eq!(-&r(1, 2), r(-1, 2));
    }

    #[test]
    fn reduction_and_sign() {
        assert_eq!(r(4, 8), r(1, 2));
        assert_eq!(r(3, -6), r(-1, 2));
        assert!(r(3, -6).denom() > &BigInt::zero());
        assert_eq!(r(0, 7), Rational::zero());
    }

    #[test]
    fn recip() {
        assert_eq!(r(2, 3).recip(), Some(r(3, 2)));
        assert_eq!(Rational::zero().recip(), None);
    }
}
