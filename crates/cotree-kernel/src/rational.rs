//! Exact rational numbers.
//!
//! A `Rational` is p/q with q > 0, always held in lowest terms. Orbit
//! normalization divides weights by automorphism counts, so coefficients
//! must stay exact; floating point is only ever an approximation on demand.

use crate::error::CotreeError;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// An arbitrary-precision fraction in lowest terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rational(BigRational);

impl Rational {
    /// Build `numer / denom`, reduced. Fails when `denom` is zero.
    pub fn new(numer: impl Into<BigInt>, denom: impl Into<BigInt>) -> Result<Self, CotreeError> {
        let numer = numer.into();
        let denom = denom.into();
        if denom.is_zero() {
            return Err(CotreeError::ZeroDenominator {
                numerator: numer.to_string(),
            });
        }
        Ok(Self(BigRational::new(numer, denom)))
    }

    pub fn from_integer(n: impl Into<BigInt>) -> Self {
        Self(BigRational::from_integer(n.into()))
    }

    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    pub fn one() -> Self {
        Self(BigRational::one())
    }

    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    /// Always positive.
    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    /// Exact division. Fails when `divisor` is zero.
    pub fn checked_div(&self, divisor: &Rational) -> Result<Self, CotreeError> {
        if divisor.is_zero() {
            return Err(CotreeError::DivisionByZero {
                dividend: self.to_string(),
            });
        }
        Ok(Self(&self.0 / &divisor.0))
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Nearest floating approximation.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_integer(n)
    }
}

impl From<BigInt> for Rational {
    fn from(n: BigInt) -> Self {
        Self::from_integer(n)
    }
}

impl<'a> Add<&'a Rational> for &'a Rational {
    type Output = Rational;

    fn add(self, rhs: &'a Rational) -> Rational {
        Rational(&self.0 + &rhs.0)
    }
}

impl<'a> Sub<&'a Rational> for &'a Rational {
    type Output = Rational;

    fn sub(self, rhs: &'a Rational) -> Rational {
        Rational(&self.0 - &rhs.0)
    }
}

impl<'a> Mul<&'a Rational> for &'a Rational {
    type Output = Rational;

    fn mul(self, rhs: &'a Rational) -> Rational {
        Rational(&self.0 * &rhs.0)
    }
}

impl Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Rational {
        Rational(self.0 + rhs.0)
    }
}

impl Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Rational {
        Rational(self.0 - rhs.0)
    }
}

impl Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Rational) -> Rational {
        Rational(self.0 * rhs.0)
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational(-self.0)
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational(-&self.0)
    }
}

/// `p` when the denominator is 1, otherwise `p/q`.
impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            write!(f, "{}", self.numer())
        } else {
            write!(f, "{}/{}", self.numer(), self.denom())
        }
    }
}

impl FromStr for Rational {
    type Err = CotreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_int = |part: &str, offset: usize| {
            part.trim().parse::<BigInt>().map_err(|e| CotreeError::Parse {
                offset,
                message: format!("invalid integer `{part}`: {e}"),
            })
        };
        match s.split_once('/') {
            Some((n, d)) => Rational::new(parse_int(n, 0)?, parse_int(d, n.len() + 1)?),
            None => Ok(Rational::from_integer(parse_int(s, 0)?)),
        }
    }
}

impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
