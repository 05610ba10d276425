//! Arbitrary-precision integer amounts.
//!
//! Every balance, fee and genesis allocation in the ledger is a [`Big`]. Values are
//! immutable: arithmetic always produces a new value and never overflows. A `Big`
//! may hold a negative intermediate result (e.g. `balance - needed`); callers decide
//! whether that is an error through [`Big::is_valid`].

use num_bigint::{BigInt, Sign};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::num::NonZeroU64;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::TypesError;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Big(BigInt);

impl Big {
    pub fn zero() -> Self {
        Self(BigInt::from(0u8))
    }

    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.sign() == Sign::NoSign
    }

    pub fn is_negative(&self) -> bool {
        self.0.sign() == Sign::Minus
    }

    pub fn is_positive(&self) -> bool {
        self.0.sign() == Sign::Plus
    }

    /// A value usable as an amount: zero or greater.
    pub fn is_valid(&self) -> bool {
        !self.is_negative()
    }

    /// `self * numer / denom`, truncated toward zero.
    pub fn mul_div(&self, numer: u64, denom: NonZeroU64) -> Self {
        Self((&self.0 * BigInt::from(numer)) / BigInt::from(denom.get()))
    }

    /// Clamp into `[min, max]`. `min` wins when the bounds are inverted.
    pub fn clamp_between(self, min: &Big, max: &Big) -> Self {
        let upper = if self > *max { max.clone() } else { self };
        if upper < *min {
            min.clone()
        } else {
            upper
        }
    }

    /// Canonical byte form used in fact hashing: a sign byte followed by the
    /// big-endian magnitude.
    pub fn to_bytes(&self) -> Vec<u8> {
        let (sign, magnitude) = self.0.to_bytes_be();
        let mut out = Vec::with_capacity(magnitude.len() + 1);
        out.push(u8::from(sign == Sign::Minus));
        out.extend_from_slice(&magnitude);
        out
    }
}

impl From<u64> for Big {
    fn from(v: u64) -> Self {
        Self(BigInt::from(v))
    }
}

impl From<i64> for Big {
    fn from(v: i64) -> Self {
        Self(BigInt::from(v))
    }
}

impl From<u128> for Big {
    fn from(v: u128) -> Self {
        Self(BigInt::from(v))
    }
}

impl From<BigInt> for Big {
    fn from(v: BigInt) -> Self {
        Self(v)
    }
}

impl FromStr for Big {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigInt::from_str(s.trim())
            .map(Self)
            .map_err(|_| TypesError::InvalidBig(s.to_string()))
    }
}

impl Add for Big {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Big> for &'a Big {
    type Output = Big;
    fn add(self, rhs: &'a Big) -> Big {
        Big(&self.0 + &rhs.0)
    }
}

impl Sub for Big {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl<'a> Sub<&'a Big> for &'a Big {
    type Output = Big;
    fn sub(self, rhs: &'a Big) -> Big {
        Big(&self.0 - &rhs.0)
    }
}

impl PartialEq<u64> for Big {
    fn eq(&self, other: &u64) -> bool {
        self.0 == BigInt::from(*other)
    }
}

impl PartialOrd<u64> for Big {
    fn partial_cmp(&self, other: &u64) -> Option<Ordering> {
        self.0.partial_cmp(&BigInt::from(*other))
    }
}

impl fmt::Display for Big {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Amounts travel as decimal strings in every format so that JSON consumers never
// see a lossy float.
impl Serialize for Big {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Big {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Big::from_str(&s).map_err(serde::de::Error::custom)
    }
}
