//! Arbitrary-precision integers.
//!
//! Coin and asset quantities on the wire are unbounded JSON numbers, so they
//! are carried as big integers rather than `u64`. [`Uint`] is used where the
//! protocol guarantees non-negativity (coins, fees, withdrawals) and [`Int`]
//! where quantities may be negative (minted/burned assets).
//!
//! Equality and ordering follow the mathematical value: `+0 == 0`, `007 == 7`.

use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{Signed, ToPrimitive, Zero};

use crate::error::CodecError;

/// A signed integer with no fixed width.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Int(BigInt);

/// An unsigned integer with no fixed width.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uint(BigUint);

/// Validate a decimal literal: optional sign followed by at least one ASCII digit.
fn split_decimal(s: &str) -> Result<(bool, &str), CodecError> {
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::malformed_number(format!("{s:?} is not an integer literal")));
    }
    Ok((negative, digits))
}

impl Int {
    /// Zero.
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    /// Parse a base-10 literal such as `-42` or `+7`.
    pub fn from_decimal(s: &str) -> Result<Self, CodecError> {
        let (negative, digits) = split_decimal(s)?;
        let magnitude = BigUint::parse_bytes(digits.as_bytes(), 10)
            .ok_or_else(|| CodecError::malformed_number(s))?;
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        Ok(Self(BigInt::from_biguint(sign, magnitude)))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Narrow to `i64` if the value fits.
    pub fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }

    /// Narrow to `u64` if the value fits.
    pub fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }

    /// Absolute value as an unsigned integer.
    pub fn magnitude(&self) -> Uint {
        Uint(self.0.magnitude().clone())
    }

    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    pub fn into_bigint(self) -> BigInt {
        self.0
    }
}

impl Uint {
    /// Zero.
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// Parse a base-10 literal. A leading `-` is a range error, not a syntax error.
    pub fn from_decimal(s: &str) -> Result<Self, CodecError> {
        let value = Int::from_decimal(s)?;
        Uint::try_from(value)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Narrow to `u64` if the value fits.
    pub fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }

    /// Subtract, returning `None` when the result would be negative.
    pub fn checked_sub(&self, rhs: &Uint) -> Option<Uint> {
        if rhs.0 > self.0 {
            None
        } else {
            Some(Uint(&self.0 - &rhs.0))
        }
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }
}

macro_rules! int_from_primitive {
    ($target:ident: $($t:ty),*) => {
        $(
            impl From<$t> for $target {
                fn from(n: $t) -> Self {
                    Self(n.into())
                }
            }
        )*
    };
}

int_from_primitive!(Int: i8, i16, i32, i64, i128, u8, u16, u32, u64, u128);
int_from_primitive!(Uint: u8, u16, u32, u64, u128);

impl From<BigInt> for Int {
    fn from(n: BigInt) -> Self {
        Self(n)
    }
}

impl From<BigUint> for Uint {
    fn from(n: BigUint) -> Self {
        Self(n)
    }
}

impl From<Uint> for Int {
    fn from(n: Uint) -> Self {
        Self(BigInt::from(n.0))
    }
}

impl TryFrom<Int> for Uint {
    type Error = CodecError;

    fn try_from(n: Int) -> Result<Self, Self::Error> {
        n.0.to_biguint()
            .map(Uint)
            .ok_or_else(|| CodecError::range(format!("{} is negative", n.0)))
    }
}

impl TryFrom<BigInt> for Uint {
    type Error = CodecError;

    fn try_from(n: BigInt) -> Result<Self, Self::Error> {
        Uint::try_from(Int(n))
    }
}

impl FromStr for Int {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Int::from_decimal(s)
    }
}

impl FromStr for Uint {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uint::from_decimal(s)
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for Uint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Int({})", self.0)
    }
}

impl fmt::Debug for Uint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uint({})", self.0)
    }
}

impl Add for &Int {
    type Output = Int;

    fn add(self, rhs: &Int) -> Int {
        Int(&self.0 + &rhs.0)
    }
}

impl Add for Int {
    type Output = Int;

    fn add(self, rhs: Int) -> Int {
        Int(self.0 + rhs.0)
    }
}

impl Sub for &Int {
    type Output = Int;

    fn sub(self, rhs: &Int) -> Int {
        Int(&self.0 - &rhs.0)
    }
}

impl Sub for Int {
    type Output = Int;

    fn sub(self, rhs: Int) -> Int {
        Int(self.0 - rhs.0)
    }
}

impl Neg for Int {
    type Output = Int;

    fn neg(self) -> Int {
        Int(-self.0)
    }
}

impl Add for &Uint {
    type Output = Uint;

    fn add(self, rhs: &Uint) -> Uint {
        Uint(&self.0 + &rhs.0)
    }
}

impl Add for Uint {
    type Output = Uint;

    fn add(self, rhs: Uint) -> Uint {
        Uint(self.0 + rhs.0)
    }
}

impl PartialEq<Uint> for Int {
    fn eq(&self, other: &Uint) -> bool {
        !self.is_negative() && self.0.magnitude() == &other.0
    }
}
