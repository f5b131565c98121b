//! Coefficients of constraint matrices.
//!
//! An [`Int`] is one matrix cell. Its backing representation is chosen by a
//! [`Precision`] when the owning relation is created:
//! - 32-bit and 64-bit values use checked arithmetic and report
//!   [`InvariantErrorKind::Overflow`] instead of wrapping
//! - arbitrary precision values never overflow
//!
//! Mixing precisions in one operation is an error, never a coercion.

pub mod precision;

pub use precision::Precision;

use crate::utils::errors::{
    invariant, FormatError, FormatErrorKind, InvariantErrorKind, ScopResult,
};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Serialize, Deserialize};
use std::cmp::Ordering;
use std::fmt;

/// A single coefficient.
///
/// `PartialEq` is structural: values of different precisions are never equal.
/// Use [`Int::try_eq`] where a precision mismatch must be reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Int {
    Single(i32),
    Double(i64),
    Multiple(BigInt),
}

fn overflow(op: &str, precision: Precision) -> crate::utils::errors::ScopError {
    invariant(
        InvariantErrorKind::Overflow,
        format!("{} overflow in {}", precision, op),
    )
}

fn mismatch(a: Precision, b: Precision) -> crate::utils::errors::ScopError {
    invariant(
        InvariantErrorKind::PrecisionMismatch,
        format!("cannot combine {} and {} coefficients", a, b),
    )
}

impl Int {
    /// Zero at the given precision.
    pub fn zero(precision: Precision) -> Self {
        match precision {
            Precision::Single => Int::Single(0),
            Precision::Double => Int::Double(0),
            Precision::Multiple => Int::Multiple(BigInt::zero()),
        }
    }

    /// One at the given precision.
    pub fn one(precision: Precision) -> Self {
        match precision {
            Precision::Single => Int::Single(1),
            Precision::Double => Int::Double(1),
            Precision::Multiple => Int::Multiple(BigInt::one()),
        }
    }

    /// Build a value from a machine integer, failing if it does not fit.
    pub fn from_i64(precision: Precision, value: i64) -> ScopResult<Self> {
        match precision {
            Precision::Single => i32::try_from(value)
                .map(Int::Single)
                .map_err(|_| overflow("conversion", precision)),
            Precision::Double => Ok(Int::Double(value)),
            Precision::Multiple => Ok(Int::Multiple(BigInt::from(value))),
        }
    }

    /// Build a value from an arbitrary precision integer, failing if it does not fit.
    pub fn from_bigint(precision: Precision, value: &BigInt) -> ScopResult<Self> {
        match precision {
            Precision::Single => value
                .to_i32()
                .map(Int::Single)
                .ok_or_else(|| overflow("conversion", precision)),
            Precision::Double => value
                .to_i64()
                .map(Int::Double)
                .ok_or_else(|| overflow("conversion", precision)),
            Precision::Multiple => Ok(Int::Multiple(value.clone())),
        }
    }

    /// Parse a decimal numeral.
    pub fn parse(precision: Precision, text: &str) -> ScopResult<Self> {
        let malformed = || {
            FormatError::new(
                FormatErrorKind::MalformedNumber,
                format!("not a valid {} integer", precision),
            )
            .with_found(text)
        };
        let value = match precision {
            Precision::Single => text.parse::<i32>().map(Int::Single).map_err(|_| malformed())?,
            Precision::Double => text.parse::<i64>().map(Int::Double).map_err(|_| malformed())?,
            Precision::Multiple => text
                .parse::<BigInt>()
                .map(Int::Multiple)
                .map_err(|_| malformed())?,
        };
        Ok(value)
    }

    /// The precision of this value.
    pub fn precision(&self) -> Precision {
        match self {
            Int::Single(_) => Precision::Single,
            Int::Double(_) => Precision::Double,
            Int::Multiple(_) => Precision::Multiple,
        }
    }

    /// Lossless widening to an arbitrary precision integer.
    pub fn to_bigint(&self) -> BigInt {
        match self {
            Int::Single(v) => BigInt::from(*v),
            Int::Double(v) => BigInt::from(*v),
            Int::Multiple(v) => v.clone(),
        }
    }

    /// The value as `i64`, if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Int::Single(v) => Some(i64::from(*v)),
            Int::Double(v) => Some(*v),
            Int::Multiple(v) => v.to_i64(),
        }
    }

    /// Convert to another precision (checked).
    pub fn to_precision(&self, precision: Precision) -> ScopResult<Self> {
        if self.precision() == precision {
            return Ok(self.clone());
        }
        Int::from_bigint(precision, &self.to_bigint())
    }

    /// Overwrite this value with `other`, which must share its precision.
    pub fn assign(&mut self, other: &Int) -> ScopResult<()> {
        if self.precision() != other.precision() {
            return Err(mismatch(self.precision(), other.precision()));
        }
        *self = other.clone();
        Ok(())
    }

    fn binary(
        &self,
        other: &Int,
        op: &str,
        single: fn(i32, i32) -> Option<i32>,
        double: fn(i64, i64) -> Option<i64>,
        multiple: fn(&BigInt, &BigInt) -> BigInt,
    ) -> ScopResult<Int> {
        match (self, other) {
            (Int::Single(a), Int::Single(b)) => single(*a, *b)
                .map(Int::Single)
                .ok_or_else(|| overflow(op, Precision::Single)),
            (Int::Double(a), Int::Double(b)) => double(*a, *b)
                .map(Int::Double)
                .ok_or_else(|| overflow(op, Precision::Double)),
            (Int::Multiple(a), Int::Multiple(b)) => Ok(Int::Multiple(multiple(a, b))),
            _ => Err(mismatch(self.precision(), other.precision())),
        }
    }

    /// `self + other`.
    pub fn add(&self, other: &Int) -> ScopResult<Int> {
        self.binary(other, "add", i32::checked_add, i64::checked_add, |a, b| a + b)
    }

    /// `self - other`.
    pub fn sub(&self, other: &Int) -> ScopResult<Int> {
        self.binary(other, "sub", i32::checked_sub, i64::checked_sub, |a, b| a - b)
    }

    /// `self * other`.
    pub fn mul(&self, other: &Int) -> ScopResult<Int> {
        self.binary(other, "mul", i32::checked_mul, i64::checked_mul, |a, b| a * b)
    }

    /// `-self`.
    pub fn neg(&self) -> ScopResult<Int> {
        match self {
            Int::Single(v) => v
                .checked_neg()
                .map(Int::Single)
                .ok_or_else(|| overflow("neg", Precision::Single)),
            Int::Double(v) => v
                .checked_neg()
                .map(Int::Double)
                .ok_or_else(|| overflow("neg", Precision::Double)),
            Int::Multiple(v) => Ok(Int::Multiple(-v)),
        }
    }

    /// `self + small`.
    pub fn add_si(&self, small: i64) -> ScopResult<Int> {
        self.add(&Int::from_i64(self.precision(), small)?)
    }

    /// `self * small`.
    pub fn mul_si(&self, small: i64) -> ScopResult<Int> {
        match self {
            Int::Single(v) => i64::from(*v)
                .checked_mul(small)
                .and_then(|r| i32::try_from(r).ok())
                .map(Int::Single)
                .ok_or_else(|| overflow("mul_si", Precision::Single)),
            Int::Double(v) => v
                .checked_mul(small)
                .map(Int::Double)
                .ok_or_else(|| overflow("mul_si", Precision::Double)),
            Int::Multiple(v) => Ok(Int::Multiple(v * BigInt::from(small))),
        }
    }

    /// `self / divisor`, which must be exact.
    pub fn div_exact(&self, divisor: &Int) -> ScopResult<Int> {
        if divisor.is_zero() {
            return Err(invariant(InvariantErrorKind::InexactDivision, "division by zero"));
        }
        let inexact = || {
            invariant(
                InvariantErrorKind::InexactDivision,
                format!("{} is not a multiple of {}", self, divisor),
            )
        };
        match (self, divisor) {
            (Int::Single(a), Int::Single(b)) => {
                if a.checked_rem(*b).ok_or_else(|| overflow("div", Precision::Single))? != 0 {
                    return Err(inexact());
                }
                a.checked_div(*b)
                    .map(Int::Single)
                    .ok_or_else(|| overflow("div", Precision::Single))
            }
            (Int::Double(a), Int::Double(b)) => {
                if a.checked_rem(*b).ok_or_else(|| overflow("div", Precision::Double))? != 0 {
                    return Err(inexact());
                }
                a.checked_div(*b)
                    .map(Int::Double)
                    .ok_or_else(|| overflow("div", Precision::Double))
            }
            (Int::Multiple(a), Int::Multiple(b)) => {
                let (q, r) = a.div_rem(b);
                if !r.is_zero() {
                    return Err(inexact());
                }
                Ok(Int::Multiple(q))
            }
            _ => Err(mismatch(self.precision(), divisor.precision())),
        }
    }

    /// Sign of the value: -1, 0 or 1.
    pub fn sign(&self) -> i32 {
        match self {
            Int::Single(v) => v.signum(),
            Int::Double(v) => v.signum() as i32,
            Int::Multiple(v) => {
                if v.is_zero() {
                    0
                } else if v.is_positive() {
                    1
                } else {
                    -1
                }
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.sign() == 0
    }

    pub fn is_pos(&self) -> bool {
        self.sign() > 0
    }

    pub fn is_neg(&self) -> bool {
        self.sign() < 0
    }

    pub fn is_one(&self) -> bool {
        match self {
            Int::Single(v) => *v == 1,
            Int::Double(v) => *v == 1,
            Int::Multiple(v) => v.is_one(),
        }
    }

    pub fn is_minus_one(&self) -> bool {
        match self {
            Int::Single(v) => *v == -1,
            Int::Double(v) => *v == -1,
            Int::Multiple(v) => *v == -BigInt::one(),
        }
    }

    /// Compare two values of the same precision.
    pub fn try_cmp(&self, other: &Int) -> ScopResult<Ordering> {
        match (self, other) {
            (Int::Single(a), Int::Single(b)) => Ok(a.cmp(b)),
            (Int::Double(a), Int::Double(b)) => Ok(a.cmp(b)),
            (Int::Multiple(a), Int::Multiple(b)) => Ok(a.cmp(b)),
            _ => Err(mismatch(self.precision(), other.precision())),
        }
    }

    /// Equality of two values of the same precision.
    pub fn try_eq(&self, other: &Int) -> ScopResult<bool> {
        Ok(self.try_cmp(other)? == Ordering::Equal)
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Route through `pad` so width/alignment flags work for every backend.
        match self {
            Int::Single(v) => f.pad(&v.to_string()),
            Int::Double(v) => f.pad(&v.to_string()),
            Int::Multiple(v) => f.pad(&v.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(p: Precision, v: i64) -> Int {
        Int::from_i64(p, v).unwrap()
    }

    #[test]
    fn test_same_results_across_precisions() {
        for p in Precision::ALL {
            let a = int(p, 12);
            let b = int(p, -5);
            assert_eq!(a.add(&b).unwrap().to_i64(), Some(7));
            assert_eq!(a.sub(&b).unwrap().to_i64(), Some(17));
            assert_eq!(a.mul(&b).unwrap().to_i64(), Some(-60));
            assert_eq!(b.neg().unwrap().to_i64(), Some(5));
            assert_eq!(a.mul_si(3).unwrap().to_i64(), Some(36));
            assert_eq!(a.div_exact(&int(p, -4)).unwrap().to_i64(), Some(-3));
            assert_eq!(b.sign(), -1);
            assert!(int(p, 1).is_one());
            assert!(int(p, -1).is_minus_one());
            assert!(Int::zero(p).is_zero());
        }
    }

    #[test]
    fn test_single_precision_overflow_is_reported() {
        let max = Int::from_i64(Precision::Single, 2147483647).unwrap();
        let err = max.add_si(1).unwrap_err();
        assert_eq!(err.invariant_kind(), Some(InvariantErrorKind::Overflow));
        assert!(Int::Single(i32::MIN).neg().is_err());
        assert!(Int::from_i64(Precision::Single, 1 << 40).is_err());
    }

    #[test]
    fn test_multiple_precision_continues() {
        let max = Int::from_i64(Precision::Multiple, 2147483647).unwrap();
        let next = max.add_si(1).unwrap();
        assert_eq!(next.to_string(), "2147483648");
        let huge = Int::parse(Precision::Multiple, "123456789012345678901234567890").unwrap();
        let doubled = huge.mul_si(2).unwrap();
        assert_eq!(doubled.to_string(), "246913578024691357802469135780");
        assert_eq!(doubled.to_i64(), None);
    }

    #[test]
    fn test_mixed_precision_is_an_error() {
        let a = Int::one(Precision::Single);
        let b = Int::one(Precision::Double);
        let err = a.try_eq(&b).unwrap_err();
        assert_eq!(err.invariant_kind(), Some(InvariantErrorKind::PrecisionMismatch));
        assert!(a.add(&b).is_err());
        let mut c = Int::zero(Precision::Single);
        assert!(c.assign(&b).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(Int::parse(Precision::Double, "-42").unwrap(), Int::Double(-42));
        let err = Int::parse(Precision::Single, "3000000000").unwrap_err();
        assert_eq!(err.format_kind(), Some(FormatErrorKind::MalformedNumber));
        assert!(Int::parse(Precision::Multiple, "12a").is_err());
    }

    #[test]
    fn test_inexact_division() {
        let err = Int::Double(7).div_exact(&Int::Double(2)).unwrap_err();
        assert_eq!(err.invariant_kind(), Some(InvariantErrorKind::InexactDivision));
        assert!(Int::Double(7).div_exact(&Int::Double(0)).is_err());
    }

    #[test]
    fn test_display_width() {
        assert_eq!(format!("{:>4}", Int::Single(-3)), "  -3");
        assert_eq!(format!("{:>4}", Int::Multiple(BigInt::from(12))), "  12");
    }
}
