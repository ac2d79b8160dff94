//! Fixed-point webcash amounts.
//!
//! Amounts are signed 64-bit integers counting 10⁻⁸ units, so ₩1.0 is
//! 100_000_000 raw. The type itself permits negative and zero values for
//! intermediate arithmetic; ledger operations reject anything below one
//! raw unit at their validation boundaries.

use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// Raw units per whole webcash.
pub const UNIT: i64 = 100_000_000;

/// A webcash amount in raw units (8 fractional decimal digits).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Self = Self(0);

    /// One raw unit, the smallest representable value (10⁻⁸).
    pub const ONE_RAW: Self = Self(1);

    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Whole webcash, e.g. `Amount::from_whole(200_000)` is ₩200000.
    pub const fn from_whole(whole: i64) -> Self {
        Self(whole * UNIT)
    }

    pub const fn raw(&self) -> i64 {
        self.0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Halve the amount `epoch` times, as the issuance schedule does.
    /// Past 63 halvings the result is always zero.
    pub const fn halved(self, epoch: u32) -> Self {
        if epoch > 63 {
            Self(0)
        } else {
            Self(self.0 >> epoch)
        }
    }
}

impl Neg for Amount {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

/// Strict parser for the canonical decimal encoding.
///
/// Accepts `[-]<integer>[.<fraction>]` with at most 8 fractional digits,
/// at least one integer digit, and no superfluous leading zero. Embedded
/// NUL bytes and values outside the i64 raw range are rejected. Only
/// strings that [`fmt::Display`] could have produced parse successfully,
/// plus trailing fractional zeros (`"1.10"` parses equal to `"1.1"`).
impl FromStr for Amount {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.is_empty() || bytes.contains(&0) {
            return Err(ParseError::InvalidAmount);
        }

        let mut pos = 0usize;
        let negative = bytes[0] == b'-';
        if negative {
            pos += 1;
            // A lone minus sign is not a valid encoding.
            if pos == bytes.len() {
                return Err(ParseError::InvalidAmount);
            }
        }

        // At least one integer digit is required, even for fractions.
        if !bytes[pos].is_ascii_digit() {
            return Err(ParseError::InvalidAmount);
        }
        // A leading zero must be the entire integer part.
        if bytes[pos] == b'0' && pos + 1 != bytes.len() && bytes[pos + 1] != b'.' {
            return Err(ParseError::InvalidAmount);
        }

        let mut value: i128 = 0;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            value = value * 10 + i128::from(bytes[pos] - b'0');
            if value > i128::from(i64::MAX) {
                return Err(ParseError::AmountOverflow);
            }
            pos += 1;
        }

        // Fractional digits are optional, but a bare decimal point is not
        // allowed and more than 8 digits cannot be represented.
        let mut frac_digits = 0u32;
        if pos < bytes.len() {
            if bytes[pos] != b'.' {
                return Err(ParseError::InvalidAmount);
            }
            pos += 1;
            if pos == bytes.len() {
                return Err(ParseError::InvalidAmount);
            }
            while frac_digits < 8 && pos < bytes.len() {
                if !bytes[pos].is_ascii_digit() {
                    return Err(ParseError::InvalidAmount);
                }
                value = value * 10 + i128::from(bytes[pos] - b'0');
                frac_digits += 1;
                pos += 1;
            }
            if pos != bytes.len() {
                return Err(ParseError::InvalidAmount);
            }
        }
        for _ in frac_digits..8 {
            value *= 10;
        }
        if value > i128::from(i64::MAX) {
            return Err(ParseError::AmountOverflow);
        }

        let mut raw = value as i64;
        if negative {
            raw = -raw;
        }
        Ok(Self(raw))
    }
}

/// Canonical decimal rendering: up to 8 fractional digits with trailing
/// zeros (and a would-be trailing decimal point) stripped, e.g. raw
/// 3_000_000 renders as `"0.03"`.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude / UNIT as u64;
        let frac = magnitude % UNIT as u64;
        if self.0 < 0 {
            write!(f, "-")?;
        }
        write!(f, "{whole}")?;
        if frac != 0 {
            let digits = format!("{frac:08}");
            write!(f, ".{}", digits.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

/// Amounts cross the wire as their canonical decimal strings.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
