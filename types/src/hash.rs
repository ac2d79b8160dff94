//! The 32-byte ledger key type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// A 32-byte hash identifying a webcash output on the ledger.
///
/// This is the SHA-256 of a secret's canonical hex text; the ledger only
/// ever sees these, never the secrets themselves.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WebcashHash([u8; 32]);

impl WebcashHash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for WebcashHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WebcashHash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for WebcashHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Parses 64 hex characters, either case.
impl FromStr for WebcashHash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 {
            return Err(ParseError::InvalidHex);
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| ParseError::InvalidHex)?;
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let hash = WebcashHash::new([0xab; 32]);
        let text = hash.to_string();
        assert_eq!(text.len(), 64);
        assert_eq!(text.parse::<WebcashHash>().unwrap(), hash);
    }

    #[test]
    fn parse_is_case_insensitive() {
        let lower = "ab".repeat(32);
        let upper = lower.to_uppercase();
        assert_eq!(
            lower.parse::<WebcashHash>().unwrap(),
            upper.parse::<WebcashHash>().unwrap()
        );
    }

    #[test]
    fn rejects_bad_lengths_and_digits() {
        assert!("".parse::<WebcashHash>().is_err());
        assert!("ab".parse::<WebcashHash>().is_err());
        assert!("zz".repeat(32).parse::<WebcashHash>().is_err());
    }
}
