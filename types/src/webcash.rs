//! Secret and public webcash tokens and their canonical text encodings.
//!
//! The wire, log, and storage format is the same string grammar:
//!
//! ```text
//! e<amount>:secret:<64 hex chars>
//! e<amount>:public:<64 hex chars>
//! ```
//!
//! A public webcash is derived from a secret by hashing the secret's
//! canonical lowercase hex *text* with SHA-256. Hashing the text rather
//! than the raw bytes is a wire-compatibility requirement shared with
//! deployed wallets and miners.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::amount::Amount;
use crate::error::ParseError;
use crate::hash::WebcashHash;

/// The 32-byte bearer secret behind a webcash token.
///
/// Treated as sensitive material: zeroized on drop, and `Debug` never
/// prints the key bytes.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Canonical lowercase hex encoding — the exact text that public-key
    /// derivation hashes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(..)")
    }
}

impl FromStr for SecretKey {
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

/// A spendable webcash token: the bearer secret plus its claimed amount.
///
/// Ordering is lexicographic on `(amount, secret)` so sets and maps of
/// tokens behave deterministically.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SecretWebcash {
    pub amount: Amount,
    pub secret: SecretKey,
}

impl SecretWebcash {
    /// Derive the ledger key for this secret.
    pub fn to_public(&self) -> PublicWebcash {
        let digest = Sha256::digest(self.secret.to_hex().as_bytes());
        PublicWebcash {
            amount: self.amount,
            hash: WebcashHash::new(digest.into()),
        }
    }
}

impl fmt::Display for SecretWebcash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "e{}:secret:{}",
            clamp_non_negative(self.amount),
            self.secret.to_hex()
        )
    }
}

impl FromStr for SecretWebcash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (amount, kind, hex) = split_webcash(s)?;
        if kind != "secret" {
            return Err(ParseError::UnknownKind);
        }
        Ok(Self {
            amount,
            secret: hex.parse()?,
        })
    }
}

impl Serialize for SecretWebcash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SecretWebcash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// The public face of a webcash token: the ledger key plus the amount the
/// holder claims it carries. The ledger is the authority on the amount; a
/// claimed amount that disagrees with the ledger is a validation failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicWebcash {
    pub amount: Amount,
    pub hash: WebcashHash,
}

impl fmt::Display for PublicWebcash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}:public:{}", clamp_non_negative(self.amount), self.hash)
    }
}

impl FromStr for PublicWebcash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (amount, kind, hex) = split_webcash(s)?;
        if kind != "public" {
            return Err(ParseError::UnknownKind);
        }
        Ok(Self {
            amount,
            hash: hex.parse()?,
        })
    }
}

impl Serialize for PublicWebcash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublicWebcash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Split `e<amount>:<kind>:<hex>` into its three fields.
fn split_webcash(s: &str) -> Result<(Amount, &str, &str), ParseError> {
    let rest = s.strip_prefix('e').ok_or(ParseError::InvalidStructure)?;
    let (amount_str, rest) = rest.split_once(':').ok_or(ParseError::InvalidStructure)?;
    let (kind, hex) = rest.split_once(':').ok_or(ParseError::InvalidStructure)?;
    if hex.contains(':') {
        return Err(ParseError::InvalidStructure);
    }
    Ok((amount_str.parse()?, kind, hex))
}

/// Webcash strings never render a negative amount; it clamps to zero.
fn clamp_non_negative(amount: Amount) -> Amount {
    if amount.raw() < 0 {
        Amount::ZERO
    } else {
        amount
    }
}
