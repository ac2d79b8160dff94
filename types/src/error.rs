//! Parse errors for the canonical webcash text encodings.

use thiserror::Error;

/// Error returned when parsing an amount or webcash string fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid amount encoding")]
    InvalidAmount,

    #[error("amount out of range")]
    AmountOverflow,

    #[error("invalid webcash string structure")]
    InvalidStructure,

    #[error("unknown webcash kind (expected 'secret' or 'public')")]
    UnknownKind,

    #[error("invalid hex key material")]
    InvalidHex,
}
