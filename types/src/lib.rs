//! Fundamental types for the webcash protocol.
//!
//! Webcash is a bearer token: whoever knows the secret can spend it. The
//! ledger never sees secrets directly — it keys everything by the one-way
//! hash of the secret's canonical text encoding.

pub mod amount;
pub mod error;
pub mod hash;
pub mod time;
pub mod webcash;

pub use amount::Amount;
pub use error::ParseError;
pub use hash::WebcashHash;
pub use time::Timestamp;
pub use webcash::{PublicWebcash, SecretKey, SecretWebcash};
