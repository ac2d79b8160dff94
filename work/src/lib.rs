//! Proof-of-work verification.
//!
//! A mining report proves work by exhibiting a preimage whose SHA-256 hash
//! carries enough leading zero bits. The search for such preimages happens
//! in miners; this crate only verifies, with one hash computed per report.

pub mod difficulty;
pub mod proof;

pub use difficulty::{apparent_difficulty, meets_difficulty};
pub use proof::proof_hash;
