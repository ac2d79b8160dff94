//! The webcash economy: one authoritative ledger of unspent outputs,
//! mutated only through two atomic operations.
//!
//! - **Replacement** destroys a set of unspent outputs and creates a new
//!   set of equal total value ([`replace::process_replacement`]).
//! - **Mining report** mints new outputs against a proof of work
//!   ([`mining::process_mining_report`]), and drives the difficulty
//!   retarget.
//!
//! Everything else is read-only: stats snapshots and health-check
//! lookups. Each write operation validates fully, then applies all of its
//! mutations or none of them while holding the state lock.

pub mod economy;
pub mod error;
pub mod health;
pub mod issuance;
pub mod mining;
pub mod replace;
pub mod request;

pub use economy::{
    EconomyCheckpoint, EconomyState, EconomyStats, MiningReport, Replacement, TokenStatus,
};
pub use error::LedgerError;
pub use health::process_health_check;
pub use issuance::EconomyConfig;
pub use mining::process_mining_report;
pub use replace::process_replacement;
