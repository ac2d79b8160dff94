//! The issuance schedule: epochs, halving rewards, and circulation sums.
//!
//! Rewards halve every [`REPORTS_PER_EPOCH`] accepted mining reports, for
//! at most 64 halvings. Circulation is the piecewise sum of that schedule,
//! either over the actual report count (`total_circulation`) or over the
//! report count the wall clock would have produced at one report per
//! [`TARGET_INTERVAL_SECS`] (`expected_circulation`). The ratio of the
//! two is the feedback signal the difficulty retarget consumes.

use serde::{Deserialize, Serialize};
use webcash_types::{Amount, Timestamp};

/// Number of mining reports per issuance epoch (the halving period).
pub const REPORTS_PER_EPOCH: u64 = 525_000;

/// Target wall-clock spacing between mining reports, in seconds.
pub const TARGET_INTERVAL_SECS: u64 = 10;

/// Difficulty is re-evaluated on every `RETARGET_INTERVAL`-th report,
/// looking back over the same number of reports. Independent of
/// [`REPORTS_PER_EPOCH`]; the two knobs happen to be tuned separately.
pub const RETARGET_INTERVAL: u64 = 128;

/// Tunable economy parameters.
///
/// Production deployments use [`EconomyConfig::default`]; tests construct
/// configs with tiny difficulties so proofs of work can be found
/// in-process.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Network difficulty before any retarget has run.
    #[serde(default = "default_initial_difficulty")]
    pub initial_difficulty: u8,

    /// Absolute lower bound on apparent difficulty for any report,
    /// regardless of network difficulty. A DoS guard: below this, the
    /// server will not even consult ledger state.
    #[serde(default = "default_min_difficulty")]
    pub min_difficulty: u32,

    /// Epoch-0 reward per mining report (the full amount, of which the
    /// subsidy is a part).
    #[serde(default = "default_initial_mining_amount")]
    pub initial_mining_amount: Amount,

    /// Epoch-0 server-operator subsidy per mining report.
    #[serde(default = "default_initial_subsidy_amount")]
    pub initial_subsidy_amount: Amount,
}

fn default_initial_difficulty() -> u8 {
    28
}

fn default_min_difficulty() -> u32 {
    25
}

fn default_initial_mining_amount() -> Amount {
    Amount::from_raw(20_000_000_000_000) // ₩200,000
}

fn default_initial_subsidy_amount() -> Amount {
    Amount::from_raw(1_000_000_000_000) // ₩10,000
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            initial_difficulty: default_initial_difficulty(),
            min_difficulty: default_min_difficulty(),
            initial_mining_amount: default_initial_mining_amount(),
            initial_subsidy_amount: default_initial_subsidy_amount(),
        }
    }
}

impl EconomyConfig {
    /// Issuance epoch after `num_reports` accepted reports.
    pub fn epoch(&self, num_reports: u64) -> u32 {
        (num_reports / REPORTS_PER_EPOCH) as u32
    }

    /// Reward a report must claim, given the prior report count.
    pub fn mining_amount(&self, num_reports: u64) -> Amount {
        self.initial_mining_amount.halved(self.epoch(num_reports))
    }

    /// Subsidy a report must assign, given the prior report count.
    pub fn subsidy_amount(&self, num_reports: u64) -> Amount {
        self.initial_subsidy_amount.halved(self.epoch(num_reports))
    }

    /// Total raw units issued by `num_reports` reports, following the
    /// halving schedule piecewise.
    pub fn circulation(&self, num_reports: u64) -> u128 {
        let mut total = 0u128;
        let mut remaining = num_reports;
        let mut epoch = 0u32;
        while remaining > REPORTS_PER_EPOCH {
            let value = self.initial_mining_amount.halved(epoch).raw() as u128;
            total += value * u128::from(REPORTS_PER_EPOCH);
            remaining -= REPORTS_PER_EPOCH;
            epoch += 1;
        }
        let value = self.initial_mining_amount.halved(epoch).raw() as u128;
        total + value * u128::from(remaining)
    }

    /// Where circulation *would* be if issuance had tracked the wall
    /// clock at exactly one report per target interval since `genesis`.
    pub fn expected_circulation(&self, genesis: Timestamp, now: Timestamp) -> u128 {
        self.circulation(genesis.elapsed_until(now) / TARGET_INTERVAL_SECS)
    }
}
