//! The shared economy state.
//!
//! `EconomyState` is the sole owner of the ledger's mutable data. It is
//! explicitly constructed at startup and passed by handle into request
//! handlers — never a global. Writes go through the engine functions in
//! [`crate::replace`] and [`crate::mining`], which hold the single state
//! lock for their whole validate-and-mutate sequence. Reads either take
//! the lock briefly ([`EconomyState::check_batch`]) or use the lock-free
//! counter snapshot ([`EconomyState::stats`]).

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use webcash_types::{Amount, Timestamp, WebcashHash};

use crate::issuance::EconomyConfig;

/// An accepted mining report, kept append-only for audit and for the
/// difficulty retarget's lookback window.
#[derive(Clone, Debug)]
pub struct MiningReport {
    /// The base64 preimage text exactly as submitted (and hashed).
    pub preimage: String,
    /// Network difficulty at acceptance time.
    pub difficulty: u32,
    /// Cumulative `2^difficulty` over this and all prior reports.
    pub aggregate_work: u128,
    /// Server receipt time.
    pub received: Timestamp,
}

/// An accepted replacement, kept append-only for audit only — never
/// re-validated.
#[derive(Clone, Debug)]
pub struct Replacement {
    pub inputs: Vec<(WebcashHash, Amount)>,
    pub outputs: Vec<(WebcashHash, Amount)>,
    pub received: Timestamp,
}

/// Result of a health-check lookup for one ledger key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenStatus {
    /// On the ledger and spendable, with the ledger's recorded amount.
    Unspent(Amount),
    /// Was on the ledger once; consumed by a replacement.
    Spent,
    /// The ledger has never seen this hash.
    NeverSeen,
}

/// Point-in-time snapshot of the economy's aggregate figures.
#[derive(Clone, Copy, Debug)]
pub struct EconomyStats {
    pub timestamp: Timestamp,
    pub total_circulation: u128,
    pub expected_circulation: u128,
    pub num_reports: u64,
    pub num_replace: u64,
    pub num_unspent: u64,
    pub mining_amount: Amount,
    pub subsidy_amount: Amount,
    pub epoch: u32,
    pub difficulty: u32,
}

impl EconomyStats {
    /// `total_circulation / expected_circulation`, defaulting to 1.0
    /// while either figure is still zero (avoids startup divide-by-zero).
    pub fn ratio(&self) -> f64 {
        if self.total_circulation > 0 && self.expected_circulation > 0 {
            self.total_circulation as f64 / self.expected_circulation as f64
        } else {
            1.0
        }
    }
}

/// Durable counters persisted across restarts.
///
/// The in-memory ledger's full output sets live only in memory; the
/// checkpoint carries the aggregate figures that keep the issuance
/// schedule, stats, and difficulty continuous across a restart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyCheckpoint {
    pub num_reports: u64,
    pub num_replace: u64,
    pub num_unspent: u64,
    pub genesis: Timestamp,
    pub difficulty: u32,
}

/// Ledger data guarded by the single state lock.
pub(crate) struct LedgerInner {
    /// Live outputs: ledger key → amount.
    pub unspent: HashMap<WebcashHash, Amount>,
    /// Permanently consumed keys. Disjoint from `unspent`, and keys never
    /// leave this set.
    pub spent: HashSet<WebcashHash>,
    /// Proof hashes of accepted reports → report index (replay guard).
    pub proofs: HashMap<WebcashHash, u64>,
    /// Append-only report history.
    pub reports: Vec<MiningReport>,
    /// Append-only replacement audit log.
    pub replacements: Vec<Replacement>,
}

impl LedgerInner {
    fn empty() -> Self {
        Self {
            unspent: HashMap::new(),
            spent: HashSet::new(),
            proofs: HashMap::new(),
            reports: Vec::new(),
            replacements: Vec::new(),
        }
    }
}

/// The process-wide economy.
///
/// Counters are atomics so the stats path never takes the state lock;
/// `num_reports` and `difficulty` are read with a retry-until-stable
/// double read since they are updated independently. `num_replace` and
/// `num_unspent` are informational and tolerate momentary staleness.
pub struct EconomyState {
    config: EconomyConfig,
    pub(crate) difficulty: AtomicU32,
    pub(crate) num_reports: AtomicU64,
    pub(crate) num_replace: AtomicU64,
    pub(crate) num_unspent: AtomicU64,
    /// Receipt time of the first accepted report; process start until
    /// then.
    pub(crate) genesis: AtomicU64,
    inner: Mutex<LedgerInner>,
}

impl EconomyState {
    /// Fresh economy with `genesis` provisionally set to `now`.
    pub fn new(config: EconomyConfig, now: Timestamp) -> Self {
        let difficulty = u32::from(config.initial_difficulty);
        Self {
            config,
            difficulty: AtomicU32::new(difficulty),
            num_reports: AtomicU64::new(0),
            num_replace: AtomicU64::new(0),
            num_unspent: AtomicU64::new(0),
            genesis: AtomicU64::new(now.as_secs()),
            inner: Mutex::new(LedgerInner::empty()),
        }
    }

    /// Economy hydrated from a persisted checkpoint.
    pub fn from_checkpoint(config: EconomyConfig, checkpoint: EconomyCheckpoint) -> Self {
        let state = Self::new(config, checkpoint.genesis);
        state.difficulty.store(checkpoint.difficulty, Ordering::SeqCst);
        state.num_reports.store(checkpoint.num_reports, Ordering::SeqCst);
        state.num_replace.store(checkpoint.num_replace, Ordering::SeqCst);
        state.num_unspent.store(checkpoint.num_unspent, Ordering::SeqCst);
        state
    }

    /// Snapshot the durable counters for persistence.
    pub fn checkpoint(&self) -> EconomyCheckpoint {
        // Lock so the counters are mutually consistent; checkpointing is
        // rare (shutdown) so contention is irrelevant.
        let _guard = self.lock();
        EconomyCheckpoint {
            num_reports: self.num_reports.load(Ordering::SeqCst),
            num_replace: self.num_replace.load(Ordering::SeqCst),
            num_unspent: self.num_unspent.load(Ordering::SeqCst),
            genesis: self.genesis(),
            difficulty: self.difficulty.load(Ordering::SeqCst),
        }
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// Current network difficulty.
    pub fn current_difficulty(&self) -> u32 {
        self.difficulty.load(Ordering::SeqCst)
    }

    pub fn genesis(&self) -> Timestamp {
        Timestamp::new(self.genesis.load(Ordering::SeqCst))
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, LedgerInner> {
        self.inner.lock().expect("economy state lock poisoned")
    }

    /// Aggregate statistics as of `now`.
    ///
    /// `num_reports` and `difficulty` are paired via a retry loop: read
    /// both, then re-check `num_reports`; a concurrent report bumps the
    /// counter last, so a stable re-read means the pair was coherent.
    /// `num_replace`/`num_unspent` may lag by an in-flight operation,
    /// which is acceptable for informational counters.
    pub fn stats(&self, now: Timestamp) -> EconomyStats {
        let (num_reports, difficulty) = loop {
            let n = self.num_reports.load(Ordering::SeqCst);
            let d = self.difficulty.load(Ordering::SeqCst);
            if n == self.num_reports.load(Ordering::SeqCst) {
                break (n, d);
            }
        };

        let epoch = self.config.epoch(num_reports);
        EconomyStats {
            timestamp: now,
            total_circulation: self.config.circulation(num_reports),
            expected_circulation: self.config.expected_circulation(self.genesis(), now),
            num_reports,
            num_replace: self.num_replace.load(Ordering::Relaxed),
            num_unspent: self.num_unspent.load(Ordering::Relaxed),
            mining_amount: self.config.initial_mining_amount.halved(epoch),
            subsidy_amount: self.config.initial_subsidy_amount.halved(epoch),
            epoch,
            difficulty,
        }
    }

    /// Look up a batch of ledger keys against the unspent/spent
    /// partition. Takes the state lock once for the whole slice; callers
    /// chunk their input and call repeatedly so heavy health checks don't
    /// starve the write path.
    pub fn check_batch(&self, hashes: &[WebcashHash]) -> Vec<TokenStatus> {
        let inner = self.lock();
        hashes
            .iter()
            .map(|hash| {
                if let Some(&amount) = inner.unspent.get(hash) {
                    TokenStatus::Unspent(amount)
                } else if inner.spent.contains(hash) {
                    TokenStatus::Spent
                } else {
                    TokenStatus::NeverSeen
                }
            })
            .collect()
    }

    /// Wipe all ledger data back to a fresh economy. Test isolation only.
    pub fn reset(&self, now: Timestamp) {
        let mut inner = self.lock();
        *inner = LedgerInner::empty();
        self.difficulty
            .store(u32::from(self.config.initial_difficulty), Ordering::SeqCst);
        self.num_reports.store(0, Ordering::SeqCst);
        self.num_replace.store(0, Ordering::SeqCst);
        self.num_unspent.store(0, Ordering::SeqCst);
        self.genesis.store(now.as_secs(), Ordering::SeqCst);
    }
}
