//! Ledger rejection errors.
//!
//! The `Display` strings double as the wire-protocol `error` field and are
//! matched on by deployed clients, so they are frozen byte-for-byte —
//! including the long-deployed `"peimage"` misspelling and the reuse
//! of `"can't parse inputs"` for malformed replacement outputs.

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ── Request shape ───────────────────────────────────────────────────
    #[error("no JSON body")]
    NoJsonBody,

    #[error("didn't accept terms")]
    TermsNotAccepted,

    #[error("no inputs")]
    NoInputs,

    #[error("can't parse inputs")]
    CantParseInputs,

    #[error("no outputs")]
    NoOutputs,

    #[error("overflow")]
    Overflow,

    #[error("inbalance")]
    Imbalance,

    // ── Replacement conflicts (detected under the state lock) ───────────
    #[error("missing")]
    MissingInput,

    #[error("wrong amount")]
    WrongAmount,

    #[error("reuse")]
    OutputReuse,

    // ── Mining-report preimage shape ────────────────────────────────────
    #[error("missing preimage")]
    MissingPreimage,

    #[error("preimage is not base64-encoded string")]
    PreimageNotBase64,

    #[error("couldn't parse preimage as JSON")]
    PreimageNotJson,

    #[error("missing 'webcash' field in preimage")]
    MissingWebcashField,

    #[error("'webcash' field in preimage needs to be array of webcash secrets")]
    MalformedWebcashField,

    #[error("missing 'subsidy' field in peimage")]
    MissingSubsidyField,

    #[error("'subsidy' field in preimage needs to be array of webcash secrets")]
    MalformedSubsidyField,

    #[error("'timestamp' field in preimage must be numeric")]
    TimestampNotNumeric,

    #[error("'difficulty' field in preimage must be small positive integer")]
    DifficultyNotInteger,

    #[error("'difficulty' field in preimage is too high")]
    DifficultyFieldTooHigh,

    #[error("missing subsidy from webcash")]
    SubsidyNotInWebcash,

    #[error("subsidy doesn't match webcash")]
    SubsidyAmountMismatch,

    #[error("timestamp of mining report must be within 2 hours of receipt by server")]
    TimestampSkew,

    // ── Mining-report policy ────────────────────────────────────────────
    #[error("difficulty too low")]
    DifficultyTooLow,

    #[error("proof-of-work doesn't match committed difficulty")]
    ProofBelowCommitted,

    #[error("committed difficulty is less than current difficulty")]
    CommittedBelowCurrent,

    #[error("proof of work doesn't meet current difficulty")]
    ProofBelowCurrent,

    #[error("reused preimage")]
    ReusedProof,

    #[error("output already exists")]
    OutputAlreadyExists,

    #[error("outputs don't match allowed amount")]
    MiningAmountMismatch,

    #[error("subsidy doesn't match required amount")]
    SubsidyRequiredMismatch,

    // ── Health check ────────────────────────────────────────────────────
    #[error("arguments needs to be array of webcash public webcash strings")]
    NotPublicArray,

    #[error("internal server error")]
    Internal,
}
