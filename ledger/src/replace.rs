//! The replacement engine: N unspent inputs → M fresh outputs of equal
//! total value, atomically.

use serde_json::Value;

use webcash_types::Timestamp;

use crate::economy::{EconomyState, Replacement};
use crate::error::LedgerError;
use crate::request::{check_legalese, parse_secret_webcashes, sum_positive};

/// Validate and execute one replacement request.
///
/// Every step is a hard gate: the first failure aborts with no partial
/// effect. All ledger checks and all mutations happen under one
/// acquisition of the state lock, so concurrent requests over
/// overlapping keys serialize — at most one of them succeeds, the other
/// observes `missing` or `reuse`.
pub fn process_replacement(
    state: &EconomyState,
    body: &Value,
    received: Timestamp,
) -> Result<(), LedgerError> {
    if !body.is_object() {
        return Err(LedgerError::NoJsonBody);
    }
    if !check_legalese(body) {
        return Err(LedgerError::TermsNotAccepted);
    }

    let inputs_field = body.get("webcashes").ok_or(LedgerError::NoInputs)?;
    let inputs = parse_secret_webcashes(inputs_field).ok_or(LedgerError::CantParseInputs)?;
    let total_in = sum_positive(inputs.values().map(|token| token.amount))?;

    let outputs_field = body.get("new_webcashes").ok_or(LedgerError::NoOutputs)?;
    // Historical wire quirk: malformed outputs report the same error
    // string as malformed inputs.
    let outputs = parse_secret_webcashes(outputs_field).ok_or(LedgerError::CantParseInputs)?;
    let total_out = sum_positive(outputs.values().map(|token| token.amount))?;

    // Strict conservation of value.
    if total_in != total_out {
        return Err(LedgerError::Imbalance);
    }

    let mut inner = state.lock();

    // Every input must be live with exactly the claimed amount; the
    // ledger, not the client, is the authority on amounts.
    for (hash, token) in &inputs {
        match inner.unspent.get(hash) {
            None => return Err(LedgerError::MissingInput),
            Some(&amount) if amount != token.amount => return Err(LedgerError::WrongAmount),
            Some(_) => {}
        }
    }

    // No output key may ever have been on the ledger: a live key would be
    // overwritten, and a spent key's secret must be assumed burned.
    for hash in outputs.keys() {
        if inner.unspent.contains_key(hash) || inner.spent.contains(hash) {
            return Err(LedgerError::OutputReuse);
        }
    }

    // All checks passed; apply the whole mutation.
    let mut record = Replacement {
        inputs: Vec::with_capacity(inputs.len()),
        outputs: Vec::with_capacity(outputs.len()),
        received,
    };
    for (hash, token) in &inputs {
        inner.unspent.remove(hash);
        inner.spent.insert(*hash);
        record.inputs.push((*hash, token.amount));
    }
    for (hash, token) in &outputs {
        inner.unspent.insert(*hash, token.amount);
        record.outputs.push((*hash, token.amount));
    }
    inner.replacements.push(record);

    let num_replace = state
        .num_replace
        .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
        + 1;
    state
        .num_unspent
        .store(inner.unspent.len() as u64, std::sync::atomic::Ordering::SeqCst);

    tracing::info!(
        inputs = inputs.len(),
        outputs = outputs.len(),
        total = %total_in,
        tx = num_replace,
        utxos = inner.unspent.len(),
        "replaced webcash"
    );

    Ok(())
}
