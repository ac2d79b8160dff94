//! JSON request-shape helpers shared by the write engines.
//!
//! These run before any shared state is touched, so a failure here has
//! zero side effects by construction.

use std::collections::BTreeMap;

use serde_json::Value;

use webcash_types::{Amount, PublicWebcash, SecretWebcash, WebcashHash};

use crate::error::LedgerError;

/// True iff the request body carries `legalese.terms == true`.
pub(crate) fn check_legalese(body: &Value) -> bool {
    body.get("legalese")
        .and_then(|legalese| legalese.get("terms"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Parse a JSON array of secret webcash strings into a hash-keyed map.
///
/// `None` on anything that isn't an array of parseable secret strings, or
/// on a duplicate ledger key within the array.
pub(crate) fn parse_secret_webcashes(
    value: &Value,
) -> Option<BTreeMap<WebcashHash, SecretWebcash>> {
    let array = value.as_array()?;
    let mut tokens = BTreeMap::new();
    for entry in array {
        let token: SecretWebcash = entry.as_str()?.parse().ok()?;
        let hash = token.to_public().hash;
        if tokens.insert(hash, token).is_some() {
            return None; // duplicate
        }
    }
    Some(tokens)
}

/// Parse a JSON array of public webcash strings, keeping the submitted
/// text alongside each parsed token (responses are keyed by the original,
/// possibly non-canonical, encoding).
pub(crate) fn parse_public_webcashes(value: &Value) -> Option<Vec<(String, PublicWebcash)>> {
    let array = value.as_array()?;
    let mut tokens = Vec::with_capacity(array.len());
    for entry in array {
        let text = entry.as_str()?;
        let token: PublicWebcash = text.parse().ok()?;
        tokens.push((text.to_string(), token));
    }
    Some(tokens)
}

/// Sum token amounts with the ledger's overflow rule: every item and
/// every running total must stay strictly positive in i64 range.
///
/// An empty iterator sums to zero; callers that require a non-empty set
/// enforce that separately.
pub(crate) fn sum_positive(
    amounts: impl Iterator<Item = Amount>,
) -> Result<Amount, LedgerError> {
    let mut total = Amount::ZERO;
    for amount in amounts {
        if !amount.is_positive() {
            return Err(LedgerError::Overflow);
        }
        total = total.checked_add(amount).ok_or(LedgerError::Overflow)?;
        if !total.is_positive() {
            return Err(LedgerError::Overflow);
        }
    }
    Ok(total)
}
