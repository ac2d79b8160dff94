//! Read-only health checks over the unspent/spent partition.

use serde_json::Value;

use webcash_types::WebcashHash;

use crate::economy::{EconomyState, TokenStatus};
use crate::error::LedgerError;
use crate::request::parse_public_webcashes;

/// Number of lookups performed per state-lock acquisition. Large checks
/// release and reacquire the lock between chunks so they cannot starve
/// the write path.
pub const HEALTH_CHECK_BATCH: usize = 20;

/// Look up a JSON array of public webcash strings against the ledger.
///
/// Results are keyed by the submitted text, not its canonical form, so
/// callers can find their record even if they sent a non-canonical
/// encoding (different hex capitalization). The response is a best-effort
/// snapshot: writes may interleave between chunks.
pub fn process_health_check(
    state: &EconomyState,
    body: &Value,
) -> Result<Vec<(String, TokenStatus)>, LedgerError> {
    let inputs = parse_public_webcashes(body).ok_or(LedgerError::NotPublicArray)?;
    let mut results = Vec::with_capacity(inputs.len());
    for chunk in inputs.chunks(HEALTH_CHECK_BATCH) {
        let hashes: Vec<WebcashHash> = chunk.iter().map(|(_, token)| token.hash).collect();
        let statuses = state.check_batch(&hashes);
        for ((text, _), status) in chunk.iter().zip(statuses) {
            results.push((text.clone(), status));
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use webcash_types::{Amount, Timestamp};

    use crate::issuance::EconomyConfig;

    fn state_with_live_output() -> (EconomyState, WebcashHash) {
        let state = EconomyState::new(EconomyConfig::default(), Timestamp::EPOCH);
        let hash: WebcashHash = "a1a2a3a4a5a6a7a8a9aaabacadaeafb0b1b2b3b4b5b6b7b8b9babbbcbdbebfc0"
            .parse()
            .unwrap();
        state.lock().unspent.insert(hash, Amount::from_whole(5));
        (state, hash)
    }

    #[test]
    fn statuses_keyed_by_submitted_text() {
        let (state, hash) = state_with_live_output();
        state.lock().spent.insert(
            "0000000000000000000000000000000000000000000000000000000000000001"
                .parse()
                .unwrap(),
        );

        // Uppercase hex parses to the same key but must echo back as sent.
        let live = format!("e5:public:{}", format!("{hash}").to_uppercase());
        let dead = "e1:public:0000000000000000000000000000000000000000000000000000000000000001";
        let unseen = "e1:public:00000000000000000000000000000000000000000000000000000000000000ff";
        let body = json!([live, dead, unseen]);

        let results = process_health_check(&state, &body).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0], (live.clone(), TokenStatus::Unspent(Amount::from_whole(5))));
        assert_eq!(results[1], (dead.to_string(), TokenStatus::Spent));
        assert_eq!(results[2], (unseen.to_string(), TokenStatus::NeverSeen));
    }

    #[test]
    fn non_array_and_bad_entries_rejected() {
        let (state, _) = state_with_live_output();
        for body in [
            json!({"webcashes": []}),
            json!([42]),
            json!(["e5:secret:a1a2a3a4a5a6a7a8a9aaabacadaeafb0b1b2b3b4b5b6b7b8b9babbbcbdbebfc0"]),
        ] {
            assert_eq!(
                process_health_check(&state, &body).unwrap_err(),
                LedgerError::NotPublicArray
            );
        }
    }

    #[test]
    fn large_checks_are_chunked() {
        let (state, hash) = state_with_live_output();
        let text = format!("e5:public:{hash}");
        let body = json!(vec![text.clone(); 3 * HEALTH_CHECK_BATCH + 1]);
        let results = process_health_check(&state, &body).unwrap();
        assert_eq!(results.len(), 3 * HEALTH_CHECK_BATCH + 1);
        assert!(results
            .iter()
            .all(|(key, status)| key == &text && *status == TokenStatus::Unspent(Amount::from_whole(5))));
    }
}
