//! Wire-level error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use webcash_ledger::LedgerError;

/// A request rejection, rendered as the uniform JSON error envelope.
///
/// Deployed clients match on the exact error string and on the 500 status
/// code, so both are fixed regardless of the rejection's cause.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub LedgerError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "status": "error",
            "error": self.0.to_string(),
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn envelope_preserves_wire_strings() {
        let response = ApiError(LedgerError::Imbalance).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"status": "error", "error": "inbalance"}));
    }

    #[test]
    fn display_passes_through() {
        assert_eq!(ApiError(LedgerError::Imbalance).to_string(), "inbalance");
        assert_eq!(
            ApiError(LedgerError::MissingSubsidyField).to_string(),
            "missing 'subsidy' field in peimage"
        );
    }
}
