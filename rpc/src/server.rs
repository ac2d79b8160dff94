//! Router construction and shared handler state.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use webcash_ledger::{EconomyState, LedgerError};
use webcash_types::Timestamp;

use crate::error::ApiError;
use crate::handlers;
use crate::metrics::ApiMetrics;

/// Shared state for the API handlers: the economy plus the metrics that
/// describe it.
pub struct ApiContext {
    pub economy: Arc<EconomyState>,
    pub metrics: ApiMetrics,
}

impl ApiContext {
    pub fn new(economy: Arc<EconomyState>) -> Self {
        Self {
            economy,
            metrics: ApiMetrics::new(),
        }
    }

    /// Count a rejection and wrap it into the wire envelope.
    pub(crate) fn reject(&self, err: LedgerError) -> ApiError {
        self.metrics.requests_rejected.inc();
        tracing::debug!(error = %err, "request rejected");
        ApiError(err)
    }

    /// Refresh the economy gauges from a counter snapshot.
    pub(crate) fn observe_economy(&self, now: Timestamp) {
        let stats = self.economy.stats(now);
        self.metrics.unspent_count.set(stats.num_unspent as i64);
        self.metrics.difficulty_bits.set(i64::from(stats.difficulty));
        self.metrics.epoch.set(i64::from(stats.epoch));
    }
}

/// Build the full API router over a shared context.
pub fn api_router(ctx: Arc<ApiContext>) -> Router {
    Router::new()
        .route("/api/v1/replace", post(handlers::replace))
        .route("/api/v1/mining_report", post(handlers::mining_report))
        .route("/api/v1/health_check", post(handlers::health_check))
        .route("/api/v1/target", get(handlers::target))
        .route("/stats", get(handlers::stats))
        .route("/metrics", get(handlers::metrics))
        .with_state(ctx)
}
