//! Endpoint handlers.
//!
//! Each write handler is a thin shim: extract the JSON body, hand it to
//! the corresponding ledger engine, and translate the outcome into the
//! wire envelope. All validation semantics live in `webcash-ledger`.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Map, Value};

use webcash_ledger::{
    process_health_check, process_mining_report, process_replacement, LedgerError, TokenStatus,
};
use webcash_types::Timestamp;

use crate::error::ApiError;
use crate::format::{circulation_formatted, circulation_json};
use crate::server::ApiContext;

pub(crate) async fn replace(
    State(ctx): State<Arc<ApiContext>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let Some(Json(body)) = body else {
        return Err(ctx.reject(LedgerError::NoJsonBody));
    };
    let received = Timestamp::now();
    match process_replacement(&ctx.economy, &body, received) {
        Ok(()) => {
            ctx.metrics.replacements_applied.inc();
            ctx.observe_economy(received);
            Ok(Json(json!({"status": "success"})))
        }
        Err(err) => Err(ctx.reject(err)),
    }
}

pub(crate) async fn mining_report(
    State(ctx): State<Arc<ApiContext>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let Some(Json(body)) = body else {
        return Err(ctx.reject(LedgerError::NoJsonBody));
    };
    let received = Timestamp::now();
    match process_mining_report(&ctx.economy, &body, received) {
        Ok(next_target) => {
            ctx.metrics.reports_accepted.inc();
            ctx.observe_economy(received);
            Ok(Json(json!({
                "status": "success",
                "difficulty_target": next_target,
            })))
        }
        Err(err) => Err(ctx.reject(err)),
    }
}

pub(crate) async fn health_check(
    State(ctx): State<Arc<ApiContext>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let Some(Json(body)) = body else {
        return Err(ctx.reject(LedgerError::NoJsonBody));
    };
    let statuses = match process_health_check(&ctx.economy, &body) {
        Ok(statuses) => statuses,
        Err(err) => return Err(ctx.reject(err)),
    };
    ctx.metrics.health_checks.inc_by(statuses.len() as u64);

    let mut results = Map::with_capacity(statuses.len());
    for (key, status) in statuses {
        let entry = match status {
            TokenStatus::Unspent(amount) => json!({
                "spent": false,
                "amount": amount.to_string(),
            }),
            TokenStatus::Spent => json!({"spent": true}),
            // A never-seen webcash is indicated by a null "spent" value.
            TokenStatus::NeverSeen => json!({"spent": null}),
        };
        results.insert(key, entry);
    }
    Ok(Json(json!({
        "status": "success",
        "results": results,
    })))
}

pub(crate) async fn target(State(ctx): State<Arc<ApiContext>>) -> Json<Value> {
    let stats = ctx.economy.stats(Timestamp::now());
    Json(json!({
        "difficulty_target_bits": stats.difficulty,
        "epoch": stats.epoch,
        "mining_amount": stats.mining_amount.to_string(),
        "mining_subsidy_amount": stats.subsidy_amount.to_string(),
        "ratio": stats.ratio(),
    }))
}

pub(crate) async fn stats(State(ctx): State<Arc<ApiContext>>) -> Json<Value> {
    let stats = ctx.economy.stats(Timestamp::now());
    Json(json!({
        "circulation": circulation_json(stats.total_circulation),
        "circulation_formatted": circulation_formatted(stats.total_circulation),
        "ratio": stats.ratio(),
        "mining_reports": stats.num_reports,
        "epoch": stats.epoch,
        "difficulty_target_bits": stats.difficulty,
        "mining_amount": stats.mining_amount.to_string(),
        "mining_subsidy_amount": stats.subsidy_amount.to_string(),
    }))
}

pub(crate) async fn metrics(State(ctx): State<Arc<ApiContext>>) -> Result<String, ApiError> {
    ctx.observe_economy(Timestamp::now());
    ctx.metrics.encode().map_err(|err| {
        tracing::error!(%err, "failed to encode metrics");
        ApiError(LedgerError::Internal)
    })
}
