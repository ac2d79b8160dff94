//! JSON/HTTP API for the webcash server.
//!
//! Endpoints:
//! - `POST /api/v1/replace` — atomic token replacement
//! - `POST /api/v1/mining_report` — proof-of-work reward claims
//! - `POST /api/v1/health_check` — batch unspent/spent lookups
//! - `GET /api/v1/target` — current difficulty target and reward
//! - `GET /stats` — economy-wide statistics
//! - `GET /metrics` — Prometheus text exposition
//!
//! Every rejection is reported as `{"status": "error", "error": <string>}`
//! with HTTP 500; the error strings are part of the wire contract.

pub mod error;
pub mod format;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use error::ApiError;
pub use metrics::ApiMetrics;
pub use server::{api_router, ApiContext};
