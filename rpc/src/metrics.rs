//! Prometheus metrics for the webcash server.
//!
//! The [`ApiMetrics`] struct owns a dedicated [`Registry`] that the
//! `/metrics` endpoint encodes into the Prometheus text exposition
//! format.

use prometheus::{
    register_int_counter_with_registry, register_int_gauge_with_registry, IntCounter, IntGauge,
    Encoder, Opts, Registry, TextEncoder,
};

/// Central collection of all server-level Prometheus metrics.
pub struct ApiMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    /// Total mining reports accepted.
    pub reports_accepted: IntCounter,
    /// Total replacements applied.
    pub replacements_applied: IntCounter,
    /// Total requests rejected with an error envelope.
    pub requests_rejected: IntCounter,
    /// Total health-check keys looked up.
    pub health_checks: IntCounter,

    /// Current number of unspent outputs.
    pub unspent_count: IntGauge,
    /// Current difficulty target in bits.
    pub difficulty_bits: IntGauge,
    /// Current issuance epoch.
    pub epoch: IntGauge,
}

impl ApiMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let reports_accepted = register_int_counter_with_registry!(
            Opts::new(
                "webcash_mining_reports_total",
                "Total mining reports accepted"
            ),
            registry
        )
        .expect("failed to register reports_accepted counter");

        let replacements_applied = register_int_counter_with_registry!(
            Opts::new(
                "webcash_replacements_total",
                "Total replacements applied"
            ),
            registry
        )
        .expect("failed to register replacements_applied counter");

        let requests_rejected = register_int_counter_with_registry!(
            Opts::new(
                "webcash_requests_rejected_total",
                "Total requests rejected with an error envelope"
            ),
            registry
        )
        .expect("failed to register requests_rejected counter");

        let health_checks = register_int_counter_with_registry!(
            Opts::new(
                "webcash_health_check_keys_total",
                "Total health-check keys looked up"
            ),
            registry
        )
        .expect("failed to register health_checks counter");

        let unspent_count = register_int_gauge_with_registry!(
            Opts::new(
                "webcash_unspent_count",
                "Current number of unspent outputs"
            ),
            registry
        )
        .expect("failed to register unspent_count gauge");

        let difficulty_bits = register_int_gauge_with_registry!(
            Opts::new(
                "webcash_difficulty_bits",
                "Current difficulty target in bits"
            ),
            registry
        )
        .expect("failed to register difficulty_bits gauge");

        let epoch = register_int_gauge_with_registry!(
            Opts::new("webcash_epoch", "Current issuance epoch"),
            registry
        )
        .expect("failed to register epoch gauge");

        Self {
            registry,
            reports_accepted,
            replacements_applied,
            requests_rejected,
            health_checks,
            unspent_count,
            difficulty_bits,
            epoch,
        }
    }

    /// Encode all registered metrics in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}
