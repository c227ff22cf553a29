//! # Prometheus Metrics
//!
//! Ledger metrics for the node, scraped at `/metrics` on the metrics port.
//! Registered in a dedicated [`prometheus::Registry`] under the `pegcoin`
//! prefix so they don't collide with anything in the default registry.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use pegcoin_contracts::{LedgerEvent, StablecoinError};
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// All metric handles. Clone-friendly: prometheus handles are `Arc`s.
#[derive(Clone)]
pub struct NodeMetrics {
    registry: Registry,
    /// Current total supply.
    pub total_supply: IntGauge,
    /// 1 while the ledger is paused.
    pub paused: IntGauge,
    /// Successful mints.
    pub mints_total: IntCounter,
    /// Successful redemptions.
    pub redemptions_total: IntCounter,
    /// Successful bridge burns.
    pub bridge_burns_total: IntCounter,
    /// Successful rebases, including zero-delta ones.
    pub rebases_total: IntCounter,
    /// Rejected requests, by reason.
    pub denials_total: IntCounterVec,
    /// Time spent handling a mutating request, including the ledger lock.
    pub request_latency_seconds: Histogram,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("pegcoin".into()), None)
            .expect("failed to create prometheus registry");

        let total_supply = IntGauge::new("total_supply", "Total issued supply")
            .expect("metric creation");
        registry
            .register(Box::new(total_supply.clone()))
            .expect("metric registration");

        let paused = IntGauge::new("paused", "1 while the ledger is paused, 0 otherwise")
            .expect("metric creation");
        registry
            .register(Box::new(paused.clone()))
            .expect("metric registration");

        let mints_total =
            IntCounter::new("mints_total", "Successful mints").expect("metric creation");
        registry
            .register(Box::new(mints_total.clone()))
            .expect("metric registration");

        let redemptions_total = IntCounter::new("redemptions_total", "Successful redemptions")
            .expect("metric creation");
        registry
            .register(Box::new(redemptions_total.clone()))
            .expect("metric registration");

        let bridge_burns_total = IntCounter::new("bridge_burns_total", "Successful bridge burns")
            .expect("metric creation");
        registry
            .register(Box::new(bridge_burns_total.clone()))
            .expect("metric registration");

        let rebases_total = IntCounter::new("rebases_total", "Successful peg adjustments")
            .expect("metric creation");
        registry
            .register(Box::new(rebases_total.clone()))
            .expect("metric registration");

        let denials_total = IntCounterVec::new(
            Opts::new("denials_total", "Rejected requests by reason"),
            &["reason"],
        )
        .expect("metric creation");
        registry
            .register(Box::new(denials_total.clone()))
            .expect("metric registration");

        let request_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "request_latency_seconds",
                "Mutating request latency in seconds",
            )
            .buckets(vec![
                0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25,
            ]),
        )
        .expect("metric creation");
        registry
            .register(Box::new(request_latency_seconds.clone()))
            .expect("metric registration");

        Self {
            registry,
            total_supply,
            paused,
            mints_total,
            redemptions_total,
            bridge_burns_total,
            rebases_total,
            denials_total,
            request_latency_seconds,
        }
    }

    /// Bumps the counter that matches an applied event.
    pub fn record_event(&self, event: &LedgerEvent) {
        match event {
            LedgerEvent::Minted { .. } => self.mints_total.inc(),
            LedgerEvent::Redeemed { .. } => self.redemptions_total.inc(),
            LedgerEvent::Bridged { .. } => self.bridge_burns_total.inc(),
            LedgerEvent::PegAdjusted { .. } => self.rebases_total.inc(),
            LedgerEvent::Paused { .. } => self.paused.set(1),
            LedgerEvent::Unpaused { .. } => self.paused.set(0),
        }
    }

    pub fn record_denial(&self, err: &StablecoinError) {
        self.denials_total.with_label_values(&[err.kind()]).inc();
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
