//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the RTW check server:
//! - HTTP request metrics (latency, counts)
//! - Current workflow stage (collected dynamically)
//! - Core workflow and external service metrics (registered from `rtw_core`)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "rtw_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0, 300.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("rtw_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "rtw_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Workflow Metrics
// =============================================================================

/// 1 for the active stage, 0 for every other.
pub static WORKFLOW_STAGE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("rtw_workflow_stage", "Current workflow stage"),
        &["stage"],
    )
    .unwrap()
});

const STAGES: [&str; 6] = [
    "idle",
    "extracting",
    "awaiting_review",
    "submitting",
    "complete",
    "failed",
];

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Workflow
    registry.register(Box::new(WORKFLOW_STAGE.clone())).unwrap();

    // Core metrics (workflow transitions, extraction, runs, external services)
    for metric in rtw_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the stage gauge reflects the live workflow.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let current = state.workflow().stage().await;
    for stage in STAGES {
        WORKFLOW_STAGE
            .with_label_values(&[stage])
            .set(if stage == current.name() { 1 } else { 0 });
    }
}

/// Paths served by the router, used verbatim as metric labels.
const ROUTES: &[&str] = &[
    "/api/v1/health",
    "/api/v1/config",
    "/api/v1/workflow",
    "/api/v1/workflow/extract",
    "/api/v1/workflow/fields",
    "/api/v1/workflow/run",
    "/api/v1/workflow/reset",
    "/metrics",
];

/// Label for any path the router does not serve.
pub const UNMATCHED_PATH: &str = "unmatched";

/// Normalize a path for metric labels.
///
/// Known routes keep their path (ignoring a trailing slash); everything else
/// collapses into [`UNMATCHED_PATH`] so scanners cannot grow label cardinality.
pub fn normalize_path(path: &str) -> &'static str {
    let trimmed = match path.trim_end_matches('/') {
        "" => "/",
        p => p,
    };
    ROUTES
        .iter()
        .find(|route| **route == trimmed)
        .copied()
        .unwrap_or(UNMATCHED_PATH)
}
