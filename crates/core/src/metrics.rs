//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Workflow (stage transitions, extraction and run outcomes, validation)
//! - External services (extraction service, automation service)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Workflow Metrics
// =============================================================================

/// Stage transitions.
pub static STAGE_TRANSITIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("rtw_stage_transitions_total", "Workflow stage transitions"),
        &["from", "to"],
    )
    .unwrap()
});

/// Extractions total by result.
pub static EXTRACTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("rtw_extractions_total", "Total extraction attempts"),
        &["result"], // "complete", "partial", "failed", "cancelled"
    )
    .unwrap()
});

/// Extraction stage duration in seconds.
pub static EXTRACTION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "rtw_extraction_duration_seconds",
            "Duration of the extraction stage",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["result"],
    )
    .unwrap()
});

/// Runs total by result.
pub static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("rtw_runs_total", "Total certificate runs"),
        &["result"], // "success", "failed", "cancelled"
    )
    .unwrap()
});

/// Run stage duration in seconds.
pub static RUN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("rtw_run_duration_seconds", "Duration of the run stage")
            .buckets(vec![5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        &["result"],
    )
    .unwrap()
});

/// Validation failures by reason.
pub static VALIDATION_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "rtw_validation_failures_total",
            "Operator actions rejected by local validation",
        ),
        &["reason"],
    )
    .unwrap()
});

/// Confidence reported by the extraction service.
pub static FIELD_CONFIDENCE: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "rtw_field_confidence",
            "Distribution of extraction confidence per field group",
        )
        .buckets(vec![0.0, 10.0, 25.0, 50.0, 70.0, 80.0, 90.0, 95.0, 100.0]),
        &["group"], // "share_code", "dob"
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "rtw_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "rtw_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Workflow
        Box::new(STAGE_TRANSITIONS.clone()),
        Box::new(EXTRACTIONS_TOTAL.clone()),
        Box::new(EXTRACTION_DURATION.clone()),
        Box::new(RUNS_TOTAL.clone()),
        Box::new(RUN_DURATION.clone()),
        Box::new(VALIDATION_FAILURES.clone()),
        Box::new(FIELD_CONFIDENCE.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_all_metrics_register_without_conflict() {
        let registry = Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        RUNS_TOTAL.with_label_values(&["success"]).inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|f| f.get_name().to_string())
            .collect();
        assert!(names.contains(&"rtw_runs_total".to_string()));
    }
}
