//! Prometheus metrics for monitoring the LLM router.
//!
//! This module provides a centralized metrics registry tracking forwarded
//! requests, failover retries, and provider invalidations.

use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};
use std::sync::OnceLock;

/// Container for all application metrics.
pub struct Metrics {
    /// Total number of forwarded requests by method, provider, and status
    pub request_count: IntCounterVec,

    /// Duration until the upstream response headers arrive, in seconds
    pub request_duration: HistogramVec,

    /// Total number of failover retries by provider that triggered them
    pub retry_count: IntCounterVec,

    /// Total number of provider invalidations (quota-limit detections)
    pub provider_invalidations: IntCounterVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Initialize the metrics registry.
///
/// This should be called once at application startup. Subsequent calls will
/// return the same instance.
pub fn init_metrics() -> &'static Metrics {
    METRICS.get_or_init(|| {
        let request_count = register_int_counter_vec!(
            "llm_router_requests_total",
            "Total number of requests forwarded upstream",
            &["method", "provider", "status_code"]
        )
        .expect("Failed to register request_count metric");

        let request_duration = register_histogram_vec!(
            "llm_router_request_duration_seconds",
            "Time until upstream response headers arrive",
            &["method", "provider"],
            vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]
        )
        .expect("Failed to register request_duration metric");

        let retry_count = register_int_counter_vec!(
            "llm_router_retries_total",
            "Total number of failover retries",
            &["provider"]
        )
        .expect("Failed to register retry_count metric");

        let provider_invalidations = register_int_counter_vec!(
            "llm_router_provider_invalidations_total",
            "Total number of provider invalidations after quota-limit responses",
            &["provider"]
        )
        .expect("Failed to register provider_invalidations metric");

        Metrics {
            request_count,
            request_duration,
            retry_count,
            provider_invalidations,
        }
    })
}

/// Get the global metrics instance.
///
/// # Panics
///
/// Panics if metrics have not been initialized via [`init_metrics`].
pub fn get_metrics() -> &'static Metrics {
    METRICS.get().expect("Metrics not initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        let metrics = init_metrics();

        metrics
            .request_count
            .with_label_values(&["GET", "test-provider", "200"])
            .inc();

        // The same instance is returned on every call
        let metrics2 = get_metrics();
        assert!(std::ptr::eq(metrics, metrics2));
    }

    #[test]
    fn test_request_count_metric() {
        let metrics = init_metrics();

        let initial = metrics
            .request_count
            .with_label_values(&["POST", "unique-provider", "201"])
            .get();

        metrics
            .request_count
            .with_label_values(&["POST", "unique-provider", "201"])
            .inc();

        let after = metrics
            .request_count
            .with_label_values(&["POST", "unique-provider", "201"])
            .get();

        assert_eq!(after, initial + 1);
    }

    #[test]
    fn test_invalidation_metric() {
        let metrics = init_metrics();

        let initial = metrics
            .provider_invalidations
            .with_label_values(&["invalidated-provider"])
            .get();

        metrics
            .provider_invalidations
            .with_label_values(&["invalidated-provider"])
            .inc();

        let after = metrics
            .provider_invalidations
            .with_label_values(&["invalidated-provider"])
            .get();

        assert_eq!(after, initial + 1);
    }

    #[test]
    fn test_request_duration_metric() {
        let metrics = init_metrics();

        metrics
            .request_duration
            .with_label_values(&["POST", "timed-provider"])
            .observe(1.5);

        let metric = metrics
            .request_duration
            .with_label_values(&["POST", "timed-provider"]);

        assert!(metric.get_sample_count() >= 1);
    }
}
