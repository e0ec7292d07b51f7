//! Metrics collection for synthd
//!
//! Prometheus counters for the compile path. Counters are atomic and only
//! ever incremented; request handling never reads them back.

use crate::error::{Result, ServiceError};
use lazy_static::lazy_static;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use std::sync::Arc;

/// Metrics registry for synthd
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    pub registry: Arc<Registry>,
    pub compile: CompileMetrics,
}

/// Compile-path metrics
#[derive(Debug, Clone)]
pub struct CompileMetrics {
    /// Total number of compile requests received
    pub requests_total: IntCounter,

    /// Requests answered with a timing verdict
    pub requests_success: IntCounter,

    /// Requests rejected by validation
    pub requests_invalid: IntCounter,

    /// Requests the backend failed to synthesize
    pub requests_failed: IntCounter,

    /// Successful verdicts with negative slack
    pub timing_violations: IntCounter,

    /// Request duration histogram
    pub request_duration: Histogram,

    /// Requests currently in flight
    pub active_requests: IntGauge,
}

lazy_static! {
    /// Global metrics registry instance
    pub static ref METRICS: MetricsRegistry =
        MetricsRegistry::new().expect("compile metrics are registered exactly once");
}

fn counter(registry: &Registry, name: &str, help: &str) -> prometheus::Result<IntCounter> {
    let counter = IntCounter::new(name, help)?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

impl MetricsRegistry {
    /// Create a new metrics registry with every compile metric registered
    pub fn new() -> Result<Self> {
        Self::build().map_err(|e| ServiceError::internal(format!("metrics registration: {}", e)))
    }

    fn build() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let requests_total = counter(
            &registry,
            "compile_requests_total",
            "Total number of compile requests",
        )?;
        let requests_success = counter(
            &registry,
            "compile_requests_success_total",
            "Compile requests answered with a timing verdict",
        )?;
        let requests_invalid = counter(
            &registry,
            "compile_requests_invalid_total",
            "Compile requests rejected by validation",
        )?;
        let requests_failed = counter(
            &registry,
            "compile_requests_failed_total",
            "Compile requests the backend could not synthesize",
        )?;
        let timing_violations = counter(
            &registry,
            "compile_timing_violations_total",
            "Timing verdicts with negative slack",
        )?;

        let request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "compile_request_duration_seconds",
                "Compile request duration in seconds",
            )
            .buckets(vec![0.0001, 0.001, 0.01, 0.1, 1.0, 10.0, 60.0, 600.0]),
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        let active_requests = IntGauge::new(
            "compile_active_requests",
            "Current number of in-flight compile requests",
        )?;
        registry.register(Box::new(active_requests.clone()))?;

        Ok(MetricsRegistry {
            registry,
            compile: CompileMetrics {
                requests_total,
                requests_success,
                requests_invalid,
                requests_failed,
                timing_violations,
                request_duration,
                active_requests,
            },
        })
    }

    /// Gather all metrics as text
    pub fn gather(&self) -> Result<String> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| ServiceError::internal(format!("metrics encoding: {}", e)))?;
        String::from_utf8(buffer).map_err(|e| ServiceError::internal(e.to_string()))
    }
}

/// Tracks one in-flight request; decrements the gauge and records the
/// duration when dropped, including when the client goes away mid-request.
pub struct RequestGuard {
    metrics: CompileMetrics,
    start: std::time::Instant,
}

impl RequestGuard {
    /// Count a new request and mark it in flight
    pub fn start(metrics: &CompileMetrics) -> Self {
        metrics.requests_total.inc();
        metrics.active_requests.inc();
        Self {
            metrics: metrics.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.metrics.active_requests.dec();
        self.metrics
            .request_duration
            .observe(self.start.elapsed().as_secs_f64());
    }
}
