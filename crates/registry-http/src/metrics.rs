//! Prometheus metrics for the mirror protocol.

use prometheus::{IntCounterVec, Opts, Registry, TextEncoder};

/// Counters exposed at `/metrics`, centered on the mirror protocol's
/// `mirror_requests_total{registry,cache,source}` counter.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    mirror_requests_total: IntCounterVec,
}

impl Metrics {
    /// Create a fresh registry with all counters registered.
    ///
    /// # Panics
    ///
    /// Panics if counter registration fails, which only happens on a
    /// duplicate metric name within the same registry — a programmer error,
    /// not a runtime condition.
    #[must_use]
    pub fn new() -> Self {
        let registry = Registry::new();
        let mirror_requests_total = IntCounterVec::new(
            Opts::new("mirror_requests_total", "Completed mirror protocol requests"),
            &["registry", "cache", "source"],
        )
        .expect("valid counter options");
        registry
            .register(Box::new(mirror_requests_total.clone()))
            .expect("metric name is unique within this registry");

        Self {
            registry,
            mirror_requests_total,
        }
    }

    /// Record one completed mirror request.
    pub fn record_mirror_request(&self, registry_host: &str, cache: &str, source: &str) {
        self.mirror_requests_total
            .with_label_values(&[registry_host, cache, source])
            .inc();
    }

    /// Render the current registry in Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding the metric families fails.
    pub fn render(&self) -> prometheus::Result<String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
