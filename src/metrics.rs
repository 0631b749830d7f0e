use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};
use std::time::Instant;

use crate::models::BackendKind;

lazy_static! {
    pub static ref QUERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "promql_dashboard_queries_total",
        "Queries handled, by endpoint and outcome",
        &["endpoint", "outcome"]
    )
    .expect("queries_total registers once");

    pub static ref UPSTREAM_DURATION: HistogramVec = register_histogram_vec!(
        "promql_dashboard_upstream_duration_seconds",
        "Time spent waiting on the metrics backend",
        &["kind"],
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]
    )
    .expect("upstream_duration registers once");
}

pub fn record_query(endpoint: &str, outcome: &str) {
    QUERIES_TOTAL.with_label_values(&[endpoint, outcome]).inc();
}

/// Observes upstream latency when dropped, whichever way the call ends.
pub struct UpstreamTimer {
    kind: BackendKind,
    start: Instant,
}

impl UpstreamTimer {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Drop for UpstreamTimer {
    fn drop(&mut self) {
        let kind = self.kind.to_string();
        UPSTREAM_DURATION
            .with_label_values(&[kind.as_str()])
            .observe(self.elapsed_secs());
    }
}

/// Text exposition of everything in the default registry.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!("failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_metrics_include_counters() {
        record_query("api", "ok");
        drop(UpstreamTimer::new(BackendKind::VictoriaMetrics));

        let text = render();
        assert!(text.contains("promql_dashboard_queries_total"));
        assert!(text.contains("promql_dashboard_upstream_duration_seconds"));
        assert!(text.contains("kind=\"victoriametrics\""));
    }
}
