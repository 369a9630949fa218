use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the process-wide Prometheus recorder. Call once at startup.
    pub fn init() -> anyhow::Result<Self> {
        // Use default buckets to avoid API differences across crate versions.
        let handle = PrometheusBuilder::new().install_recorder()?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scout_dispatched_total", "Scout tasks started.");
        describe_counter!(
            "scout_timeouts_total",
            "Scout tasks that exceeded their time budget."
        );
        describe_counter!(
            "scout_failures_total",
            "Scout tasks that failed for reasons other than a timeout."
        );
        describe_histogram!("scout_duration_ms", "Per-source scout time in milliseconds.");
        describe_counter!(
            "assessments_total",
            "Completed assessments, labelled by delay_risk."
        );
        describe_counter!(
            "assessments_no_sources_total",
            "Assessments short-circuited because no source matched."
        );
        describe_histogram!(
            "assessment_duration_ms",
            "End-to-end assessment time in milliseconds."
        );
    });
}
