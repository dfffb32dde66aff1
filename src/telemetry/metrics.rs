//! Prometheus metrics setup and metric definitions

use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_prometheus_recorder() -> anyhow::Result<PrometheusHandle> {
    // Seconds. Provider round trips dominate, so the upper buckets reach the step timeout.
    let buckets = [
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets(&buckets)?
        .install_recorder()?;
    Ok(handle)
}

/// Register metric descriptions so `/metrics` carries HELP/TYPE lines from startup.
pub fn describe_metrics() {
    // HTTP metrics
    describe_counter!("idlink_http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "idlink_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_gauge!(
        "idlink_http_requests_in_flight",
        "Number of HTTP requests currently being processed"
    );

    // Unlink metrics
    describe_counter!(
        "idlink_unlink_requests_total",
        "Unlink requests by outcome, error kind and winning strategy"
    );
    describe_counter!(
        "idlink_unlink_strategy_attempts_total",
        "Removal strategy attempts by strategy and result"
    );
    describe_histogram!(
        "idlink_unlink_duration_seconds",
        "End-to-end unlink duration in seconds"
    );

    gauge!("idlink_http_requests_in_flight").set(0.0);
}
