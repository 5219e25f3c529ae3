use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics exporter
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!("estimates_total", "Total number of price estimates computed");
    describe_histogram!(
        "estimate_duration_seconds",
        "Time spent resolving and pricing an estimate"
    );
    describe_counter!("http_errors_total", "Total number of error responses by type");
    describe_counter!("catalog_reloads_total", "Catalog load attempts by outcome");
    describe_gauge!("catalog_categories", "Categories in the current catalog index");
    describe_gauge!("catalog_services", "Services in the current catalog index");
    describe_gauge!("shop_estimate_info", "Service version information");

    gauge!("shop_estimate_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a computed estimate
pub fn record_estimate(category: &str, pricing_mode: &str, duration: Duration) {
    counter!(
        "estimates_total",
        "category" => category.to_string(),
        "mode" => pricing_mode.to_string(),
    )
    .increment(1);
    histogram!("estimate_duration_seconds").record(duration.as_secs_f64());
}

/// Record an error response
pub fn record_error(error_type: &str) {
    counter!("http_errors_total", "error_type" => error_type.to_string()).increment(1);
}

/// Record a catalog load attempt (`success`, `invalid`, `unavailable`)
pub fn record_catalog_reload(outcome: &str) {
    counter!("catalog_reloads_total", "outcome" => outcome.to_string()).increment(1);
}

/// Publish the size of the current catalog index
pub fn set_catalog_size(categories: usize, services: usize) {
    gauge!("catalog_categories").set(categories as f64);
    gauge!("catalog_services").set(services as f64);
}
