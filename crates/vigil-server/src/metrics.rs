//! Prometheus metrics recorder and `/metrics` rendering.

use metrics::{Unit, describe_counter, describe_histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;
use vigil_tracking::metrics::{
    DIAGNOSIS_REQUEST_DURATION_SECONDS, DIAGNOSIS_REQUESTS_TOTAL, FATIGUE_REPORTS_TOTAL,
    SESSIONS_CLOSED_TOTAL,
};

/// Install the Prometheus recorder as the global metrics recorder.
///
/// Call once at startup, before any metric is recorded.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe();
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// Register descriptions for every metric the service records.
pub fn describe() {
    describe_counter!(FATIGUE_REPORTS_TOTAL, "Fatigue reports accepted for processing");
    describe_counter!(SESSIONS_CLOSED_TOTAL, "Sessions closed by report, manually, or when superseded");
    describe_counter!(DIAGNOSIS_REQUESTS_TOTAL, "Diagnosis service calls by outcome");
    describe_histogram!(
        DIAGNOSIS_REQUEST_DURATION_SECONDS,
        Unit::Seconds,
        "Diagnosis service call duration"
    );
}

/// Render Prometheus text format.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}
