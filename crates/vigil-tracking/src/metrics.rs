//! Metric names recorded by the tracking components.

/// Fatigue reports accepted for processing (counter, labels: model).
pub const FATIGUE_REPORTS_TOTAL: &str = "fatigue_reports_total";
/// Sessions closed (counter, labels: model, trigger).
pub const SESSIONS_CLOSED_TOTAL: &str = "sessions_closed_total";
/// Diagnosis service calls (counter, labels: backend, outcome).
pub const DIAGNOSIS_REQUESTS_TOTAL: &str = "diagnosis_requests_total";
/// Diagnosis service call duration (histogram, labels: backend).
pub const DIAGNOSIS_REQUEST_DURATION_SECONDS: &str = "diagnosis_request_duration_seconds";

/// Every metric name, for exporters that pre-register descriptions.
pub const ALL: [&str; 4] = [
    FATIGUE_REPORTS_TOTAL,
    SESSIONS_CLOSED_TOTAL,
    DIAGNOSIS_REQUESTS_TOTAL,
    DIAGNOSIS_REQUEST_DURATION_SECONDS,
];
