//! `/health` endpoint.

use serde::Serialize;
use std::time::Instant;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `"ok"` when every dependency answered, `"degraded"` otherwise.
    pub status: &'static str,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Database round-trip result.
    pub database: &'static str,
    /// Configured diagnosis backend.
    pub diagnosis_backend: &'static str,
}

impl HealthResponse {
    /// Whether every dependency is up.
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Build a health response from a database ping result.
pub fn health_check(start_time: Instant, database_ok: bool, backend: &'static str) -> HealthResponse {
    HealthResponse {
        status: if database_ok { "ok" } else { "degraded" },
        uptime_secs: start_time.elapsed().as_secs(),
        database: if database_ok { "ok" } else { "unavailable" },
        diagnosis_backend: backend,
    }
}
