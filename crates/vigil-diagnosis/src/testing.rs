//! Scriptable diagnosis service for tests in this and downstream crates.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use vigil_core::{Diagnosis, Severity};

use crate::errors::{DiagnosisError, DiagnosisResult};
use crate::request::DiagnosisRequest;
use crate::service::DiagnosisService;

/// Diagnosis service whose answers are set by the test.
///
/// Counts calls, remembers the last request, and can be switched into a
/// failing mode or slowed down to exercise timeouts.
pub struct ScriptedDiagnosisService {
    calls: AtomicUsize,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    response: Mutex<Diagnosis>,
    last_request: Mutex<Option<DiagnosisRequest>>,
}

impl ScriptedDiagnosisService {
    /// A service that answers with a fixed `NORMAL` diagnosis.
    pub fn new() -> Self {
        Self::answering(Diagnosis::new(
            "Estado normal",
            Severity::Normal,
            vec!["Aplica la regla 20-20-20".into()],
        ))
    }

    /// A service that answers with `diagnosis`.
    pub fn answering(diagnosis: Diagnosis) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay: Mutex::new(None),
            response: Mutex::new(diagnosis),
            last_request: Mutex::new(None),
        }
    }

    /// Make every following call fail with a `503` status.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Sleep this long before answering.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock() = delay;
    }

    /// Replace the diagnosis returned by later calls.
    pub fn set_response(&self, diagnosis: Diagnosis) {
        *self.response.lock() = diagnosis;
    }

    /// Number of `diagnose` calls so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request seen.
    pub fn last_request(&self) -> Option<DiagnosisRequest> {
        self.last_request.lock().clone()
    }
}

impl Default for ScriptedDiagnosisService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DiagnosisService for ScriptedDiagnosisService {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn diagnose(&self, request: &DiagnosisRequest) -> DiagnosisResult<Diagnosis> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request.clone());

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(DiagnosisError::Status {
                status: 503,
                body: "scripted failure".into(),
            });
        }
        Ok(self.response.lock().clone())
    }
}
