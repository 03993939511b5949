//! # vigil-diagnosis
//!
//! Diagnosis backends for Vigil.
//!
//! - [`DiagnosisService`]: the async seam the reconciler calls through
//! - [`WebhookDiagnosisService`]: POSTs to an external workflow
//! - [`ThresholdDiagnosisService`]: local fixed-threshold scorer
//! - [`normalize_response`]: boundary normalisation of workflow responses
//! - [`testing::ScriptedDiagnosisService`]: scriptable stand-in for tests
//!
//! [`from_settings`] picks the backend named in [`DiagnosisSettings`].

#![deny(unsafe_code)]

pub mod errors;
pub mod normalize;
pub mod request;
pub mod service;
pub mod testing;
pub mod threshold;
pub mod webhook;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use vigil_settings::{DiagnosisBackend, DiagnosisSettings};

pub use errors::{DiagnosisError, DiagnosisResult};
pub use normalize::normalize_response;
pub use request::{DiagnosisRequest, MeasurementSnapshot};
pub use service::DiagnosisService;
pub use threshold::ThresholdDiagnosisService;
pub use webhook::{WebhookConfig, WebhookDiagnosisService};

/// Build the diagnosis backend selected by `settings`.
pub fn from_settings(settings: &DiagnosisSettings) -> DiagnosisResult<Arc<dyn DiagnosisService>> {
    let service: Arc<dyn DiagnosisService> = match settings.backend {
        DiagnosisBackend::Webhook => Arc::new(WebhookDiagnosisService::new(WebhookConfig {
            url: settings.url.clone(),
            timeout: Duration::from_millis(settings.timeout_ms),
            connect_timeout: Duration::from_millis(settings.connect_timeout_ms),
        })?),
        DiagnosisBackend::Local => Arc::new(ThresholdDiagnosisService::new()),
    };
    info!(backend = service.name(), "diagnosis backend ready");
    Ok(service)
}
