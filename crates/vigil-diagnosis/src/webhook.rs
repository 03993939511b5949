//! Webhook-backed diagnosis service.
//!
//! POSTs the [`DiagnosisRequest`] as JSON to a workflow endpoint and
//! normalises whatever comes back. The `reqwest` client carries both a
//! connect timeout and a whole-request timeout, so a hung workflow resolves
//! to [`DiagnosisError::Timeout`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use vigil_core::Diagnosis;

use crate::errors::{DiagnosisError, DiagnosisResult};
use crate::normalize::normalize_response;
use crate::request::DiagnosisRequest;
use crate::service::DiagnosisService;

/// Longest response body kept in a [`DiagnosisError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Webhook client configuration.
#[derive(Clone, Debug)]
pub struct WebhookConfig {
    /// Endpoint URL.
    pub url: String,
    /// Whole-request limit.
    pub timeout: Duration,
    /// TCP connect limit.
    pub connect_timeout: Duration,
}

/// Diagnosis service that calls an external workflow over HTTP.
pub struct WebhookDiagnosisService {
    client: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookDiagnosisService {
    /// Build a client for `config`.
    pub fn new(config: WebhookConfig) -> DiagnosisResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| DiagnosisError::Config(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Configured endpoint.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    fn map_transport(&self, e: &reqwest::Error) -> DiagnosisError {
        if e.is_timeout() {
            DiagnosisError::Timeout {
                after_ms: u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            DiagnosisError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl DiagnosisService for WebhookDiagnosisService {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn diagnose(&self, request: &DiagnosisRequest) -> DiagnosisResult<Diagnosis> {
        debug!(
            url = %self.config.url,
            session_id = %request.session_id(),
            model = %request.model(),
            "posting diagnosis request"
        );

        let response = self
            .client
            .post(&self.config.url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "diagnosis webhook returned error status");
            return Err(DiagnosisError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body = response.text().await.map_err(|e| self.map_transport(&e))?;
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| DiagnosisError::malformed(format!("invalid JSON: {e}")))?;
        normalize_response(value)
    }
}
