//! Diagnosis service trait.

use async_trait::async_trait;
use vigil_core::Diagnosis;

use crate::errors::DiagnosisResult;
use crate::request::DiagnosisRequest;

/// Something that turns session measurements into a [`Diagnosis`].
///
/// Implementations must be cheap to share across tasks; callers hold them
/// behind `Arc<dyn DiagnosisService>`.
#[async_trait]
pub trait DiagnosisService: Send + Sync {
    /// Short identifier for logs and metrics.
    fn name(&self) -> &'static str;

    /// Produce a diagnosis for one request.
    async fn diagnose(&self, request: &DiagnosisRequest) -> DiagnosisResult<Diagnosis>;
}
