//! Fatigue report input and submission outcome.

use serde::{Deserialize, Serialize};
use vigil_core::{
    ActivityKind, Diagnosis, ErrorCategory, FatigueMoment, SessionId, SessionModel, SignalSet,
    Stage,
};

use crate::errors::{Result, TrackingError};

/// One interval of measurements submitted by the tracking client.
#[derive(Clone, Debug, Deserialize)]
pub struct FatigueReport {
    /// Submitting user.
    #[serde(alias = "usuario_id")]
    pub user_id: i64,
    /// Target session; the user's open session when absent.
    #[serde(default, alias = "sesion_id")]
    pub session_id: Option<SessionId>,
    /// Stage tag; present only for staged sessions.
    #[serde(default, alias = "tipo_medicion", alias = "etapa")]
    pub stage: Option<Stage>,
    /// Activity being monitored.
    #[serde(default, alias = "actividad")]
    pub activity: Option<ActivityKind>,
    /// Signal values.
    #[serde(flatten)]
    pub signals: SignalSet,
    /// Seconds elapsed in the session so far.
    #[serde(default, alias = "tiempo_total_seg")]
    pub elapsed_seconds: Option<i64>,
    /// Client's fatigue classification.
    #[serde(alias = "es_fatiga")]
    pub fatigued: bool,
    /// Fatigue episodes inside the interval.
    #[serde(default, alias = "momentos_fatiga")]
    pub fatigue_moments: Option<Vec<FatigueMoment>>,
}

impl FatigueReport {
    /// Session model implied by the stage tag.
    pub fn model(&self) -> SessionModel {
        SessionModel::for_stage(self.stage)
    }

    /// Boundary checks; run before any storage access.
    pub fn validate(&self) -> Result<()> {
        if self.user_id <= 0 {
            return Err(TrackingError::Validation(format!(
                "user_id must be positive, got {}",
                self.user_id
            )));
        }
        if let Some(elapsed) = self.elapsed_seconds {
            if elapsed < 0 {
                return Err(TrackingError::Validation(format!(
                    "elapsed_seconds must be non-negative, got {elapsed}"
                )));
            }
        }
        self.signals.validate()?;
        Ok(())
    }
}

/// Result of a fatigue report submission.
#[derive(Clone, Debug, Serialize)]
pub struct SubmissionOutcome {
    /// Human-readable confirmation.
    pub message: String,
    /// Session the measurement was recorded in.
    pub session_id: SessionId,
    /// Measurement row id.
    pub measurement_id: i64,
    /// Whether the submission created the session.
    pub created: bool,
    /// Whether the submission closed the session.
    pub closed: bool,
    /// Open session of the other model that this submission closed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superseded_session_id: Option<SessionId>,
    /// Diagnosis, when the session closed and reconciliation succeeded.
    pub diagnosis: Option<Diagnosis>,
    /// Why reconciliation failed, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis_error: Option<ErrorCategory>,
}
