//! Diagnosis request payload.
//!
//! Everything here serializes with plain `serde`, so numeric signals reach
//! the workflow as JSON numbers. The shape depends on the session model:
//!
//! ```json
//! {"model": "staged", "session_id": "…", "user_id": 4,
//!  "inicial": {…}, "final": {…}, "perclos_change_pct": -12.5}
//!
//! {"model": "continuous", "session_id": "…", "user_id": 4,
//!  "activity": "pdf", "elapsed_seconds": 600, "fatigued": true,
//!  "sebr": 4.0, "perclos": 31.2, …, "fatigue_moments": […]}
//! ```

use serde::Serialize;
use vigil_core::{ActivityKind, FatigueMoment, SessionId, SessionModel, SignalSet};

/// One measurement as the diagnosis service sees it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MeasurementSnapshot {
    /// Activity being monitored when the measurement was taken.
    pub activity: Option<ActivityKind>,
    /// Signal values, flattened into the enclosing object.
    #[serde(flatten)]
    pub signals: SignalSet,
    /// Elapsed seconds reported by the client.
    pub elapsed_seconds: Option<i64>,
    /// Client's fatigue classification.
    pub fatigued: bool,
    /// Fatigue episodes inside the interval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatigue_moments: Option<Vec<FatigueMoment>>,
    /// Insertion timestamp (RFC 3339).
    pub recorded_at: String,
}

/// Inputs for one diagnosis call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum DiagnosisRequest {
    /// Before/after comparison of a staged session.
    Staged {
        /// Session being diagnosed.
        session_id: SessionId,
        /// Owning user.
        user_id: i64,
        /// Latest INICIAL measurement.
        #[serde(rename = "inicial")]
        initial: MeasurementSnapshot,
        /// Latest FINAL measurement.
        #[serde(rename = "final")]
        closing: MeasurementSnapshot,
        /// Relative PERCLOS change between the stages, in percent.
        perclos_change_pct: Option<f64>,
    },
    /// Single terminal measurement of a continuous session.
    Continuous {
        /// Session being diagnosed.
        session_id: SessionId,
        /// Owning user.
        user_id: i64,
        /// The measurement, flattened into the request object.
        #[serde(flatten)]
        latest: MeasurementSnapshot,
    },
}

impl DiagnosisRequest {
    /// Build a staged request; the PERCLOS change is derived here.
    #[must_use]
    pub fn staged(
        session_id: SessionId,
        user_id: i64,
        initial: MeasurementSnapshot,
        closing: MeasurementSnapshot,
    ) -> Self {
        let perclos_change_pct = perclos_change_pct(initial.signals.perclos, closing.signals.perclos);
        Self::Staged {
            session_id,
            user_id,
            initial,
            closing,
            perclos_change_pct,
        }
    }

    /// Build a continuous request.
    #[must_use]
    pub fn continuous(session_id: SessionId, user_id: i64, latest: MeasurementSnapshot) -> Self {
        Self::Continuous {
            session_id,
            user_id,
            latest,
        }
    }

    /// Session this request is about.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::Staged { session_id, .. } | Self::Continuous { session_id, .. } => session_id,
        }
    }

    /// Lifecycle model of the session.
    #[must_use]
    pub fn model(&self) -> SessionModel {
        match self {
            Self::Staged { .. } => SessionModel::Staged,
            Self::Continuous { .. } => SessionModel::Continuous,
        }
    }

    /// The measurement that describes the session's end state.
    #[must_use]
    pub fn terminal(&self) -> &MeasurementSnapshot {
        match self {
            Self::Staged { closing, .. } => closing,
            Self::Continuous { latest, .. } => latest,
        }
    }
}

/// Relative change from `initial` to `closing`, rounded to one decimal.
/// `None` when the baseline is zero.
fn perclos_change_pct(initial: f64, closing: f64) -> Option<f64> {
    if initial <= 0.0 {
        return None;
    }
    let pct = (closing - initial) / initial * 100.0;
    Some((pct * 10.0).round() / 10.0)
}
