//! Local rule-based diagnosis.
//!
//! Scores the session's terminal measurement against fixed thresholds.
//! Useful when no workflow is deployed, and as a deterministic backend for
//! development.

use async_trait::async_trait;
use serde_json::json;
use vigil_core::{Diagnosis, Severity, SignalSet};

use crate::errors::DiagnosisResult;
use crate::request::DiagnosisRequest;
use crate::service::DiagnosisService;

const RECOMMENDATIONS: [&str; 3] = [
    "Aplica la regla 20-20-20",
    "Parpadea conscientemente cada 20s",
    "Toma un descanso de 2-3 minutos",
];

/// Score at or above which fatigue is reported in the summary.
const FATIGUE_SCORE: u32 = 3;

/// Diagnosis service that scores signals locally.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThresholdDiagnosisService;

impl ThresholdDiagnosisService {
    /// Create the scorer.
    pub fn new() -> Self {
        Self
    }

    /// Weighted threshold score of one signal set.
    pub fn score(signals: &SignalSet) -> u32 {
        let rules: [(bool, u32); 8] = [
            (signals.perclos >= 28.0, 3),
            (signals.sebr <= 5.0, 3),
            (signals.pct_incomplete >= 20.0, 2),
            (signals.closure_time >= 0.4, 1),
            (signals.yawns >= 1, 1),
            (signals.eye_velocity < 0.02, 1),
            (signals.subjective_level >= 7, 1),
            (signals.alerts >= 2, 2),
        ];
        rules.iter().filter(|(hit, _)| *hit).map(|(_, points)| points).sum()
    }

    /// Severity band for a score.
    pub fn severity_for(score: u32) -> Severity {
        match score {
            7.. => Severity::High,
            4..=6 => Severity::Moderate,
            _ => Severity::Normal,
        }
    }
}

#[async_trait]
impl DiagnosisService for ThresholdDiagnosisService {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn diagnose(&self, request: &DiagnosisRequest) -> DiagnosisResult<Diagnosis> {
        let score = Self::score(&request.terminal().signals);
        let summary = if score >= FATIGUE_SCORE {
            "Fatiga detectada"
        } else {
            "Estado normal"
        };
        let diagnosis = Diagnosis::new(
            summary,
            Self::severity_for(score),
            RECOMMENDATIONS.iter().map(ToString::to_string).collect(),
        )
        .with_extra("score", json!(score))
        .with_extra("model", json!(request.model().as_str()));
        Ok(diagnosis)
    }
}
