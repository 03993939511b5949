//! Fatigue signal set captured by the eye-tracking client.
//!
//! Field names are English snake case; the legacy client's Spanish names are
//! accepted as serde aliases so older builds keep working unchanged.

use serde::{Deserialize, Serialize};

/// Inclusive bounds of the subjective (KSS) sleepiness scale.
pub const SUBJECTIVE_LEVEL_RANGE: std::ops::RangeInclusive<u8> = 1..=9;

/// A signal failed boundary validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignalError {
    /// A floating-point signal is NaN or infinite.
    #[error("signal `{0}` must be a finite number")]
    NotFinite(&'static str),

    /// A signal that can only be zero or positive was negative.
    #[error("signal `{name}` must be non-negative, got {value}")]
    Negative {
        /// Signal name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Subjective level outside the 1–9 scale.
    #[error("subjective level must be between 1 and 9, got {0}")]
    SubjectiveLevelOutOfRange(u8),
}

/// One interval's worth of fatigue signals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalSet {
    /// Spontaneous eye-blink count over the interval.
    pub sebr: f64,
    /// Blinks per minute.
    #[serde(default)]
    pub blink_rate_min: f64,
    /// Percentage of time the eyes were closed past the threshold.
    pub perclos: f64,
    /// Percentage of blinks that did not fully close.
    #[serde(alias = "pct_incompletos")]
    pub pct_incomplete: f64,
    /// Average eye-closure duration in seconds.
    #[serde(alias = "tiempo_cierre")]
    pub closure_time: f64,
    /// Yawns detected.
    #[serde(alias = "num_bostezos")]
    pub yawns: u32,
    /// Average gaze velocity.
    #[serde(alias = "velocidad_ocular")]
    pub eye_velocity: f64,
    /// Self-reported sleepiness on the 1–9 scale.
    #[serde(alias = "nivel_subjetivo")]
    pub subjective_level: u8,
    /// Longest stretch without a blink, in seconds.
    #[serde(default, alias = "max_sin_parpadeo")]
    pub max_without_blink: u32,
    /// Alerts raised by the client during the interval.
    #[serde(default, alias = "alertas")]
    pub alerts: u32,
}

impl SignalSet {
    /// Check every signal against its domain.
    pub fn validate(&self) -> Result<(), SignalError> {
        for (name, value) in [
            ("sebr", self.sebr),
            ("blink_rate_min", self.blink_rate_min),
            ("perclos", self.perclos),
            ("pct_incomplete", self.pct_incomplete),
            ("closure_time", self.closure_time),
            ("eye_velocity", self.eye_velocity),
        ] {
            if !value.is_finite() {
                return Err(SignalError::NotFinite(name));
            }
            if value < 0.0 {
                return Err(SignalError::Negative { name, value });
            }
        }
        if !SUBJECTIVE_LEVEL_RANGE.contains(&self.subjective_level) {
            return Err(SignalError::SubjectiveLevelOutOfRange(self.subjective_level));
        }
        Ok(())
    }
}

/// A timestamped fatigue episode observed inside a measurement interval.
///
/// The client decides what goes in here, so the object is kept verbatim and
/// only the timestamp is interpreted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FatigueMoment(serde_json::Map<String, serde_json::Value>);

impl FatigueMoment {
    /// Keys the client has used for the episode timestamp.
    const TIMESTAMP_KEYS: [&'static str; 3] = ["timestamp", "at", "tiempo"];

    /// Wrap a client-supplied object.
    #[must_use]
    pub fn new(fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(fields)
    }

    /// The episode timestamp, if the client sent one.
    #[must_use]
    pub fn timestamp(&self) -> Option<&serde_json::Value> {
        Self::TIMESTAMP_KEYS.iter().find_map(|k| self.0.get(*k))
    }

    /// All fields as sent.
    #[must_use]
    pub fn fields(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.0
    }
}
