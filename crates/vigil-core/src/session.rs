//! Session vocabulary: lifecycle model, measurement stage, activity kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parse a unit enum through its serde representation so the
/// `#[serde(rename)]`/`#[serde(alias)]` attributes stay the source of truth.
fn parse_via_serde<T: serde::de::DeserializeOwned>(s: &str, what: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(s.to_owned()))
        .map_err(|_| format!("unknown {what}: {s}"))
}

// ─────────────────────────────────────────────────────────────────────────────
// SessionModel
// ─────────────────────────────────────────────────────────────────────────────

/// How a session progresses from open to closed.
///
/// The model is fixed when the session is created and stored with it, so a
/// single deployment can serve both kinds of client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionModel {
    /// Two tagged measurements (`INICIAL`, then `FINAL`); closes on `FINAL`.
    Staged,
    /// One terminal measurement; every submission closes the session.
    Continuous,
}

impl SessionModel {
    /// Storage/wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Staged => "staged",
            Self::Continuous => "continuous",
        }
    }

    /// The model implied by a submission: a stage tag means staged.
    #[must_use]
    pub fn for_stage(stage: Option<Stage>) -> Self {
        if stage.is_some() {
            Self::Staged
        } else {
            Self::Continuous
        }
    }
}

impl fmt::Display for SessionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_via_serde(s, "session model")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stage
// ─────────────────────────────────────────────────────────────────────────────

/// Position of a measurement within a staged session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Baseline measurement taken before the activity.
    #[serde(rename = "INICIAL", alias = "inicial", alias = "initial")]
    Initial,
    /// Closing measurement taken after the activity.
    #[serde(rename = "FINAL", alias = "final")]
    Final,
}

impl Stage {
    /// Storage/wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "INICIAL",
            Self::Final => "FINAL",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_via_serde(s, "stage")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ActivityKind
// ─────────────────────────────────────────────────────────────────────────────

/// What the user was doing while being monitored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// Reading a document.
    Pdf,
    /// Watching a video.
    Video,
}

impl ActivityKind {
    /// Storage/wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_via_serde(s, "activity kind")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FatigueState
// ─────────────────────────────────────────────────────────────────────────────

/// Textual classification stored alongside each measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FatigueState {
    /// Fatigue detected.
    #[serde(rename = "FATIGA")]
    Fatigued,
    /// No fatigue detected.
    #[serde(rename = "NORMAL")]
    Normal,
}

impl FatigueState {
    /// Derive the state from the client's boolean classification.
    #[must_use]
    pub fn from_flag(fatigued: bool) -> Self {
        if fatigued { Self::Fatigued } else { Self::Normal }
    }

    /// Storage/wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fatigued => "FATIGA",
            Self::Normal => "NORMAL",
        }
    }
}

impl fmt::Display for FatigueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FatigueState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_via_serde(s, "fatigue state")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_for_stage() {
        assert_eq!(SessionModel::for_stage(Some(Stage::Initial)), SessionModel::Staged);
        assert_eq!(SessionModel::for_stage(Some(Stage::Final)), SessionModel::Staged);
        assert_eq!(SessionModel::for_stage(None), SessionModel::Continuous);
    }

    #[test]
    fn model_roundtrip_through_str() {
        for model in [SessionModel::Staged, SessionModel::Continuous] {
            assert_eq!(model.as_str().parse::<SessionModel>().unwrap(), model);
        }
    }

    #[test]
    fn stage_accepts_legacy_lowercase() {
        assert_eq!("inicial".parse::<Stage>().unwrap(), Stage::Initial);
        assert_eq!("INICIAL".parse::<Stage>().unwrap(), Stage::Initial);
        assert_eq!("final".parse::<Stage>().unwrap(), Stage::Final);
        assert_eq!("FINAL".parse::<Stage>().unwrap(), Stage::Final);
    }

    #[test]
    fn stage_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Stage::Initial).unwrap(), "\"INICIAL\"");
        assert_eq!(serde_json::to_string(&Stage::Final).unwrap(), "\"FINAL\"");
    }

    #[test]
    fn unknown_stage_rejected() {
        let err = "middle".parse::<Stage>().unwrap_err();
        assert!(err.contains("middle"));
    }

    #[test]
    fn activity_kind_lowercase() {
        assert_eq!("pdf".parse::<ActivityKind>().unwrap(), ActivityKind::Pdf);
        assert_eq!(ActivityKind::Video.to_string(), "video");
        assert!("PDF".parse::<ActivityKind>().is_err());
    }

    #[test]
    fn fatigue_state_from_flag() {
        assert_eq!(FatigueState::from_flag(true).as_str(), "FATIGA");
        assert_eq!(FatigueState::from_flag(false).as_str(), "NORMAL");
        assert_eq!("FATIGA".parse::<FatigueState>().unwrap(), FatigueState::Fatigued);
    }
}
