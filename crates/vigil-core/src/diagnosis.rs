//! Diagnosis document.
//!
//! A diagnosis is produced outside this service, so the JSON object is kept
//! exactly as received. Construction validates that the three fields the rest
//! of the system reads are present; accessors read them back under either the
//! canonical English key or the workflow's Spanish one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Keys accepted for each field, canonical first.
const SUMMARY_KEYS: [&str; 3] = ["summary", "diagnostico_general", "diagnostico"];
const SEVERITY_KEYS: [&str; 3] = ["severity", "severidad_fatiga_final", "severidad"];
const RECOMMENDATION_KEYS: [&str; 3] = [
    "recommendations",
    "recomendaciones_generales",
    "recomendaciones",
];

// ─────────────────────────────────────────────────────────────────────────────
// Severity
// ─────────────────────────────────────────────────────────────────────────────

/// Overall fatigue severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// No meaningful fatigue.
    #[serde(rename = "NORMAL")]
    Normal,
    /// Moderate fatigue.
    #[serde(rename = "MODERADA", alias = "MODERATE")]
    Moderate,
    /// High fatigue.
    #[serde(rename = "ALTA", alias = "HIGH")]
    High,
}

impl Severity {
    /// Wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Moderate => "MODERADA",
            Self::High => "ALTA",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        serde_json::from_value(Value::String(upper)).map_err(|_| format!("unknown severity: {s}"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Diagnosis
// ─────────────────────────────────────────────────────────────────────────────

/// Why an object is not a usable diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosisShapeError {
    /// A required field is absent.
    #[error("diagnosis is missing `{0}`")]
    Missing(&'static str),
    /// A field is present but has the wrong type or value.
    #[error("diagnosis field `{field}` is invalid: {reason}")]
    Invalid {
        /// Canonical field name.
        field: &'static str,
        /// What was wrong.
        reason: String,
    },
}

/// A validated diagnosis, stored and returned verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Diagnosis {
    raw: Map<String, Value>,
    summary: String,
    severity: Severity,
    recommendations: Vec<String>,
}

impl Diagnosis {
    /// Build a diagnosis from its three core fields.
    #[must_use]
    pub fn new(summary: impl Into<String>, severity: Severity, recommendations: Vec<String>) -> Self {
        let summary = summary.into();
        let mut raw = Map::new();
        let _ = raw.insert("summary".into(), Value::String(summary.clone()));
        let _ = raw.insert("severity".into(), Value::String(severity.as_str().into()));
        let _ = raw.insert(
            "recommendations".into(),
            Value::Array(recommendations.iter().cloned().map(Value::String).collect()),
        );
        Self {
            raw,
            summary,
            severity,
            recommendations,
        }
    }

    /// Attach an extra field, replacing any previous value under `key`.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        let _ = self.raw.insert(key.into(), value);
        self
    }

    /// Validate an object received from a diagnosis service.
    pub fn from_object(raw: Map<String, Value>) -> Result<Self, DiagnosisShapeError> {
        let summary = match find(&raw, &SUMMARY_KEYS) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => return Err(invalid("summary", format!("expected string, got {other}"))),
            None => return Err(DiagnosisShapeError::Missing("summary")),
        };
        let severity = match find(&raw, &SEVERITY_KEYS) {
            Some(Value::String(s)) => s.parse().map_err(|e| invalid("severity", e))?,
            Some(other) => return Err(invalid("severity", format!("expected string, got {other}"))),
            None => return Err(DiagnosisShapeError::Missing("severity")),
        };
        let recommendations = match find(&raw, &RECOMMENDATION_KEYS) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(str::to_owned)
                        .ok_or_else(|| invalid("recommendations", format!("non-string item {v}")))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(invalid("recommendations", format!("expected array, got {other}")));
            }
            None => return Err(DiagnosisShapeError::Missing("recommendations")),
        };
        Ok(Self {
            raw,
            summary,
            severity,
            recommendations,
        })
    }

    /// Short textual assessment.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Overall severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Ordered recommendations.
    #[must_use]
    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    /// The object exactly as received.
    #[must_use]
    pub fn as_object(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Serialize the stored object to a JSON string.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        Value::Object(self.raw.clone()).to_string()
    }
}

impl TryFrom<Map<String, Value>> for Diagnosis {
    type Error = DiagnosisShapeError;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_object(raw)
    }
}

impl From<Diagnosis> for Map<String, Value> {
    fn from(d: Diagnosis) -> Self {
        d.raw
    }
}

fn find<'a>(raw: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| raw.get(*k))
}

fn invalid(field: &'static str, reason: impl Into<String>) -> DiagnosisShapeError {
    DiagnosisShapeError::Invalid {
        field,
        reason: reason.into(),
    }
}
