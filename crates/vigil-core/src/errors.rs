//! Machine-readable error categories.
//!
//! Every failure that crosses a crate boundary maps to exactly one category.
//! The HTTP layer turns categories into status codes; clients switch on the
//! code string, never on the message.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure taxonomy shared by every component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Malformed or out-of-range input. Not retryable.
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    /// Referenced entity does not exist.
    #[serde(rename = "NOT_FOUND")]
    NotFound,
    /// Write attempted against a closed session.
    #[serde(rename = "SESSION_CLOSED")]
    SessionClosed,
    /// Operation conflicts with existing state (e.g. an open session exists).
    #[serde(rename = "CONFLICT")]
    Conflict,
    /// Not enough measurements to produce a diagnosis yet.
    #[serde(rename = "NOT_READY")]
    NotReady,
    /// The diagnosis service failed, timed out, or answered nonsense.
    #[serde(rename = "DIAGNOSIS_UNAVAILABLE")]
    DiagnosisUnavailable,
    /// The relational store failed; nothing was committed.
    #[serde(rename = "STORAGE_ERROR")]
    Storage,
}

impl ErrorCategory {
    /// The wire code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::SessionClosed => "SESSION_CLOSED",
            Self::Conflict => "CONFLICT",
            Self::NotReady => "NOT_READY",
            Self::DiagnosisUnavailable => "DIAGNOSIS_UNAVAILABLE",
            Self::Storage => "STORAGE_ERROR",
        }
    }

    /// Whether retrying the same request unchanged could succeed.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::DiagnosisUnavailable | Self::Storage)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
