//! Tracking error types.

use thiserror::Error;
use vigil_core::{ErrorCategory, SessionId, SignalError};
use vigil_diagnosis::DiagnosisError;
use vigil_store::StoreError;

/// Errors from lifecycle, recording, and reconciliation.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// Input failed validation; nothing was touched.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Referenced session does not exist.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Measurement submitted against a closed session.
    #[error("session {0} is closed")]
    SessionClosed(SessionId),

    /// The user already has an open session.
    #[error("user already has an open session: {open_session_id}")]
    Conflict {
        /// The session that is still open.
        open_session_id: SessionId,
    },

    /// Not enough measurements to diagnose yet.
    #[error("diagnosis not ready: {0}")]
    NotReady(String),

    /// The diagnosis service failed.
    #[error("diagnosis unavailable: {0}")]
    DiagnosisUnavailable(#[from] DiagnosisError),

    /// The store failed; the transaction was rolled back.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// A storage task on the blocking pool panicked or was cancelled.
    #[error("storage task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl TrackingError {
    /// Machine-readable category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::SessionNotFound(_) => ErrorCategory::NotFound,
            Self::SessionClosed(_) => ErrorCategory::SessionClosed,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::NotReady(_) => ErrorCategory::NotReady,
            Self::DiagnosisUnavailable(_) => ErrorCategory::DiagnosisUnavailable,
            Self::Storage(_) | Self::Worker(_) => ErrorCategory::Storage,
        }
    }
}

impl From<SignalError> for TrackingError {
    fn from(e: SignalError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<rusqlite::Error> for TrackingError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(StoreError::Sqlite(e))
    }
}

impl From<r2d2::Error> for TrackingError {
    fn from(e: r2d2::Error) -> Self {
        Self::Storage(StoreError::Pool(e))
    }
}

/// Result type alias for tracking operations.
pub type Result<T> = std::result::Result<T, TrackingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(
            TrackingError::Validation("x".into()).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            TrackingError::SessionNotFound("x".into()).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            TrackingError::SessionClosed(SessionId::from("s")).category(),
            ErrorCategory::SessionClosed
        );
        assert_eq!(
            TrackingError::Conflict {
                open_session_id: SessionId::from("s")
            }
            .category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            TrackingError::NotReady("x".into()).category(),
            ErrorCategory::NotReady
        );
        assert_eq!(
            TrackingError::from(DiagnosisError::Timeout { after_ms: 1 }).category(),
            ErrorCategory::DiagnosisUnavailable
        );
        assert_eq!(
            TrackingError::from(rusqlite::Error::InvalidQuery).category(),
            ErrorCategory::Storage
        );
    }

    #[test]
    fn signal_errors_are_validation() {
        let err = TrackingError::from(SignalError::SubjectiveLevelOutOfRange(12));
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.to_string().contains("between 1 and 9"));
    }
}
