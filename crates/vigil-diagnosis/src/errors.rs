//! Diagnosis error types.

use thiserror::Error;

/// Why a diagnosis could not be obtained.
///
/// Every variant means "no diagnosis this time"; none of them implies that
/// stored session data is wrong.
#[derive(Debug, Error)]
pub enum DiagnosisError {
    /// The service did not answer within the configured limit.
    #[error("diagnosis service timed out after {after_ms}ms")]
    Timeout {
        /// The limit that expired.
        after_ms: u64,
    },

    /// The service answered with a non-success status.
    #[error("diagnosis service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The request never completed (DNS, connect, reset).
    #[error("diagnosis service unreachable: {0}")]
    Network(String),

    /// The service answered, but not with a usable diagnosis.
    #[error("malformed diagnosis response: {reason}")]
    Malformed {
        /// What was wrong with the response.
        reason: String,
    },

    /// The client could not be configured.
    #[error("diagnosis client configuration error: {0}")]
    Config(String),
}

impl DiagnosisError {
    /// Short machine-readable sub-kind for logs, metrics, and API errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Status { .. } => "status",
            Self::Network(_) => "network",
            Self::Malformed { .. } => "malformed",
            Self::Config(_) => "config",
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

/// Result type alias for diagnosis operations.
pub type DiagnosisResult<T> = Result<T, DiagnosisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(DiagnosisError::Timeout { after_ms: 1 }.kind(), "timeout");
        assert_eq!(
            DiagnosisError::Status {
                status: 500,
                body: String::new()
            }
            .kind(),
            "status"
        );
        assert_eq!(DiagnosisError::Network("x".into()).kind(), "network");
        assert_eq!(DiagnosisError::malformed("x").kind(), "malformed");
    }

    #[test]
    fn display_includes_detail() {
        let err = DiagnosisError::Status {
            status: 503,
            body: "down".into(),
        };
        assert_eq!(err.to_string(), "diagnosis service returned HTTP 503: down");
        assert!(
            DiagnosisError::Timeout { after_ms: 60_000 }
                .to_string()
                .contains("60000ms")
        );
    }
}
