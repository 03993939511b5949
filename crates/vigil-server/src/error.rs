//! API error body and HTTP status mapping.
//!
//! Every failure renders as `{"error": {"code": "...", "message": "..."}}`.
//! Storage details never reach the client; they are logged instead.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;
use vigil_core::ErrorCategory;
use vigil_tracking::TrackingError;

/// An error returned by a handler.
#[derive(Debug, thiserror::Error)]
#[error("{category}: {message}")]
pub struct ApiError {
    category: ErrorCategory,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'static str,
    message: &'a str,
}

impl ApiError {
    /// Build an error with an explicit category.
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    /// Category of this error.
    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    /// Client-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// HTTP status for a category.
pub fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::Validation => StatusCode::BAD_REQUEST,
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::SessionClosed | ErrorCategory::Conflict | ErrorCategory::NotReady => {
            StatusCode::CONFLICT
        }
        ErrorCategory::DiagnosisUnavailable => StatusCode::BAD_GATEWAY,
        ErrorCategory::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<TrackingError> for ApiError {
    fn from(e: TrackingError) -> Self {
        let category = e.category();
        let message = match &e {
            TrackingError::Storage(inner) => {
                error!(error = %inner, "storage failure");
                "internal storage error".to_string()
            }
            TrackingError::Worker(inner) => {
                error!(error = %inner, "storage task failure");
                "internal storage error".to_string()
            }
            other => other.to_string(),
        };
        Self { category, message }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(ErrorCategory::Validation, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.category.code(),
                message: &self.message,
            },
        };
        (status_for(self.category), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::SessionId;
    use vigil_store::StoreError;

    #[test]
    fn statuses() {
        assert_eq!(status_for(ErrorCategory::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCategory::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorCategory::SessionClosed), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCategory::Conflict), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCategory::NotReady), StatusCode::CONFLICT);
        assert_eq!(
            status_for(ErrorCategory::DiagnosisUnavailable),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(ErrorCategory::Storage),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_message_is_generic() {
        let err = ApiError::from(TrackingError::Storage(StoreError::Migration {
            message: "table sessions exploded at /var/db".into(),
        }));
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.message(), "internal storage error");
    }

    #[test]
    fn other_messages_pass_through() {
        let err = ApiError::from(TrackingError::SessionClosed(SessionId::from("abc")));
        assert_eq!(err.message(), "session abc is closed");
    }

    #[tokio::test]
    async fn renders_error_body() {
        let resp = ApiError::new(ErrorCategory::NotReady, "not yet").into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["error"]["code"], "NOT_READY");
        assert_eq!(parsed["error"]["message"], "not yet");
    }

    #[test]
    fn display_leads_with_code() {
        let err = ApiError::new(ErrorCategory::Conflict, "user 3 already has an open session");
        assert_eq!(err.to_string(), "CONFLICT: user 3 already has an open session");
    }
}
