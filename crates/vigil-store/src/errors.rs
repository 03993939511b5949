//! Storage error type shared by the pool, migrations, and repositories.

use thiserror::Error;

/// Failure inside the relational store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Statement failed, including guard-trigger aborts such as closing a
    /// session twice or editing a measurement.
    #[error("database statement failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// No pooled connection could be checked out in time.
    #[error("no database connection available: {0}")]
    Pool(#[from] r2d2::Error),

    /// A JSON column (activity log, fatigue moments, diagnosis) could not be
    /// encoded.
    #[error("json column encoding failed: {0}")]
    Serde(#[from] serde_json::Error),

    /// Schema could not be brought up to date.
    #[error("schema migration failed: {message}")]
    Migration {
        /// Version, description, and cause.
        message: String,
    },
}

/// Result alias for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
