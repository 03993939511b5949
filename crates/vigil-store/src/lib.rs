//! # vigil-store
//!
//! `SQLite` persistence for sessions, measurements, and diagnoses.
//!
//! - **Connection pool**: `r2d2` + `rusqlite`, WAL mode, foreign keys on
//! - **Migrations**: version-tracked, embedded SQL
//! - **Repositories**: stateless [`SessionRepo`], [`MeasurementRepo`],
//!   [`DiagnosisRepo`] taking `&Connection`, so the caller owns the
//!   transaction boundary
//!
//! Schema triggers back the lifecycle rules: a closed session cannot be
//! reopened, sessions are never deleted, and measurements never change.

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod repositories;
pub mod row_types;

pub use connection::{ConnectionConfig, ConnectionPool, PooledConnection};
pub use errors::{Result, StoreError};
pub use repositories::{
    CloseSummary, CreateSessionOptions, DiagnosisRepo, MeasurementRepo, NewMeasurement,
    SessionRepo,
};
pub use row_types::{DiagnosisRow, MeasurementRow, SessionRow};

/// Open a file-backed pool and bring its schema up to date.
pub fn open(path: &str, config: &ConnectionConfig) -> Result<ConnectionPool> {
    let pool = connection::new_file(path, config)?;
    let conn = pool.get()?;
    let _ = migrations::run_migrations(&conn)?;
    drop(conn);
    Ok(pool)
}

/// Open a private in-memory pool with the schema applied.
pub fn open_in_memory() -> Result<ConnectionPool> {
    let pool = connection::new_in_memory(&ConnectionConfig::default())?;
    let conn = pool.get()?;
    let _ = migrations::run_migrations(&conn)?;
    drop(conn);
    Ok(pool)
}
