//! Diagnosis repository: one row per session, replaced on conflict.

use rusqlite::{Connection, OptionalExtension, params};
use vigil_core::{Diagnosis, SessionId};

use crate::errors::Result;
use crate::row_types::{DiagnosisRow, now_rfc3339, parse_json};

/// Keyed by session id; writes are upserts.
pub struct DiagnosisRepo;

impl DiagnosisRepo {
    /// Stored diagnosis for a session, if any.
    pub fn get(conn: &Connection, session_id: &str) -> Result<Option<DiagnosisRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM diagnoses WHERE session_id = ?1",
                params![session_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Insert or replace the diagnosis for a session.
    ///
    /// `created_at` survives replacement; `updated_at` moves forward.
    pub fn upsert(conn: &Connection, session_id: &str, diagnosis: &Diagnosis) -> Result<DiagnosisRow> {
        let now = now_rfc3339();
        let _ = conn.execute(
            "INSERT INTO diagnoses (session_id, result, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT (session_id) DO UPDATE
             SET result = excluded.result, updated_at = excluded.updated_at",
            params![session_id, diagnosis.to_json_string(), now],
        )?;
        let created_at: String = conn.query_row(
            "SELECT created_at FROM diagnoses WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(DiagnosisRow {
            session_id: SessionId::from(session_id),
            result: diagnosis.clone(),
            created_at,
            updated_at: now,
        })
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DiagnosisRow> {
        Ok(DiagnosisRow {
            session_id: SessionId::from_string(row.get("session_id")?),
            result: parse_json(row, "result")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}
